use native_link::{ args, LoadError, LoaderConfig, NativeSource, Runtime, StaticSource, Value };
use native_link::source::Chain ;
use crate::fixtures ;

#[test]
fn static_modules_win_over_native_lookup() {

	let config = LoaderConfig::default();
	let source = Chain::new( fixtures::source(), NativeSource::new( &config ));
	let runtime = Runtime::with_source( &config, source );

	runtime.load( "ext_a", None ).expect( "Failed to load ext_a" );
	assert_eq!( runtime.invoke( "foo", &args!{ "bar" => 1, "baz" => 1 }).expect( "foo failed" ), Value::Integer( 2 ));

}

#[test]
fn falls_back_when_the_first_source_has_nothing() {

	let config = LoaderConfig::default();
	let source = Chain::new( StaticSource::new(), fixtures::source() );
	let runtime = Runtime::with_source( &config, source );

	runtime.load( "ext_echo", None ).expect( "Failed to load ext_echo" );
	assert!( runtime.dispatcher().contains( "echo" ));

}

#[test]
fn not_found_when_no_source_resolves() {

	let config = LoaderConfig::default();
	let source = Chain::new( StaticSource::new(), StaticSource::new() );
	let runtime = Runtime::with_source( &config, source );

	match runtime.load( "nowhere", None ) {
		Err( LoadError::NotFound( module )) => assert_eq!( module, "nowhere" ),
		value => panic!( "Expected NotFound, found: {:#?}", value ),
	}

}
