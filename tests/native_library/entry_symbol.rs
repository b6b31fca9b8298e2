use native_link::{ args, LoadError, LoaderConfig, Runtime, Value };
use crate::fixture_library::{ LIBRARIES, MODULE };

#[test]
fn custom_entry_symbol_runs_instead_of_the_default() {

	let config = LoaderConfig::default().with_entry_symbol( "fixture_custom_init" );
	let runtime = Runtime::new( &config );
	runtime.load( MODULE, Some( &LIBRARIES.valid )).expect( "Failed to load the fixture library" );

	assert_eq!( runtime.dispatcher().names(), vec![ "fixture_custom" ]);
	match runtime.invoke( "fixture_custom", &args!{} ) {
		Ok( Value::Map( map )) => assert_eq!( map.get( "answer" ), Some( &Value::Integer( 42 ))),
		value => panic!( "Expected Ok( Map ), found: {:#?}", value ),
	}

}

#[test]
fn missing_entry_symbol() {

	let config = LoaderConfig::default().with_entry_symbol( "fixture_missing_init" );
	let runtime = Runtime::new( &config );

	match runtime.load( MODULE, Some( &LIBRARIES.valid )) {
		Err( LoadError::IncompatibleBinary { reason, .. }) => assert!( reason.starts_with( "Missing entry point" ), "{}", reason ),
		value => panic!( "Expected IncompatibleBinary, found: {:#?}", value ),
	}
	assert!( runtime.dispatcher().is_empty() );

}
