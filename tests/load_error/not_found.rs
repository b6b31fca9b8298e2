use native_link::{ args, CallError, LoadError, LoaderConfig, Runtime };
use crate::fixtures ;

#[test]
fn missing_library_in_existing_directory() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let runtime = Runtime::new( &LoaderConfig::default() );

	match runtime.load( "wilton_missing", Some( root.path() )) {
		Err( LoadError::NotFound( module )) => assert_eq!( module, "wilton_missing" ),
		value => panic!( "Expected NotFound, found: {:#?}", value ),
	}

}

#[test]
fn missing_library_without_directory() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let config = LoaderConfig::default().with_search_path( root.path() );
	let runtime = Runtime::new( &config );

	match runtime.load( "native_link_definitely_missing", None ) {
		Err( LoadError::NotFound( _ )) => {}
		value => panic!( "Expected NotFound, found: {:#?}", value ),
	}

}

#[test]
fn failed_load_registers_nothing() {

	let runtime = fixtures::runtime();

	assert!( matches!( runtime.load( "ext_unknown", None ), Err( LoadError::NotFound( _ ))));
	assert!( runtime.dispatcher().is_empty() );
	assert!( matches!( runtime.invoke( "foo", &args!{} ), Err( CallError::UnknownCall( _ ))));

}
