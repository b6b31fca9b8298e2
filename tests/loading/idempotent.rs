use std::sync::Arc ;
use native_link::{ args, Dispatcher, DuplicatePolicy, Extension, LoadError, Loader, StaticSource, Value };
use crate::fixtures::{ self, Counting, Flaky };

fn counting_loader( counting: &Counting ) -> Loader {
	let shared: Arc<dyn Extension> = Arc::new( counting.clone() );
	let source = StaticSource::new().with_shared( fixtures::module( "counting" ), shared );
	Loader::new( source, Arc::new( Dispatcher::default() ))
}

#[test]
fn second_load_does_not_register_again() {

	let counting = Counting::default();
	let loader = counting_loader( &counting );
	let module = fixtures::module( "counting" );

	loader.load( &module, None ).expect( "First load failed" );
	loader.load( &module, None ).expect( "Second load failed" );

	assert_eq!( counting.count(), 1 );
	assert_eq!( loader.dispatcher().invoke( "counted", &args!{} ).expect( "counted failed" ), Value::Bool( true ));

}

#[test]
fn second_load_ignores_a_different_directory() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let first = fixtures::build_dir( &root, "first" );
	let second = fixtures::build_dir( &root, "second" );

	let counting = Counting::default();
	let loader = counting_loader( &counting );
	let module = fixtures::module( "counting" );

	loader.load( &module, Some( &first )).expect( "First load failed" );
	loader.load( &module, Some( &second )).expect( "Second load failed" );

	assert_eq!( counting.count(), 1 );
	assert_eq!( loader.directory_of( &module ), Some( first ));

}

#[test]
fn load_after_failure_retries() {

	let runtime = fixtures::runtime();

	assert!( runtime.load( "ext_empty", None ).is_err() );
	assert!( runtime.load( "ext_empty", None ).is_err() );
	assert!( !runtime.loader().is_loaded( &fixtures::module( "ext_empty" )));

}

fn retry_after_transient_failure( policy: DuplicatePolicy ) {

	let flaky = Flaky::default();
	let source = StaticSource::new().with( fixtures::module( "flaky" ), flaky.clone() );
	let loader = Loader::new( source, Arc::new( Dispatcher::new( policy )));
	let module = fixtures::module( "flaky" );

	match loader.load( &module, None ) {
		Err( LoadError::RegistrationFailed { reason, .. }) => assert!( reason.contains( "transient after flaky" ), "{}", reason ),
		value => panic!( "Expected RegistrationFailed, found: {:#?}", value ),
	}
	assert!( !loader.dispatcher().contains( "flaky" ));

	loader.load( &module, None ).expect( "Retry failed" );
	assert!( loader.is_loaded( &module ));
	assert_eq!( loader.dispatcher().invoke( "flaky", &args!{} ).expect( "flaky failed" ), Value::from( "flaky" ));
	assert_eq!( flaky.attempts.load( std::sync::atomic::Ordering::SeqCst ), 2 );

}

#[test]
fn retry_after_failure_with_overwrite() {
	retry_after_transient_failure( DuplicatePolicy::Overwrite );
}

#[test]
fn retry_after_failure_with_reject() {
	retry_after_transient_failure( DuplicatePolicy::Reject );
}
