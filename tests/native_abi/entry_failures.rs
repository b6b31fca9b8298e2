use native_link::{ args, CallError, DuplicatePolicy, LoadError, LoaderConfig, NativeExtension, Runtime, StaticSource, Value };
use native_link::ffi::EntryFn ;
use crate::fixtures ;
use crate::guest_extension ;

fn load_entry( entry: EntryFn, policy: DuplicatePolicy ) -> ( Runtime, Result<(), LoadError> ) {
	let source = StaticSource::new().with( fixtures::module( "guest" ), NativeExtension::from_entry( entry ));
	let runtime = Runtime::with_source( &LoaderConfig::default().with_duplicate_policy( policy ), source );
	let outcome = runtime.load( "guest", None );
	( runtime, outcome )
}

fn expect_registration_failure( outcome: Result<(), LoadError> ) -> String {
	match outcome {
		Err( LoadError::RegistrationFailed { module, reason }) => {
			assert_eq!( module, "guest" );
			reason
		},
		value => panic!( "Expected RegistrationFailed, found: {:#?}", value ),
	}
}

#[test]
fn init_error_is_reported_through_fail() {

	let ( runtime, outcome ) = load_entry( guest_extension::failing_entry, DuplicatePolicy::Overwrite );
	let reason = expect_registration_failure( outcome );

	assert!( reason.contains( "guest init failed" ), "{}", reason );
	assert!( matches!( runtime.invoke( "before_failure", &args!{} ), Err( CallError::UnknownCall( _ ))));

}

#[test]
fn init_panic_is_caught() {

	let ( runtime, outcome ) = load_entry( guest_extension::panicking_entry, DuplicatePolicy::Overwrite );
	let reason = expect_registration_failure( outcome );

	assert!( reason.contains( "guest init panicked" ), "{}", reason );
	assert!( runtime.dispatcher().is_empty() );

}

#[test]
fn status_without_message() {

	let ( _, outcome ) = load_entry( guest_extension::silent_failure_entry, DuplicatePolicy::Overwrite );
	let reason = expect_registration_failure( outcome );

	assert!( reason.contains( "status 1" ), "{}", reason );

}

#[test]
fn entry_registering_nothing() {

	let ( _, outcome ) = load_entry( guest_extension::empty_entry, DuplicatePolicy::Overwrite );
	assert_eq!( expect_registration_failure( outcome ), "No handlers registered" );

}

#[test]
fn host_rejection_reaches_the_guest() {

	let ( runtime, outcome ) = load_entry( guest_extension::twice_entry, DuplicatePolicy::Reject );
	let reason = expect_registration_failure( outcome );
	assert!( reason.contains( "twice" ), "{}", reason );
	assert!( matches!( runtime.invoke( "twice", &args!{} ), Err( CallError::UnknownCall( _ ))));

	let ( runtime, outcome ) = load_entry( guest_extension::twice_entry, DuplicatePolicy::Overwrite );
	outcome.expect( "Overwrite should accept the second registration" );
	assert_eq!( runtime.invoke( "twice", &args!{} ).expect( "twice failed" ), Value::Integer( 2 ));

}
