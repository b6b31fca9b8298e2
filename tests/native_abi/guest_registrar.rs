use std::ffi::c_void ;
use std::sync::atomic::{ AtomicUsize, Ordering };
use native_link::ffi::{ CallFn, HostApi, ABI_VERSION, STATUS_ERROR, STATUS_OK };
use native_link::guest::{ run_init, GuestRegistrar };
use crate::guest_extension ;

static REGISTER_CALLS: AtomicUsize = AtomicUsize::new( 0 );

unsafe extern "C" fn counting_register(
	_host: *mut c_void,
	_name: *const u8,
	_name_len: usize,
	_context: *mut c_void,
	_call: CallFn,
) -> i32 {
	REGISTER_CALLS.fetch_add( 1, Ordering::SeqCst );
	STATUS_OK
}

unsafe extern "C" fn ignore_fail( _host: *mut c_void, _message: *const u8, _message_len: usize ) {}

fn api( abi_version: u32 ) -> HostApi {
	HostApi {
		abi_version,
		host: std::ptr::null_mut(),
		register: counting_register,
		fail: ignore_fail,
	}
}

#[test]
fn null_api_is_refused() {
	// SAFETY: null is explicitly allowed
	assert!( unsafe { GuestRegistrar::from_raw( std::ptr::null() )}.is_none() );
	// SAFETY: as above
	assert_eq!( unsafe { run_init( std::ptr::null(), guest_extension::init )}, STATUS_ERROR );
}

#[test]
fn other_abi_versions_are_refused() {

	let foreign = api( ABI_VERSION + 1 );
	// SAFETY: `foreign` outlives the call
	assert_eq!( unsafe { run_init( &foreign, guest_extension::init )}, STATUS_ERROR );

	let before = REGISTER_CALLS.load( Ordering::SeqCst );
	let current = api( ABI_VERSION );
	// SAFETY: as above
	assert_eq!( unsafe { run_init( &current, guest_extension::init )}, STATUS_OK );
	assert_eq!( REGISTER_CALLS.load( Ordering::SeqCst ) - before, 5 );

}
