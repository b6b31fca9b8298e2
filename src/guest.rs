//! Writing native extensions in Rust.
//!
//! Build the extension as a `cdylib`, write an init function taking a
//! [`GuestRegistrar`] and export it with [`export_extension!`]( crate::export_extension ):
//!
//! ```
//! use native_link::guest::GuestRegistrar ;
//!
//! #[derive( serde::Deserialize )]
//! struct Input { bar: i64, baz: i64 }
//!
//! #[derive( serde::Serialize )]
//! struct Output { boo: i64, baa: i64 }
//!
//! fn init( registrar: &mut GuestRegistrar<'_> ) -> Result<(), String> {
//! 	registrar.register_typed( "foo", | input: Input | Output { boo: input.bar + 5, baa: input.baz + 5 })?;
//! 	registrar.register_typed( "bar", | input: Input | Output { boo: input.bar - 5, baa: input.baz - 5 })?;
//! 	Ok(())
//! }
//!
//! native_link::export_extension!( init );
//! # fn main() {}
//! ```
//!
//! Handlers run on whatever thread the host invokes them from. A panic inside
//! a handler or inside the init function is caught and reported to the host
//! as an ordinary failure carrying the panic message.

use std::ffi::c_void ;
use std::panic::{ catch_unwind, AssertUnwindSafe };
use serde::Serialize ;
use serde::de::DeserializeOwned ;

use crate::{ ArgumentMap, Handler };
use crate::ffi::{ self, HostApi, WriteFn, ABI_VERSION, STATUS_ERROR, STATUS_OK };
use crate::handler::typed ;
use crate::error::panic_message ;



/// Extension-side view of the [`HostApi`].
pub struct GuestRegistrar<'a> {
	api: &'a HostApi,
}

impl<'a> GuestRegistrar<'a> {

	/// Wraps the pointer received by the entry point.
	///
	/// Returns `None` for a null pointer or a host speaking another ABI version.
	///
	/// # Safety
	/// A non-null `api` must point to a valid [`HostApi`] for `'a`.
	pub unsafe fn from_raw( api: *const HostApi ) -> Option<Self> {
		// SAFETY: upheld by the caller
		let api = unsafe { api.as_ref() }?;
		( api.abi_version == ABI_VERSION ).then_some( Self { api })
	}

	/// Registers `handler` under `name` with the host.
	///
	/// # Errors
	/// Returns the host's rejection message, e.g. for a duplicate name.
	pub fn register( &mut self, name: &str, handler: impl Handler ) -> Result<(), String> {

		let handler: Box<dyn Handler> = Box::new( handler );
		let context = Box::into_raw( Box::new( handler ));

		// SAFETY: `host` and `register` come from the host, the name buffer is live for the call.
		let status = unsafe { ( self.api.register )(
			self.api.host,
			name.as_ptr(),
			name.len(),
			context.cast::<c_void>(),
			guest_call,
		)};

		match status {
			// Accepted handlers stay allocated until the process exits.
			STATUS_OK => Ok(()),
			_ => {
				// SAFETY: rejected, so the host dropped its copy of the pointer.
				drop( unsafe { Box::from_raw( context )});
				Err( format!( "Host rejected call '{}'", name ))
			},
		}

	}

	/// Registers a typed handler, see [`typed`].
	///
	/// # Errors
	/// See [`GuestRegistrar::register`].
	pub fn register_typed<I, O, F>( &mut self, name: &str, callback: F ) -> Result<(), String>
	where
		I: DeserializeOwned + 'static,
		O: Serialize + 'static,
		F: Fn( I ) -> O + Send + Sync + 'static,
	{
		self.register( name, typed( callback ))
	}

	/// Reports a registration failure to the host.
	pub fn fail( &mut self, message: &str ) {
		// SAFETY: as in `register`.
		unsafe { ( self.api.fail )( self.api.host, message.as_ptr(), message.len() ) };
	}

}

/// Runs an init function on behalf of an exported entry point.
///
/// Used by [`export_extension!`]( crate::export_extension ).
///
/// # Safety
/// `api` must be the pointer the host passed to the entry point.
pub unsafe fn run_init( api: *const HostApi, init: fn( &mut GuestRegistrar<'_> ) -> Result<(), String> ) -> i32 {

	// SAFETY: upheld by the caller
	let Some( mut registrar ) = ( unsafe { GuestRegistrar::from_raw( api )}) else { return STATUS_ERROR };

	let outcome = catch_unwind( AssertUnwindSafe(|| init( &mut registrar )))
		.unwrap_or_else(| panic | Err( panic_message( &*panic ).to_string() ));

	match outcome {
		Ok(()) => STATUS_OK,
		Err( message ) => {
			registrar.fail( &message );
			STATUS_ERROR
		},
	}

}

/// The [`ffi::CallFn`] behind every handler registered through a [`GuestRegistrar`].
unsafe extern "C" fn guest_call(
	context: *mut c_void,
	args: *const u8,
	args_len: usize,
	sink: *mut c_void,
	write: WriteFn,
) -> i32 {

	// SAFETY: `context` is the boxed handler leaked in `GuestRegistrar::register`.
	let handler = unsafe { &*context.cast::<Box<dyn Handler>>() };
	// SAFETY: the host passes a buffer valid for `args_len` bytes.
	let input = unsafe { ffi::raw_bytes( args, args_len )};

	let ( status, output ) = match catch_unwind( AssertUnwindSafe(|| run_handler( &**handler, input ))) {
		Ok( Ok( output )) => ( STATUS_OK, output ),
		Ok( Err( message )) => ( STATUS_ERROR, message ),
		Err( panic ) => ( STATUS_ERROR, panic_message( &*panic ).to_string() ),
	};

	// SAFETY: `sink` and `write` belong together and come from the host.
	unsafe { write( sink, output.as_ptr(), output.len() ) };
	status

}

fn run_handler( handler: &dyn Handler, input: &[u8] ) -> Result<String, String> {
	let args: ArgumentMap = match input.iter().all( u8::is_ascii_whitespace ) {
		true => ArgumentMap::new(),
		false => serde_json::from_slice( input ).map_err(| err | format!( "Invalid Arguments: {}", err ))?,
	};
	let output = handler.call( &args ).map_err(| err | err.message().to_string() )?;
	serde_json::to_string( &output ).map_err(| err | format!( "Unencodable Result: {}", err ))
}

/// Exports the symbols the host looks for, running `$init` on load.
///
/// `$init` must be a `fn( &mut GuestRegistrar<'_> ) -> Result<(), String>`.
/// Only one extension may be exported per library.
#[macro_export]
macro_rules! export_extension {
	( $init:path ) => {
		#[no_mangle]
		pub extern "C" fn native_link_abi_version() -> u32 { $crate::ffi::ABI_VERSION }

		/// # Safety
		/// Must only be called by the host with a valid `HostApi`.
		#[no_mangle]
		pub unsafe extern "C" fn native_link_module_init( api: *const $crate::ffi::HostApi ) -> i32 {
			// SAFETY: the host passes its own api pointer
			unsafe { $crate::guest::run_init( api, $init ) }
		}
	};
}
