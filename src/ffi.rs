//! The C ABI spoken between the host and native extensions.
//!
//! A native extension is a shared library exporting two symbols:
//!
//! - `native_link_abi_version`: [`AbiVersionFn`], must return [`ABI_VERSION`].
//! - the entry point (by default `native_link_module_init`): [`EntryFn`].
//!
//! The host calls the entry point once with a [`HostApi`]. The extension calls
//! [`HostApi::register`] for every handler it provides, passing an opaque
//! context pointer and a [`CallFn`]. Arguments and results travel as UTF-8 JSON.
//! Output is never allocated by the extension on behalf of the host: call
//! functions push their bytes into a host-owned sink through a [`WriteFn`].
//!
//! Extensions written in Rust should use [`crate::guest`] rather than this
//! module directly.

use std::ffi::c_void ;



/// Version of the ABI described by this module.
pub const ABI_VERSION: u32 = 1 ;

/// Symbol name of the [`AbiVersionFn`], nul-terminated.
pub const ABI_VERSION_SYMBOL: &[u8] = b"native_link_abi_version\0" ;

pub const STATUS_OK: i32 = 0 ;
pub const STATUS_ERROR: i32 = 1 ;

/// Appends `len` bytes at `data` to the sink.
pub type WriteFn = unsafe extern "C" fn( sink: *mut c_void, data: *const u8, len: usize );

/// Executes a registered handler.
///
/// `args` holds a JSON object. On [`STATUS_OK`] the bytes written to `sink`
/// are the JSON result, otherwise they are the error message.
pub type CallFn = unsafe extern "C" fn(
	context: *mut c_void,
	args: *const u8,
	args_len: usize,
	sink: *mut c_void,
	write: WriteFn,
) -> i32 ;

/// Registers `call` under the UTF-8 name at `name`. Returns [`STATUS_OK`] on success.
///
/// The host keeps `context` for as long as the handler is reachable; the
/// extension must not free it.
pub type RegisterFn = unsafe extern "C" fn(
	host: *mut c_void,
	name: *const u8,
	name_len: usize,
	context: *mut c_void,
	call: CallFn,
) -> i32 ;

/// Reports a registration failure with a UTF-8 message.
pub type FailFn = unsafe extern "C" fn( host: *mut c_void, message: *const u8, message_len: usize );

/// Registration entry point. Returns [`STATUS_OK`] on success.
pub type EntryFn = unsafe extern "C" fn( api: *const HostApi ) -> i32 ;

/// Reports the ABI version the library was built against.
pub type AbiVersionFn = unsafe extern "C" fn() -> u32 ;

/// Host services handed to an extension's entry point.
///
/// Only valid for the duration of the entry point call.
#[repr( C )]
pub struct HostApi {
	pub abi_version: u32,
	pub host: *mut c_void,
	pub register: RegisterFn,
	pub fail: FailFn,
}

/// Views a raw pointer and length as a byte slice, tolerating null.
///
/// # Safety
/// Unless `ptr` is null or `len` is zero, `ptr` must be valid for reads of `len`
/// bytes for the lifetime `'a`.
pub(crate) unsafe fn raw_bytes<'a>( ptr: *const u8, len: usize ) -> &'a [u8] {
	match ptr.is_null() || len == 0 {
		true => &[],
		// SAFETY: upheld by the caller
		false => unsafe { std::slice::from_raw_parts( ptr, len ) },
	}
}

/// [`WriteFn`] whose sink is a `Vec<u8>`.
pub(crate) unsafe extern "C" fn write_to_vec( sink: *mut c_void, data: *const u8, len: usize ) {
	// SAFETY: the host only ever passes this function together with a `*mut Vec<u8>`
	// that outlives the call, and the callee passes back a buffer valid for `len` bytes.
	unsafe {
		let sink = &mut *sink.cast::<Vec<u8>>();
		sink.extend_from_slice( raw_bytes( data, len ));
	}
}
