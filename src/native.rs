//! Native extensions loaded from shared libraries.

use std::ffi::c_void ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use libloading::Library ;
use tracing::debug ;

use crate::{ ArgumentMap, Extension, HandlerError, LoadError, LoaderConfig, ModuleId, Registrar, RegisterError, Value };
use crate::ffi::{ self, AbiVersionFn, CallFn, EntryFn, HostApi, ABI_VERSION, ABI_VERSION_SYMBOL, STATUS_ERROR, STATUS_OK };
use crate::source::ExtensionSource ;



/// Resolves module identifiers to shared libraries and opens them.
///
/// The file name is the platform's library name for the identifier
/// (`libfoo.so`, `libfoo.dylib`, `foo.dll`). With an explicit directory only
/// that directory is searched. Otherwise the configured search path is tried in
/// order, and finally the bare file name is handed to the OS loader so that its
/// own search rules (e.g. `LD_LIBRARY_PATH`) apply.
#[derive( Debug, Clone )]
pub struct NativeSource {
	search_paths: Vec<PathBuf>,
	entry_symbol: Vec<u8>,
}

impl NativeSource {

	pub fn new( config: &LoaderConfig ) -> Self {
		let mut entry_symbol = config.entry_symbol().as_bytes().to_vec();
		entry_symbol.push( 0 );
		Self { search_paths: config.search_paths().to_vec(), entry_symbol }
	}

	fn resolve( &self, file_name: &Path, directory: Option<&Path> ) -> Option<PathBuf> {
		match directory {
			Some( directory ) => Some( directory.join( file_name )).filter(| path | path.is_file() ),
			None => self.search_paths.iter()
				.map(| directory | directory.join( file_name ))
				.find(| path | path.is_file() ),
		}
	}

	fn open_library( &self, path: &Path ) -> Result<NativeExtension, LoadError> {

		let incompatible = | reason: String | LoadError::IncompatibleBinary { path: path.to_path_buf(), reason };

		// SAFETY: loading a library runs its initialisers. Extensions are trusted code.
		let library = unsafe { Library::new( path ) }.map_err(| err | incompatible( err.to_string() ))?;
		Self::from_library( library, path, &self.entry_symbol ).map_err( incompatible )

	}

	fn from_library( library: Library, path: &Path, entry_symbol: &[u8] ) -> Result<NativeExtension, String> {

		// SAFETY: the symbol type is fixed by the ABI; the pointer is only used while `library` is alive.
		let abi_version = unsafe {
			let version = library.get::<AbiVersionFn>( ABI_VERSION_SYMBOL )
				.map_err(| err | format!( "Missing ABI version: {}", err ))?;
			version()
		};
		if abi_version != ABI_VERSION {
			return Err( format!( "ABI version {} is not supported (expected {})", abi_version, ABI_VERSION ));
		}

		// SAFETY: as above.
		let entry: EntryFn = *unsafe { library.get::<EntryFn>( entry_symbol ) }
			.map_err(| err | format!( "Missing entry point: {}", err ))?;

		Ok( NativeExtension { entry, library: Some( Arc::new( library )), path: Some( path.to_path_buf() ) })

	}

}

impl ExtensionSource for NativeSource {

	fn open( &self, module: &ModuleId, directory: Option<&Path> ) -> Result<Arc<dyn Extension>, LoadError> {

		let file_name = PathBuf::from( libloading::library_filename( module.as_str() ));

		if let Some( path ) = self.resolve( &file_name, directory ) {
			debug!( module = %module, path = %path.display(), "Opening native extension" );
			return Ok( Arc::new( self.open_library( &path )? ));
		}

		if directory.is_some() { return Err( LoadError::NotFound( module.to_string() )); }

		// Anything the OS loader can't find by bare name is reported as absent: at this
		// point there is no file of ours to blame.
		debug!( module = %module, file = %file_name.display(), "Falling back to the system search path" );
		// SAFETY: see `open_library`.
		let library = unsafe { Library::new( &file_name ) }
			.map_err(| _ | LoadError::NotFound( module.to_string() ))?;
		Self::from_library( library, &file_name, &self.entry_symbol )
			.map_err(| reason | LoadError::IncompatibleBinary { path: file_name, reason })
			.map(| extension | Arc::new( extension ) as Arc<dyn Extension> )

	}

}

/// An extension behind a native [`EntryFn`].
///
/// Usually produced by [`NativeSource`], which keeps the library loaded for as
/// long as the extension or any of its handlers is alive. Entry points linked
/// statically into the host can be wrapped with [`NativeExtension::from_entry`].
pub struct NativeExtension {
	entry: EntryFn,
	library: Option<Arc<Library>>,
	path: Option<PathBuf>,
}

impl NativeExtension {

	/// Wraps an entry point that lives in the host binary itself.
	pub fn from_entry( entry: EntryFn ) -> Self {
		Self { entry, library: None, path: None }
	}

}

impl std::fmt::Debug for NativeExtension {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "NativeExtension" )
			.field( "path", &self.path )
			.finish_non_exhaustive()
	}
}

struct HostSession<'r, 'a> {
	registrar: &'r mut Registrar<'a>,
	library: Option<Arc<Library>>,
	error: Option<String>,
}

impl Extension for NativeExtension {

	fn register( &self, registrar: &mut Registrar<'_> ) -> Result<(), RegisterError> {

		let mut session = HostSession { registrar, library: self.library.clone(), error: None };
		let api = HostApi {
			abi_version: ABI_VERSION,
			host: std::ptr::from_mut( &mut session ).cast::<c_void>(),
			register: host_register,
			fail: host_fail,
		};

		// SAFETY: `api` and the session it points to outlive the call.
		let status = unsafe { ( self.entry )( &api ) };

		match ( status, session.error ) {
			( _, Some( message )) => Err( RegisterError::Extension( message )),
			( STATUS_OK, None ) => Ok(()),
			( status, None ) => Err( RegisterError::Extension( format!( "Entry point returned status {}", status ))),
		}

	}

}

unsafe extern "C" fn host_register(
	host: *mut c_void,
	name: *const u8,
	name_len: usize,
	context: *mut c_void,
	call: CallFn,
) -> i32 {

	// SAFETY: `host` is the session pointer handed out in `NativeExtension::register`,
	// which is still on the stack while the entry point runs.
	let session = unsafe { &mut *host.cast::<HostSession<'_, '_>>() };
	// SAFETY: the extension passes a buffer valid for `name_len` bytes.
	let name = match std::str::from_utf8( unsafe { ffi::raw_bytes( name, name_len )}) {
		Ok( name ) => name.to_string(),
		Err( _ ) => {
			session.error.get_or_insert_with(|| "Call name is not valid UTF-8".to_string() );
			return STATUS_ERROR ;
		},
	};

	let handler = NativeHandler { context, call, _library: session.library.clone() };
	match session.registrar.register( name, handler ) {
		Ok(()) => STATUS_OK,
		Err( err ) => {
			session.error.get_or_insert_with(|| err.to_string() );
			STATUS_ERROR
		},
	}

}

unsafe extern "C" fn host_fail( host: *mut c_void, message: *const u8, message_len: usize ) {
	// SAFETY: see `host_register`.
	let session = unsafe { &mut *host.cast::<HostSession<'_, '_>>() };
	// SAFETY: the extension passes a buffer valid for `message_len` bytes.
	let message = String::from_utf8_lossy( unsafe { ffi::raw_bytes( message, message_len )}).into_owned();
	session.error.get_or_insert( message );
}

/// A handler implemented by a native extension.
struct NativeHandler {
	context: *mut c_void,
	call: CallFn,
	/// Keeps `call` and `context` mapped.
	_library: Option<Arc<Library>>,
}

// SAFETY: the ABI requires call functions to be callable from any thread with
// the context they registered, and the context is never touched by the host.
unsafe impl Send for NativeHandler {}
unsafe impl Sync for NativeHandler {}

impl crate::Handler for NativeHandler {

	fn call( &self, args: &ArgumentMap ) -> Result<Value, HandlerError> {

		let input = serde_json::to_vec( args )
			.map_err(| err | HandlerError::new( format!( "Unencodable Arguments: {}", err )))?;
		let mut output: Vec<u8> = Vec::new();

		// SAFETY: `input` and `output` outlive the call, and `write_to_vec` matches the sink type.
		let status = unsafe { ( self.call )(
			self.context,
			input.as_ptr(),
			input.len(),
			std::ptr::from_mut( &mut output ).cast::<c_void>(),
			ffi::write_to_vec,
		)};

		match status {
			STATUS_OK => serde_json::from_slice( &output )
				.map_err(| err | HandlerError::new( format!( "Invalid Handler Output: {}", err ))),
			_ => Err( HandlerError::new( String::from_utf8_lossy( &output ).into_owned() )),
		}

	}

}
