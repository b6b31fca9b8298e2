//! Idempotent loading of extension modules.

use std::collections::HashMap ;
use std::panic::{ catch_unwind, AssertUnwindSafe };
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex, PoisonError };
use itertools::Itertools ;
use nonempty_collections::NEVec ;
use tracing::{ debug, info };

use crate::{ Dispatcher, Extension, ExtensionSource, LoadError, ModuleId, Registrar };
use crate::error::panic_message ;



/// A module whose registration went through.
struct LoadedModule {
	/// Held so that native libraries stay mapped while their handlers are reachable.
	_extension: Arc<dyn Extension>,
	handlers: NEVec<String>,
	directory: Option<PathBuf>,
}

type Slot = Arc<Mutex<Option<LoadedModule>>> ;

/// Brings extension modules into the process and lets them register handlers.
///
/// Each module is loaded at most once; loading it again is a successful no-op.
/// Loads of the same identifier wait for each other, loads of different
/// identifiers don't. Handlers become callable only once the module's whole
/// registration succeeded; a failed load leaves neither handlers nor a loaded
/// module behind, so it can be retried.
pub struct Loader {
	source: Box<dyn ExtensionSource>,
	dispatcher: Arc<Dispatcher>,
	slots: Mutex<HashMap<ModuleId, Slot>>,
}

impl Loader {

	/// Creates a loader feeding `dispatcher` from `source`.
	pub fn new( source: impl ExtensionSource + 'static, dispatcher: Arc<Dispatcher> ) -> Self {
		Self { source: Box::new( source ), dispatcher, slots: Mutex::new( HashMap::new() ) }
	}

	#[inline] pub fn dispatcher( &self ) -> &Arc<Dispatcher> { &self.dispatcher }

	/// Loads `module` and runs its registration, unless that already happened.
	///
	/// # Errors
	/// - [`LoadError::InvalidLocation`] if `directory` is given but isn't a readable directory.
	/// - [`LoadError::NotFound`] if the source can't resolve the module.
	/// - [`LoadError::IncompatibleBinary`] if the artifact can't be used.
	/// - [`LoadError::RegistrationFailed`] if registration fails, panics, registers
	/// 	nothing or collides with a taken name under [`DuplicatePolicy::Reject`]( crate::DuplicatePolicy::Reject ).
	pub fn load( &self, module: &ModuleId, directory: Option<&Path> ) -> Result<(), LoadError> {

		if let Some( directory ) = directory { check_location( directory )?; }

		let slot = self.slot( module );
		let mut slot = slot.lock().unwrap_or_else( PoisonError::into_inner );

		if slot.is_some() {
			debug!( module = %module, "Module already loaded" );
			return Ok(());
		}

		let extension = self.source.open( module, directory )?;
		let failed = | reason: String | LoadError::RegistrationFailed { module: module.to_string(), reason };

		let mut registrar = Registrar::new( &self.dispatcher, module );
		match catch_unwind( AssertUnwindSafe(|| extension.register( &mut registrar ))) {
			Ok( Ok(())) => {},
			Ok( Err( err )) => return Err( failed( err.to_string() )),
			Err( panic ) => return Err( failed( format!( "Registration panicked: {}", panic_message( &*panic )))),
		}
		let staged = registrar.finish();

		let names = staged.iter().map(|( name, _ )| name.clone() ).collect::<Vec<_>>();
		let calls = names.iter().join( ", " );
		let handlers = NEVec::try_from_vec( names ).ok_or_else(|| failed( "No handlers registered".to_string() ))?;

		self.dispatcher.insert_all( Some( module ), staged ).map_err(| err | failed( err.to_string() ))?;
		info!( module = %module, calls = %calls, "Loaded module" );

		*slot = Some( LoadedModule { _extension: extension, handlers, directory: directory.map( Path::to_path_buf ) });
		Ok(())

	}

	fn slot( &self, module: &ModuleId ) -> Slot {
		let mut slots = self.slots.lock().unwrap_or_else( PoisonError::into_inner );
		Arc::clone( slots.entry( module.clone() ).or_default() )
	}

	fn with_loaded<T>( &self, module: &ModuleId, read: impl FnOnce( &LoadedModule ) -> T ) -> Option<T> {
		let slot = self.slots.lock().unwrap_or_else( PoisonError::into_inner ).get( module ).cloned()?;
		let slot = slot.lock().unwrap_or_else( PoisonError::into_inner );
		slot.as_ref().map( read )
	}

	/// Whether `module` has been loaded successfully.
	pub fn is_loaded( &self, module: &ModuleId ) -> bool {
		self.with_loaded( module, |_| ()).is_some()
	}

	/// Call names registered by `module` during its load, in registration order.
	pub fn handlers_of( &self, module: &ModuleId ) -> Option<NEVec<String>> {
		self.with_loaded( module, | loaded | loaded.handlers.clone() )
	}

	/// The directory `module` was loaded with, if one was given.
	pub fn directory_of( &self, module: &ModuleId ) -> Option<PathBuf> {
		self.with_loaded( module, | loaded | loaded.directory.clone() ).flatten()
	}

	/// All successfully loaded modules, sorted.
	pub fn loaded_modules( &self ) -> Vec<ModuleId> {
		let slots = self.slots.lock().unwrap_or_else( PoisonError::into_inner )
			.iter()
			.map(|( module, slot )| ( module.clone(), Arc::clone( slot )))
			.collect::<Vec<_>>();
		slots.into_iter()
			.filter(|( _, slot )| slot.lock().unwrap_or_else( PoisonError::into_inner ).is_some() )
			.map(|( module, _ )| module )
			.sorted()
			.collect()
	}

}

impl std::fmt::Debug for Loader {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Loader" )
			.field( "dispatcher", &self.dispatcher )
			.finish_non_exhaustive()
	}
}

fn check_location( directory: &Path ) -> Result<(), LoadError> {
	std::fs::read_dir( directory )
		.map(|_| ())
		.map_err(|_| LoadError::InvalidLocation( directory.to_path_buf() ))
}
