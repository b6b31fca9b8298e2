use std::path::Path ;
use std::sync::Arc ;

use crate::{
	ArgumentMap, CallError, ConfigError, Dispatcher, ExtensionSource, LoadError,
	Loader, LoaderConfig, ModuleId, NativeSource, Value,
};



/// The process-wide dispatch context.
///
/// Owns the [`Dispatcher`] and the [`Loader`] feeding it. Create one at startup
/// and pass it by reference to whatever needs to load modules or invoke calls.
/// Dropping it drops the registry; handlers of native modules that are still
/// shared elsewhere keep their libraries mapped.
#[derive( Debug )]
pub struct Runtime {
	dispatcher: Arc<Dispatcher>,
	loader: Loader,
}

impl Runtime {

	/// Creates a runtime loading native libraries as configured.
	pub fn new( config: &LoaderConfig ) -> Self {
		Self::with_source( config, NativeSource::new( config ))
	}

	/// Creates a runtime from [`LoaderConfig::from_env`].
	///
	/// # Errors
	/// Returns an error if an environment variable holds an unusable value.
	pub fn from_env() -> Result<Self, ConfigError> {
		Ok( Self::new( &LoaderConfig::from_env()? ))
	}

	/// Creates a runtime resolving modules through a custom source.
	pub fn with_source( config: &LoaderConfig, source: impl ExtensionSource + 'static ) -> Self {
		let dispatcher = Arc::new( Dispatcher::new( config.duplicate_policy() ));
		let loader = Loader::new( source, Arc::clone( &dispatcher ));
		Self { dispatcher, loader }
	}

	/// Loads the module named `name`. See [`Loader::load`].
	///
	/// # Errors
	/// [`LoadError::EmptyIdentifier`] for an empty name, otherwise see [`Loader::load`].
	pub fn load( &self, name: &str, directory: Option<&Path> ) -> Result<(), LoadError> {
		self.loader.load( &ModuleId::new( name )?, directory )
	}

	/// Invokes a call. See [`Dispatcher::invoke`].
	///
	/// # Errors
	/// See [`Dispatcher::invoke`].
	pub fn invoke( &self, name: &str, args: &ArgumentMap ) -> Result<Value, CallError> {
		self.dispatcher.invoke( name, args )
	}

	/// Invokes a call with JSON arguments. See [`Dispatcher::invoke_json`].
	///
	/// # Errors
	/// See [`Dispatcher::invoke_json`].
	pub fn invoke_json( &self, name: &str, args: &str ) -> Result<Value, CallError> {
		self.dispatcher.invoke_json( name, args )
	}

	#[inline] pub fn dispatcher( &self ) -> &Dispatcher { &self.dispatcher }
	#[inline] pub fn loader( &self ) -> &Loader { &self.loader }

}
