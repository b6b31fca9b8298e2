//! Where extensions come from.
//!
//! The [`Loader`]( crate::Loader ) doesn't know how an identifier becomes code;
//! it asks an [`ExtensionSource`]. [`NativeSource`]( crate::NativeSource ) opens
//! shared libraries, [`StaticSource`] serves extensions compiled into the host,
//! and [`Chain`] tries several sources in turn.

use std::collections::HashMap ;
use std::path::Path ;
use std::sync::Arc ;

use crate::{ Extension, LoadError, ModuleId };



/// Platform collaborator resolving a module identifier to an [`Extension`].
pub trait ExtensionSource: Send + Sync {
	/// Resolves and opens `module`, looking in `directory` if given.
	///
	/// The loader has already checked that `directory` is a readable directory.
	///
	/// # Errors
	/// [`LoadError::NotFound`] if nothing resolves, [`LoadError::IncompatibleBinary`]
	/// if something does but can't be used.
	fn open( &self, module: &ModuleId, directory: Option<&Path> ) -> Result<Arc<dyn Extension>, LoadError> ;
}

impl<S: ExtensionSource + ?Sized> ExtensionSource for Box<S> {
	fn open( &self, module: &ModuleId, directory: Option<&Path> ) -> Result<Arc<dyn Extension>, LoadError> {
		( **self ).open( module, directory )
	}
}

/// Extensions registered ahead of time under fixed identifiers.
///
/// The directory hint is ignored.
#[derive( Default, Clone )]
pub struct StaticSource {
	extensions: HashMap<ModuleId, Arc<dyn Extension>>,
}

impl StaticSource {

	pub fn new() -> Self { Self::default() }

	/// Makes `extension` available under `module`, replacing any previous one.
	pub fn with( mut self, module: ModuleId, extension: impl Extension + 'static ) -> Self {
		self.extensions.insert( module, Arc::new( extension ));
		self
	}

	/// Like [`StaticSource::with`] but takes an already shared extension.
	pub fn with_shared( mut self, module: ModuleId, extension: Arc<dyn Extension> ) -> Self {
		self.extensions.insert( module, extension );
		self
	}

}

impl ExtensionSource for StaticSource {
	fn open( &self, module: &ModuleId, _directory: Option<&Path> ) -> Result<Arc<dyn Extension>, LoadError> {
		self.extensions.get( module )
			.cloned()
			.ok_or_else(|| LoadError::NotFound( module.to_string() ))
	}
}

impl std::fmt::Debug for StaticSource {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "StaticSource" )
			.field( "modules", &self.extensions.keys().collect::<Vec<_>>() )
			.finish()
	}
}

/// Tries `primary` first and falls back to `fallback` when it reports
/// [`LoadError::NotFound`]. Any other error is final.
#[derive( Debug, Clone )]
pub struct Chain<A, B> {
	primary: A,
	fallback: B,
}

impl<A, B> Chain<A, B> {
	pub fn new( primary: A, fallback: B ) -> Self { Self { primary, fallback }}
}

impl<A: ExtensionSource, B: ExtensionSource> ExtensionSource for Chain<A, B> {
	fn open( &self, module: &ModuleId, directory: Option<&Path> ) -> Result<Arc<dyn Extension>, LoadError> {
		match self.primary.open( module, directory ) {
			Err( LoadError::NotFound( _ )) => self.fallback.open( module, directory ),
			result => result,
		}
	}
}
