//! Loader configuration.
//!
//! A [`LoaderConfig`] can be built in code or read from the environment:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `NATIVE_LINK_PATH` | Directories searched when `load` gets no directory, in platform path-list syntax | none |
//! | `NATIVE_LINK_ENTRY` | Symbol of the registration entry point | `native_link_module_init` |
//! | `NATIVE_LINK_DUPLICATES` | `overwrite` or `reject` | `overwrite` |

use std::path::PathBuf ;

use crate::{ ConfigError, DuplicatePolicy };



pub const PATH_VAR: &str = "NATIVE_LINK_PATH" ;
pub const ENTRY_VAR: &str = "NATIVE_LINK_ENTRY" ;
pub const DUPLICATES_VAR: &str = "NATIVE_LINK_DUPLICATES" ;

/// Symbol exported by [`export_extension!`]( crate::export_extension ).
pub const DEFAULT_ENTRY_SYMBOL: &str = "native_link_module_init" ;

/// Settings shared by the loader, the native source and the dispatcher.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct LoaderConfig {
	/// Fallback directories, searched in order
	search_paths: Vec<PathBuf>,
	/// Name of the registration entry point in native libraries
	entry_symbol: String,
	/// How the dispatcher treats a name registered twice
	duplicate_policy: DuplicatePolicy,
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			search_paths: Vec::new(),
			entry_symbol: DEFAULT_ENTRY_SYMBOL.to_string(),
			duplicate_policy: DuplicatePolicy::default(),
		}
	}
}

impl LoaderConfig {

	pub fn new() -> Self { Self::default() }

	/// Reads the configuration from the process environment.
	///
	/// # Errors
	/// Returns an error if a variable holds an unusable value.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(| var | std::env::var( var ).ok() )
	}

	/// Reads the configuration through an arbitrary variable lookup.
	///
	/// Unset and empty variables keep their defaults.
	///
	/// # Errors
	/// Returns an error if a variable holds an unusable value.
	pub fn from_lookup( lookup: impl Fn( &str ) -> Option<String> ) -> Result<Self, ConfigError> {

		let read = | var: &str | lookup( var ).filter(| value | !value.trim().is_empty() );
		let mut config = Self::default();

		if let Some( paths ) = read( PATH_VAR ) {
			config.search_paths = std::env::split_paths( &paths ).collect();
		}

		if let Some( symbol ) = read( ENTRY_VAR ) {
			if symbol.contains( '\0' ) {
				return Err( ConfigError::InvalidValue { var: ENTRY_VAR, value: symbol });
			}
			config.entry_symbol = symbol ;
		}

		if let Some( policy ) = read( DUPLICATES_VAR ) {
			config.duplicate_policy = policy.parse()?;
		}

		Ok( config )

	}

	/// Replaces the fallback search path.
	pub fn with_search_paths( mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>> ) -> Self {
		self.search_paths = paths.into_iter().map( Into::into ).collect();
		self
	}

	/// Appends a directory to the fallback search path.
	pub fn with_search_path( mut self, path: impl Into<PathBuf> ) -> Self {
		self.search_paths.push( path.into() );
		self
	}

	/// Sets the symbol looked up as the registration entry point.
	///
	/// Extensions built with [`export_extension!`]( crate::export_extension ) export
	/// [`DEFAULT_ENTRY_SYMBOL`]; only change this for libraries built otherwise.
	pub fn with_entry_symbol( mut self, symbol: impl Into<String> ) -> Self {
		self.entry_symbol = symbol.into();
		self
	}

	pub fn with_duplicate_policy( mut self, policy: DuplicatePolicy ) -> Self {
		self.duplicate_policy = policy ;
		self
	}

	#[inline] pub fn search_paths( &self ) -> &[PathBuf] { &self.search_paths }
	#[inline] pub fn entry_symbol( &self ) -> &str { &self.entry_symbol }
	#[inline] pub fn duplicate_policy( &self ) -> DuplicatePolicy { self.duplicate_policy }

}
