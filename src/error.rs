use std::any::Any ;
use std::path::PathBuf ;
use thiserror::Error ;

use crate::handler::HandlerError ;



/// Errors that can occur when loading an extension module.
///
/// Returned from [`Loader::load`]( crate::Loader::load ) and
/// [`Runtime::load`]( crate::Runtime::load ).
#[derive( Error, Debug )]
pub enum LoadError {
	/// Module identifiers must not be empty.
	#[error( "Empty Module Identifier" )] EmptyIdentifier,
	/// No artifact could be resolved for the identifier.
	#[error( "Module Not Found: {0}" )] NotFound( String ),
	/// The search directory doesn't exist, isn't a directory or can't be read.
	#[error( "Invalid Location: {}", .0.display() )] InvalidLocation( PathBuf ),
	/// The artifact exists but can't be used by this host (wrong architecture,
	/// not a library, missing entry point or a different ABI version).
	#[error( "Incompatible Binary: {}: {reason}", .path.display() )]
	IncompatibleBinary { path: PathBuf, reason: String },
	/// The artifact loaded but its registration step failed or registered nothing.
	#[error( "Registration Failed: {module}: {reason}" )]
	RegistrationFailed { module: String, reason: String },
}

impl LoadError {
	/// Stable, human readable name of the error variant.
	pub fn kind( &self ) -> &'static str {
		match self {
			Self::EmptyIdentifier => "EmptyIdentifier",
			Self::NotFound( _ ) => "NotFound",
			Self::InvalidLocation( _ ) => "InvalidLocation",
			Self::IncompatibleBinary { .. } => "IncompatibleBinary",
			Self::RegistrationFailed { .. } => "RegistrationFailed",
		}
	}
}

/// Errors that can occur when invoking a named call.
///
/// An [`UnknownCall`]( Self::UnknownCall ) is raised by the dispatcher itself and
/// never by a handler, so the two are always distinguishable.
#[derive( Error, Debug )]
pub enum CallError {
	/// Nothing is registered under the given name.
	#[error( "Unknown Call: {0}" )] UnknownCall( String ),
	/// The arguments are not a map.
	#[error( "Malformed Arguments: {0}" )] MalformedArguments( String ),
	/// The handler ran and reported a failure. The message is passed through as-is.
	#[error( "Handler Error: {0}" )] HandlerError( #[from] HandlerError ),
}

impl CallError {
	/// Stable, human readable name of the error variant.
	pub fn kind( &self ) -> &'static str {
		match self {
			Self::UnknownCall( _ ) => "UnknownCall",
			Self::MalformedArguments( _ ) => "MalformedArguments",
			Self::HandlerError( _ ) => "HandlerError",
		}
	}
}

/// Errors that can occur when adding a handler to the registry.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum RegisterError {
	/// Call names must not be empty.
	#[error( "Empty Call Name" )] EmptyName,
	/// The name is taken and the dispatcher is configured to reject duplicates.
	#[error( "Duplicate Call: {name} (registered by {})", .owner.as_deref().unwrap_or( "<host>" ))]
	Duplicate { name: String, owner: Option<String> },
	/// The extension reported a failure of its own.
	#[error( "Extension Error: {0}" )] Extension( String ),
}

/// Errors that can occur when reading configuration.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum ConfigError {
	#[error( "Invalid value for {var}: '{value}'" )]
	InvalidValue { var: &'static str, value: String },
}

/// Text of a caught panic payload.
pub(crate) fn panic_message( panic: &( dyn Any + Send )) -> &str {
	panic.downcast_ref::<&str>().copied()
		.or_else(|| panic.downcast_ref::<String>().map( String::as_str ))
		.unwrap_or( "Panicked" )
}
