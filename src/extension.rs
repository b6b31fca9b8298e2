//! The extension capability.
//!
//! An extension is anything that can populate a [`Dispatcher`] when asked to.
//! Sources ([`crate::source`]) turn a [`ModuleId`] into an [`Extension`]; the
//! [`Loader`]( crate::Loader ) then hands it a [`Registrar`] exactly once.

use std::sync::Arc ;
use serde::Serialize ;
use serde::de::DeserializeOwned ;
use tracing::warn ;

use crate::{ Dispatcher, DuplicatePolicy, Handler, LoadError, RegisterError };
use crate::handler::typed ;



/// Identifier of a loadable extension module.
///
/// Guaranteed non-empty. For native modules this is the library name without
/// platform prefix and suffix (`"my_ext"` resolves to `libmy_ext.so` on Linux).
#[derive( Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd )]
pub struct ModuleId( String );

impl ModuleId {
	/// Creates a new module identifier.
	///
	/// # Errors
	/// Returns [`LoadError::EmptyIdentifier`] for an empty string.
	pub fn new( id: impl Into<String> ) -> Result<Self, LoadError> {
		let id = id.into();
		match id.is_empty() {
			true => Err( LoadError::EmptyIdentifier ),
			false => Ok( Self( id )),
		}
	}

	#[inline] pub fn as_str( &self ) -> &str { &self.0 }
}

impl std::fmt::Display for ModuleId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> Result<(), std::fmt::Error> {
		f.write_str( &self.0 )
	}
}

impl AsRef<str> for ModuleId {
	fn as_ref( &self ) -> &str { &self.0 }
}

impl TryFrom<&str> for ModuleId {
	type Error = LoadError ;
	fn try_from( id: &str ) -> Result<Self, Self::Error> { Self::new( id )}
}

impl TryFrom<String> for ModuleId {
	type Error = LoadError ;
	fn try_from( id: String ) -> Result<Self, Self::Error> { Self::new( id )}
}

/// A unit of code that registers call handlers.
///
/// `register` is called at most once per successful load. Registering zero
/// handlers counts as a failed load.
pub trait Extension: Send + Sync {
	/// Adds this extension's handlers through the registrar.
	///
	/// # Errors
	/// Any error, or a panic, aborts the load with [`LoadError::RegistrationFailed`].
	/// None of the handlers registered before the failure become callable.
	fn register( &self, registrar: &mut Registrar<'_> ) -> Result<(), RegisterError> ;
}

impl<F> Extension for F
where
	F: Fn( &mut Registrar<'_> ) -> Result<(), RegisterError> + Send + Sync,
{
	fn register( &self, registrar: &mut Registrar<'_> ) -> Result<(), RegisterError> { self( registrar ) }
}

/// Collects the handlers of one module while it registers.
///
/// Nothing reaches the [`Dispatcher`] until the whole registration succeeded;
/// the [`Loader`]( crate::Loader ) then adds every collected handler at once,
/// recorded as owned by the module. Name conflicts under
/// [`DuplicatePolicy::Reject`] are reported as early as possible so that the
/// extension can react to them.
pub struct Registrar<'a> {
	dispatcher: &'a Dispatcher,
	module: &'a ModuleId,
	staged: Vec<( String, Arc<dyn Handler> )>,
}

impl<'a> Registrar<'a> {

	pub(crate) fn new( dispatcher: &'a Dispatcher, module: &'a ModuleId ) -> Self {
		Self { dispatcher, module, staged: Vec::new() }
	}

	/// The module this registrar acts for.
	#[inline] pub fn module( &self ) -> &ModuleId { self.module }

	/// Registers `handler` under `name`.
	///
	/// # Errors
	/// - [`RegisterError::EmptyName`] if `name` is empty.
	/// - [`RegisterError::Duplicate`] if `name` is already taken, by this module
	/// 	or another one, and the policy is [`DuplicatePolicy::Reject`].
	pub fn register( &mut self, name: impl Into<String>, handler: impl Handler ) -> Result<(), RegisterError> {
		self.register_shared( name.into(), Arc::new( handler ))
	}

	/// Registers a typed handler, see [`typed`].
	///
	/// # Errors
	/// See [`Registrar::register`].
	pub fn register_typed<I, O, F>( &mut self, name: impl Into<String>, callback: F ) -> Result<(), RegisterError>
	where
		I: DeserializeOwned + 'static,
		O: Serialize + 'static,
		F: Fn( I ) -> O + Send + Sync + 'static,
	{
		self.register( name, typed( callback ))
	}

	pub(crate) fn register_shared( &mut self, name: String, handler: Arc<dyn Handler> ) -> Result<(), RegisterError> {

		if name.is_empty() { return Err( RegisterError::EmptyName ); }

		let staged = self.staged.iter().position(|( staged, _ )| *staged == name );

		if self.dispatcher.policy() == DuplicatePolicy::Reject {
			if staged.is_some() {
				return Err( RegisterError::Duplicate { name, owner: Some( self.module.to_string() )});
			}
			if let Some( owner ) = self.dispatcher.owner_of( &name ) {
				return Err( RegisterError::Duplicate { name, owner: owner.as_ref().map( ToString::to_string ) });
			}
		}

		match staged {
			Some( index ) => {
				warn!( module = %self.module, call = %name, "Call registered twice by the same module" );
				self.staged[index].1 = handler ;
			},
			None => self.staged.push(( name, handler )),
		}
		Ok(())

	}

	/// Names registered so far, in registration order.
	pub fn registered( &self ) -> impl Iterator<Item = &str> + '_ {
		self.staged.iter().map(|( name, _ )| name.as_str() )
	}

	pub(crate) fn finish( self ) -> Vec<( String, Arc<dyn Handler> )> { self.staged }

}
