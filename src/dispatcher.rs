//! The call registry and its single invocation entry point.

use std::collections::HashMap ;
use std::collections::hash_map::Entry ;
use std::sync::{ Arc, PoisonError, RwLock };
use itertools::Itertools ;
use tracing::{ debug, warn };

use crate::{ ArgumentMap, CallError, ConfigError, Handler, ModuleId, RegisterError, Value };



/// What happens when a call name is registered a second time.
#[derive( Copy, Clone, Debug, Default, Eq, PartialEq, Hash )]
pub enum DuplicatePolicy {
	/// The newer handler replaces the older one and a warning is logged.
	#[default] Overwrite,
	/// The newer registration fails with [`RegisterError::Duplicate`].
	Reject,
}

impl std::str::FromStr for DuplicatePolicy {
	type Err = ConfigError ;
	fn from_str( value: &str ) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"overwrite" => Ok( Self::Overwrite ),
			"reject" => Ok( Self::Reject ),
			_ => Err( ConfigError::InvalidValue { var: crate::config::DUPLICATES_VAR, value: value.to_string() }),
		}
	}
}

impl std::fmt::Display for DuplicatePolicy {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self {
			Self::Overwrite => write!( f, "overwrite" ),
			Self::Reject => write!( f, "reject" ),
		}
	}
}

struct Registration {
	handler: Arc<dyn Handler>,
	/// `None` for handlers added directly by the host.
	owner: Option<ModuleId>,
}

/// Maps call names to handlers and invokes them.
///
/// The registry lock is only held while the map is read or written. Handlers
/// run outside of it, so any number of calls may execute in parallel and a
/// handler may itself call back into the dispatcher.
pub struct Dispatcher {
	registry: RwLock<HashMap<String, Registration>>,
	policy: DuplicatePolicy,
}

impl Dispatcher {

	/// Creates an empty dispatcher.
	pub fn new( policy: DuplicatePolicy ) -> Self {
		Self { registry: RwLock::new( HashMap::new() ), policy }
	}

	#[inline] pub fn policy( &self ) -> DuplicatePolicy { self.policy }

	/// Registers a handler owned by the host rather than by an extension.
	///
	/// # Errors
	/// - [`RegisterError::EmptyName`] if `name` is empty.
	/// - [`RegisterError::Duplicate`] if `name` is taken and the policy is [`DuplicatePolicy::Reject`].
	pub fn register( &self, name: impl Into<String>, handler: impl Handler ) -> Result<(), RegisterError> {
		let handler: Arc<dyn Handler> = Arc::new( handler );
		self.insert_all( None, vec![( name.into(), handler )])
	}

	/// Adds a batch of handlers under a single write lock, all or nothing.
	///
	/// Under [`DuplicatePolicy::Reject`] every name is checked before the first
	/// one is inserted. Names must be unique within `handlers`.
	pub(crate) fn insert_all(
		&self,
		owner: Option<&ModuleId>,
		handlers: Vec<( String, Arc<dyn Handler> )>,
	) -> Result<(), RegisterError> {

		if handlers.iter().any(|( name, _ )| name.is_empty() ) { return Err( RegisterError::EmptyName ); }

		let mut registry = self.registry.write().unwrap_or_else( PoisonError::into_inner );

		if self.policy == DuplicatePolicy::Reject {
			if let Some(( name, existing )) = handlers.iter().find_map(|( name, _ )| registry.get_key_value( name )) {
				return Err( RegisterError::Duplicate {
					name: name.clone(),
					owner: existing.owner.as_ref().map( ToString::to_string ),
				});
			}
		}

		for ( name, handler ) in handlers {
			let registration = Registration { handler, owner: owner.cloned() };
			match registry.entry( name ) {
				Entry::Vacant( entry ) => {
					debug!( call = %entry.key(), owner = ?owner, "Registered call" );
					entry.insert( registration );
				},
				Entry::Occupied( mut entry ) => {
					warn!(
						call = %entry.key(),
						previous = ?entry.get().owner,
						current = ?owner,
						"Overwriting registered call"
					);
					entry.insert( registration );
				},
			}
		}

		Ok(())

	}

	/// Invokes the handler registered under `name` with `args`.
	///
	/// The arguments and the handler's output are passed through untouched.
	/// Every call runs the handler again; nothing is cached or retried.
	///
	/// # Errors
	/// - [`CallError::UnknownCall`] if nothing is registered under `name`.
	/// - [`CallError::HandlerError`] if the handler reported a failure.
	pub fn invoke( &self, name: &str, args: &ArgumentMap ) -> Result<Value, CallError> {
		let handler = self.lookup( name ).ok_or_else(|| CallError::UnknownCall( name.to_string() ))?;
		debug!( call = name, "Dispatching call" );
		handler.call( args ).map_err( CallError::HandlerError )
	}

	/// Parses `args` as JSON and invokes `name` with it.
	///
	/// Empty input is treated as an empty map.
	///
	/// # Errors
	/// - [`CallError::MalformedArguments`] if `args` is not valid JSON or not an object.
	/// - Anything [`Dispatcher::invoke`] returns.
	pub fn invoke_json( &self, name: &str, args: &str ) -> Result<Value, CallError> {
		let args = parse_arguments( args )?;
		self.invoke( name, &args )
	}

	fn lookup( &self, name: &str ) -> Option<Arc<dyn Handler>> {
		self.registry.read().unwrap_or_else( PoisonError::into_inner )
			.get( name )
			.map(| registration | Arc::clone( &registration.handler ))
	}

	/// Whether a handler is registered under `name`.
	pub fn contains( &self, name: &str ) -> bool {
		self.registry.read().unwrap_or_else( PoisonError::into_inner ).contains_key( name )
	}

	/// The module owning the handler under `name`.
	///
	/// Returns `None` for unknown names, `Some( None )` for host-registered handlers.
	pub fn owner_of( &self, name: &str ) -> Option<Option<ModuleId>> {
		self.registry.read().unwrap_or_else( PoisonError::into_inner )
			.get( name )
			.map(| registration | registration.owner.clone() )
	}

	/// All registered call names, sorted.
	pub fn names( &self ) -> Vec<String> {
		self.registry.read().unwrap_or_else( PoisonError::into_inner )
			.keys()
			.cloned()
			.sorted()
			.collect()
	}

	pub fn len( &self ) -> usize {
		self.registry.read().unwrap_or_else( PoisonError::into_inner ).len()
	}

	pub fn is_empty( &self ) -> bool { self.len() == 0 }

}

impl Default for Dispatcher {
	fn default() -> Self { Self::new( DuplicatePolicy::default() )}
}

impl std::fmt::Debug for Dispatcher {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Dispatcher" )
			.field( "policy", &self.policy )
			.field( "calls", &self.names() )
			.finish_non_exhaustive()
	}
}

pub(crate) fn parse_arguments( text: &str ) -> Result<ArgumentMap, CallError> {
	if text.trim().is_empty() { return Ok( ArgumentMap::new() ); }
	match serde_json::from_str::<Value>( text ) {
		Ok( Value::Map( map )) => Ok( map ),
		Ok( other ) => Err( CallError::MalformedArguments( format!( "Expected a map, found {}", other.kind() ))),
		Err( err ) => Err( CallError::MalformedArguments( err.to_string() )),
	}
}
