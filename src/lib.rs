//! A native extension loader and named-call dispatcher for building modular applications.
//!
//! Extensions are shared libraries (or code linked into the host) that register
//! **handlers** under **call names**. The host loads them on demand and then
//! invokes calls by name with a map of dynamically-typed arguments.
//! `native_link` keeps the name → handler registry and routes calls to it.
//!
//! # Core Concepts
//!
//! - [`Runtime`]: The process-wide context. Owns a [`Dispatcher`] and the
//! 	[`Loader`] that feeds it. Created once at startup and passed by reference.
//!
//! - [`Dispatcher`]: The registry. [`Dispatcher::invoke`] looks a name up,
//! 	runs its handler synchronously and hands back exactly what the handler
//! 	returned. Unknown names are reported as [`CallError::UnknownCall`], which
//! 	no handler can produce.
//!
//! - [`Loader`]: Resolves a [`ModuleId`] through an [`ExtensionSource`] and lets
//! 	the resulting [`Extension`] register its handlers, once per module.
//!
//! - [`Value`] / [`ArgumentMap`]: A tagged union over null, bools, numbers,
//! 	strings, sequences and maps. JSON is its printable form.
//!
//! - **Sources**: [`NativeSource`] opens shared libraries speaking the C ABI in
//! 	[`ffi`]; [`StaticSource`] serves extensions compiled into the host;
//! 	[`source::Chain`] combines two.
//!
//! # Example
//!
//! ```
//! use native_link::{ args, Registrar, RegisterError, Runtime, LoaderConfig, StaticSource, ModuleId, Value, CallError };
//!
//! #[derive( serde::Deserialize )]
//! struct Input { bar: i64, baz: i64 }
//!
//! fn ext_a( registrar: &mut Registrar<'_> ) -> Result<(), RegisterError> {
//! 	registrar.register_typed( "foo", | input: Input | input.bar + input.baz )
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = StaticSource::new().with( ModuleId::new( "ext_a" )?, ext_a );
//! let runtime = Runtime::with_source( &LoaderConfig::default(), source );
//!
//! // Nothing is registered until the module is loaded.
//! assert!( matches!( runtime.invoke( "foo", &args!{} ), Err( CallError::UnknownCall( _ ))));
//!
//! runtime.load( "ext_a", None )?;
//! runtime.load( "ext_a", None )?; // no-op
//!
//! let result = runtime.invoke( "foo", &args!{ "bar" => 41, "baz" => 42 })?;
//! assert_eq!( result, Value::Integer( 83 ));
//! # Ok(())
//! # }
//! ```
//!
//! # Native Extensions
//!
//! With the default [`Runtime::new`], modules are shared libraries. A module
//! called `ext_a` is looked up as `libext_a.so` (`libext_a.dylib`, `ext_a.dll`)
//! in the directory passed to [`Runtime::load`], or along the configured
//! search path. See [`guest`] for writing one in Rust.
//!
//! ```no_run
//! # use native_link::{ Runtime, LoaderConfig };
//! # use std::path::Path ;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = Runtime::new( &LoaderConfig::from_env()? );
//! runtime.load( "wilton_rust", Some( Path::new( "target/debug" )))?;
//! println!( "[{}]", runtime.invoke_json( "foo", r#"{ "bar": 41, "baz": 42 }"# )? );
//! # Ok(())
//! # }
//! ```
//!
//! # Duplicate Names
//!
//! Call names are unique. When a name is registered again, the
//! [`DuplicatePolicy`] decides: [`DuplicatePolicy::Overwrite`] (the default)
//! replaces the old handler and logs a warning, [`DuplicatePolicy::Reject`]
//! fails the registration and, during a load, the load.
//!
//! # Logging
//!
//! Loading and dispatching emit [`tracing`] events. Nothing is printed unless
//! the application installs a subscriber.

mod value ;
mod error ;
pub mod handler ;
mod extension ;
mod dispatcher ;
pub mod config ;
pub mod source ;
mod native ;
mod loader ;
mod runtime ;
pub mod ffi ;
pub mod guest ;

pub use value::{ Value, ArgumentMap };
pub use error::{ LoadError, CallError, RegisterError, ConfigError };
pub use handler::{ Handler, HandlerError };
pub use extension::{ ModuleId, Extension, Registrar };
pub use dispatcher::{ Dispatcher, DuplicatePolicy };
pub use config::LoaderConfig ;
pub use source::{ ExtensionSource, StaticSource };
pub use native::{ NativeSource, NativeExtension };
pub use loader::Loader ;
pub use runtime::Runtime ;
#[doc( no_inline )]
pub use nonempty_collections::NEVec ;
