//! Call handlers.
//!
//! A [`Handler`] receives the caller's [`ArgumentMap`] and produces a [`Value`]
//! or a [`HandlerError`]. Plain closures of the right shape are handlers; use
//! [`typed`] or [`try_typed`] to work with concrete serde types instead of raw
//! values.

use std::marker::PhantomData ;
use serde::Serialize ;
use serde::de::DeserializeOwned ;
use thiserror::Error ;

use crate::{ ArgumentMap, Value };



/// Failure reported by a handler.
///
/// The message is defined by the handler and is opaque to the dispatcher.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
#[error( "{message}" )]
pub struct HandlerError {
	message: String,
}

impl HandlerError {
	pub fn new( message: impl Into<String> ) -> Self { Self { message: message.into() }}
	#[inline] pub fn message( &self ) -> &str { &self.message }
}

impl From<String> for HandlerError {
	fn from( message: String ) -> Self { Self { message }}
}

impl From<&str> for HandlerError {
	fn from( message: &str ) -> Self { Self::new( message )}
}

/// A function registered under a call name.
///
/// Handlers may be invoked from several threads at once; any synchronisation
/// they need is their own business.
pub trait Handler: Send + Sync + 'static {
	/// Executes the call.
	///
	/// # Errors
	/// Whatever the handler considers a failure.
	fn call( &self, args: &ArgumentMap ) -> Result<Value, HandlerError> ;
}

impl<F> Handler for F
where
	F: Fn( &ArgumentMap ) -> Result<Value, HandlerError> + Send + Sync + 'static,
{
	fn call( &self, args: &ArgumentMap ) -> Result<Value, HandlerError> { self( args ) }
}

/// Pins a closure to the raw handler signature so its argument and error
/// types don't need spelling out.
pub fn from_fn<F>( callback: F ) -> F
where
	F: Fn( &ArgumentMap ) -> Result<Value, HandlerError> + Send + Sync + 'static,
{
	callback
}

/// Wraps an infallible `Fn( I ) -> O` as a [`Handler`].
///
/// Arguments are decoded into `I` and the output encoded from `O`; a decoding
/// failure is reported as a [`HandlerError`].
///
/// ```
/// use native_link::{ args, handler::typed, Handler, Value };
///
/// #[derive( serde::Deserialize )]
/// struct Input { bar: i64, baz: i64 }
///
/// let sum = typed(| input: Input | input.bar + input.baz );
/// assert_eq!( sum.call( &args!{ "bar" => 41, "baz" => 42 }), Ok( Value::Integer( 83 )));
/// assert!( sum.call( &args!{ "bar" => "nope" }).is_err() );
/// ```
pub fn typed<I, O, F>( callback: F ) -> Typed<I, O, F>
where
	I: DeserializeOwned,
	O: Serialize,
	F: Fn( I ) -> O + Send + Sync + 'static,
{
	Typed { callback, _marker: PhantomData }
}

/// Wraps a fallible `Fn( I ) -> Result<O, E>` as a [`Handler`].
///
/// The error is rendered with [`Display`]( std::fmt::Display ) into the
/// [`HandlerError`] message.
pub fn try_typed<I, O, E, F>( callback: F ) -> TryTyped<I, O, E, F>
where
	I: DeserializeOwned,
	O: Serialize,
	E: std::fmt::Display,
	F: Fn( I ) -> Result<O, E> + Send + Sync + 'static,
{
	TryTyped { callback, _marker: PhantomData }
}

/// See [`typed`].
pub struct Typed<I, O, F> {
	callback: F,
	_marker: PhantomData<fn( I ) -> O>,
}

/// See [`try_typed`].
pub struct TryTyped<I, O, E, F> {
	callback: F,
	_marker: PhantomData<fn( I ) -> Result<O, E>>,
}

impl<I, O, F> Handler for Typed<I, O, F>
where
	I: DeserializeOwned + 'static,
	O: Serialize + 'static,
	F: Fn( I ) -> O + Send + Sync + 'static,
{
	fn call( &self, args: &ArgumentMap ) -> Result<Value, HandlerError> {
		encode( &( self.callback )( decode( args )? ))
	}
}

impl<I, O, E, F> Handler for TryTyped<I, O, E, F>
where
	I: DeserializeOwned + 'static,
	O: Serialize + 'static,
	E: std::fmt::Display + 'static,
	F: Fn( I ) -> Result<O, E> + Send + Sync + 'static,
{
	fn call( &self, args: &ArgumentMap ) -> Result<Value, HandlerError> {
		match ( self.callback )( decode( args )? ) {
			Ok( output ) => encode( &output ),
			Err( err ) => Err( HandlerError::new( err.to_string() )),
		}
	}
}

fn decode<I: DeserializeOwned>( args: &ArgumentMap ) -> Result<I, HandlerError> {
	serde_json::to_value( args )
		.and_then( serde_json::from_value )
		.map_err(| err | HandlerError::new( format!( "Invalid Arguments: {}", err )))
}

fn encode<O: Serialize>( output: &O ) -> Result<Value, HandlerError> {
	Value::from_serialize( output )
		.map_err(| err | HandlerError::new( format!( "Unencodable Result: {}", err )))
}
