//! Dynamically-typed values exchanged with handlers.
//!
//! Arguments and results cross the dispatcher as a [`Value`] tree. The
//! dispatcher never looks inside them; it is the handler's job to decide
//! whether a given [`ArgumentMap`] makes sense. JSON is used both as the
//! printable representation and as the wire format for native extensions.

use std::collections::BTreeMap ;
use pipe_trait::Pipe ;
use serde::{ Deserialize, Serialize };
use serde::de::DeserializeOwned ;



/// Named arguments passed to a handler.
pub type ArgumentMap = BTreeMap<String, Value> ;

/// A tagged union over everything a call may receive or return.
///
/// Numbers that fit into an `i64` are kept as [`Value::Integer`], everything
/// else numeric becomes a [`Value::Float`].
#[derive( Debug, Clone, PartialEq, Default, Serialize, Deserialize )]
#[serde( untagged )]
pub enum Value {
	#[default] Null,
	Bool( bool ),
	Integer( i64 ),
	Float( f64 ),
	String( String ),
	Sequence( Vec<Value> ),
	Map( ArgumentMap ),
}

impl Value {

	/// Converts any serialisable type into a [`Value`].
	///
	/// # Errors
	/// Fails if `value` cannot be represented as JSON (e.g. a map with non-string keys).
	pub fn from_serialize<T: Serialize + ?Sized>( value: &T ) -> Result<Self, serde_json::Error> {
		serde_json::to_value( value )?.pipe( serde_json::from_value )
	}

	/// Decodes this value into a concrete type.
	///
	/// # Errors
	/// Fails if the value's shape doesn't match `T`.
	pub fn deserialize_into<T: DeserializeOwned>( &self ) -> Result<T, serde_json::Error> {
		serde_json::to_value( self )?.pipe( serde_json::from_value )
	}

	#[inline] pub fn is_null( &self ) -> bool { matches!( self, Self::Null ) }

	#[inline] pub fn as_bool( &self ) -> Option<bool> {
		match self { Self::Bool( value ) => Some( *value ), _ => None }
	}

	#[inline] pub fn as_i64( &self ) -> Option<i64> {
		match self { Self::Integer( value ) => Some( *value ), _ => None }
	}

	/// Integers are widened, so this succeeds for any numeric value.
	#[allow( clippy::cast_precision_loss )]
	#[inline] pub fn as_f64( &self ) -> Option<f64> {
		match self {
			Self::Integer( value ) => Some( *value as f64 ),
			Self::Float( value ) => Some( *value ),
			_ => None,
		}
	}

	#[inline] pub fn as_str( &self ) -> Option<&str> {
		match self { Self::String( value ) => Some( value ), _ => None }
	}

	#[inline] pub fn as_sequence( &self ) -> Option<&[Value]> {
		match self { Self::Sequence( values ) => Some( values ), _ => None }
	}

	#[inline] pub fn as_map( &self ) -> Option<&ArgumentMap> {
		match self { Self::Map( map ) => Some( map ), _ => None }
	}

	/// Short name of the variant, used in diagnostics.
	pub fn kind( &self ) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool( _ ) => "bool",
			Self::Integer( _ ) => "integer",
			Self::Float( _ ) => "float",
			Self::String( _ ) => "string",
			Self::Sequence( _ ) => "sequence",
			Self::Map( _ ) => "map",
		}
	}

}

/// Renders the value as compact JSON.
impl std::fmt::Display for Value {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let text = serde_json::to_string( self ).map_err(|_| std::fmt::Error )?;
		f.write_str( &text )
	}
}

impl From<bool> for Value { fn from( value: bool ) -> Self { Self::Bool( value )}}
impl From<i32> for Value { fn from( value: i32 ) -> Self { Self::Integer( value.into() )}}
impl From<i64> for Value { fn from( value: i64 ) -> Self { Self::Integer( value )}}
impl From<u32> for Value { fn from( value: u32 ) -> Self { Self::Integer( value.into() )}}
impl From<f64> for Value { fn from( value: f64 ) -> Self { Self::Float( value )}}
impl From<&str> for Value { fn from( value: &str ) -> Self { Self::String( value.to_string() )}}
impl From<String> for Value { fn from( value: String ) -> Self { Self::String( value )}}
impl From<Vec<Value>> for Value { fn from( values: Vec<Value> ) -> Self { Self::Sequence( values )}}
impl From<ArgumentMap> for Value { fn from( map: ArgumentMap ) -> Self { Self::Map( map )}}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from( value: Option<T> ) -> Self {
		match value { Some( value ) => value.into(), None => Self::Null }
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<( K, V )> for Value {
	fn from_iter<I: IntoIterator<Item = ( K, V )>>( iter: I ) -> Self {
		Self::Map( iter.into_iter().map(|( key, value )| ( key.into(), value.into() )).collect() )
	}
}

/// Builds an [`ArgumentMap`] from `key => value` pairs.
///
/// ```
/// use native_link::{ args, Value };
///
/// let map = args!{ "bar" => 41, "baz" => "text" };
/// assert_eq!( map.get( "bar" ), Some( &Value::Integer( 41 )));
/// assert_eq!( map.get( "baz" ).and_then( Value::as_str ), Some( "text" ));
/// ```
#[macro_export]
macro_rules! args {
	() => { $crate::ArgumentMap::new() };
	( $( $key:expr => $value:expr ),+ $(,)? ) => {{
		let mut map = $crate::ArgumentMap::new();
		$( map.insert( ::std::string::String::from( $key ), $crate::Value::from( $value )); )+
		map
	}};
}
