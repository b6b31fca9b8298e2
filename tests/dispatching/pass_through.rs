use native_link::{ args, ArgumentMap, Value };
use crate::fixtures ;

fn nested_arguments() -> ArgumentMap {
	args!{
		"null" => Value::Null,
		"flag" => true,
		"count" => -7,
		"ratio" => 0.25,
		"name" => "native",
		"items" => vec![ Value::from( 1 ), Value::from( "two" ), Value::Null ],
		"inner" => args!{ "deep" => args!{ "deeper" => false }},
	}
}

#[test]
fn arguments_reach_the_handler_unmodified() {

	let runtime = fixtures::runtime();
	runtime.load( "ext_echo", None ).expect( "Failed to load ext_echo" );

	let args = nested_arguments();
	let result = runtime.invoke( "echo", &args ).expect( "echo failed" );

	assert_eq!( result, Value::Map( args.clone() ));
	assert_eq!( args, nested_arguments() );

}

#[test]
fn every_invoke_runs_the_handler_again() {

	use std::sync::Arc ;
	use std::sync::atomic::{ AtomicI64, Ordering };
	use native_link::handler::from_fn ;

	let runtime = fixtures::runtime();
	let calls = Arc::new( AtomicI64::new( 0 ));
	let counter = Arc::clone( &calls );
	runtime.dispatcher()
		.register( "tick", from_fn( move |_| Ok( Value::Integer( counter.fetch_add( 1, Ordering::SeqCst ) + 1 ))))
		.expect( "Failed to register tick" );

	let results = ( 0..3 )
		.map(|_| runtime.invoke( "tick", &args!{} ).expect( "tick failed" ))
		.collect::<Vec<_>>();

	assert_eq!( results, vec![ Value::Integer( 1 ), Value::Integer( 2 ), Value::Integer( 3 )]);
	assert_eq!( calls.load( Ordering::SeqCst ), 3 );

}
