use once_cell::sync::Lazy ;
use native_link::{ args, Runtime, Value };
use crate::fixtures ;

static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
	let runtime = fixtures::runtime();
	runtime.load( "ext_a", None ).expect( "Failed to load ext_a" );
	runtime
});

#[test]
fn concurrent_invokes_return_their_own_results() {

	let results = std::thread::scope(| scope | {
		let workers = ( 0..16_i64 )
			.map(| worker | scope.spawn( move || ( 0..100_i64 )
				.map(| round | {
					let ( bar, baz ) = ( worker * 1000, round );
					( bar + baz, RUNTIME.invoke( "foo", &args!{ "bar" => bar, "baz" => baz }) )
				})
				.collect::<Vec<_>>()
			))
			.collect::<Vec<_>>();
		workers.into_iter()
			.flat_map(| worker | worker.join().expect( "Worker panicked" ))
			.collect::<Vec<_>>()
	});

	assert_eq!( results.len(), 1600 );
	for ( expected, result ) in results {
		match result {
			Ok( Value::Integer( sum )) => assert_eq!( sum, expected ),
			value => panic!( "Expected Ok( Integer( {} )), found: {:#?}", expected, value ),
		}
	}

}
