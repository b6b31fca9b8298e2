use std::io::Write ;
use std::sync::{ Arc, Mutex };
use crate::fixtures ;

#[derive( Clone, Default )]
struct Capture( Arc<Mutex<Vec<u8>>> );

impl Write for Capture {
	fn write( &mut self, buf: &[u8] ) -> std::io::Result<usize> {
		self.0.lock().expect( "Capture poisoned" ).extend_from_slice( buf );
		Ok( buf.len() )
	}
	fn flush( &mut self ) -> std::io::Result<()> { Ok(()) }
}

#[test]
fn only_successful_loads_are_reported_as_loaded() {

	let capture = Capture::default();
	let writer = capture.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_writer( move || writer.clone() )
		.with_ansi( false )
		.with_max_level( tracing::Level::INFO )
		.finish();

	let runtime = fixtures::runtime();
	tracing::subscriber::with_default( subscriber, || {
		assert!( runtime.load( "ext_empty", None ).is_err() );
		assert!( runtime.load( "ext_failing", None ).is_err() );
		runtime.load( "ext_shift", None ).expect( "Failed to load ext_shift" );
	});

	let logs = String::from_utf8( capture.0.lock().expect( "Capture poisoned" ).clone() ).expect( "Logs are UTF-8" );
	let loaded = logs.lines().filter(| line | line.contains( "Loaded module" )).collect::<Vec<_>>();

	assert_eq!( loaded.len(), 1, "{}", logs );
	assert!( loaded[0].contains( "ext_shift" ), "{}", logs );
	assert!( loaded[0].contains( "foo, bar" ), "{}", logs );

}
