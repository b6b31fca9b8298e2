use native_link::{ LoadError, LoaderConfig, ModuleId, Runtime };
use crate::fixture_library::{ LIBRARIES, MODULE };

#[test]
fn library_without_version_symbol() {

	let runtime = Runtime::new( &LoaderConfig::default() );

	match runtime.load( MODULE, Some( &LIBRARIES.no_abi_version )) {
		Err( LoadError::IncompatibleBinary { path, reason }) => {
			assert!( reason.starts_with( "Missing ABI version" ), "{}", reason );
			assert_eq!( path, LIBRARIES.no_abi_version.join( libloading::library_filename( MODULE )));
		},
		value => panic!( "Expected IncompatibleBinary, found: {:#?}", value ),
	}

}

#[test]
fn library_with_other_version() {

	let runtime = Runtime::new( &LoaderConfig::default() );

	match runtime.load( MODULE, Some( &LIBRARIES.abi_mismatch )) {
		Err( LoadError::IncompatibleBinary { reason, .. }) => assert!( reason.contains( "ABI version 99" ), "{}", reason ),
		value => panic!( "Expected IncompatibleBinary, found: {:#?}", value ),
	}
	assert!( !runtime.loader().is_loaded( &ModuleId::new( MODULE ).expect( "Non-empty" )));

}
