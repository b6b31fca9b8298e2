use std::path::PathBuf ;
use native_link::{ DuplicatePolicy, LoaderConfig };

#[test]
fn builder_methods_override_defaults() {

	let config = LoaderConfig::new()
		.with_search_paths([ "/a", "/b" ])
		.with_search_path( "/c" )
		.with_entry_symbol( "other_init" )
		.with_duplicate_policy( DuplicatePolicy::Reject );

	assert_eq!( config.search_paths(), &[ PathBuf::from( "/a" ), PathBuf::from( "/b" ), PathBuf::from( "/c" )]);
	assert_eq!( config.entry_symbol(), "other_init" );
	assert_eq!( config.duplicate_policy(), DuplicatePolicy::Reject );

}

#[test]
fn duplicate_policy_parses_and_prints() {
	for policy in [ DuplicatePolicy::Overwrite, DuplicatePolicy::Reject ] {
		assert_eq!( policy.to_string().parse::<DuplicatePolicy>(), Ok( policy ));
	}
	assert_eq!( " OVERWRITE ".parse::<DuplicatePolicy>(), Ok( DuplicatePolicy::Overwrite ));
	assert!( "".parse::<DuplicatePolicy>().is_err() );
}
