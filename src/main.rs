use std::path::PathBuf ;
use std::process::ExitCode ;
use clap::Parser ;
use tracing::debug ;
use tracing_subscriber::EnvFilter ;

use native_link::Runtime ;



/// Load native extensions and invoke their calls.
///
/// Modules are loaded first, in the order given, then calls are invoked in the
/// order given. Each result is printed as `[<json>]`. Search path, entry symbol
/// and duplicate policy are read from NATIVE_LINK_PATH, NATIVE_LINK_ENTRY and
/// NATIVE_LINK_DUPLICATES; RUST_LOG controls logging.
#[derive( Parser, Debug )]
#[command( name = "native-link", version, arg_required_else_help = true )]
#[command( after_help = "EXAMPLE:\n    native-link --dir target/debug --load wilton_rust --call foo '{\"bar\": 41, \"baz\": 42}'" )]
struct Cli {
	/// Directory the modules are loaded from, instead of the search path
	#[arg( long, value_name = "DIR" )]
	dir: Option<PathBuf>,

	/// Extension module to load (repeatable)
	#[arg( long = "load", value_name = "MODULE" )]
	load: Vec<String>,

	/// Call to invoke with a JSON object of arguments (repeatable)
	#[arg( long = "call", num_args = 2, value_names = [ "NAME", "JSON" ])]
	call: Vec<String>,
}

#[derive( Debug, PartialEq )]
enum Action {
	Load { name: String, directory: Option<PathBuf> },
	Call { name: String, args: String },
}

impl Cli {
	fn actions( self ) -> Vec<Action> {
		let directory = self.dir ;
		let loads = self.load.into_iter()
			.map(| name | Action::Load { name, directory: directory.clone() });
		let calls = self.call.chunks_exact( 2 )
			.map(| pair | Action::Call { name: pair[0].clone(), args: pair[1].clone() })
			.collect::<Vec<_>>();
		loads.chain( calls ).collect()
	}
}

fn main() -> ExitCode {

	tracing_subscriber::fmt()
		.with_env_filter( EnvFilter::from_default_env() )
		.with_writer( std::io::stderr )
		.init();

	let actions = Cli::parse().actions();

	let runtime = match Runtime::from_env() {
		Ok( runtime ) => runtime,
		Err( err ) => {
			eprintln!( "{}", err );
			return ExitCode::from( 2 );
		},
	};

	let mut failed = false ;
	for action in actions {
		debug!( ?action, "Running action" );
		match action {
			Action::Load { name, directory } => if let Err( err ) = runtime.load( &name, directory.as_deref() ) {
				eprintln!( "{}: {}", err.kind(), err );
				failed = true ;
			},
			Action::Call { name, args } => match runtime.invoke_json( &name, &args ) {
				Ok( value ) => println!( "[{}]", value ),
				Err( err ) => {
					eprintln!( "{}: {}", err.kind(), err );
					failed = true ;
				},
			},
		}
	}

	match failed {
		true => ExitCode::FAILURE,
		false => ExitCode::SUCCESS,
	}

}

#[cfg( test )]
mod tests {

	use super::* ;

	fn actions( args: &[&str] ) -> Result<Vec<Action>, clap::Error> {
		Cli::try_parse_from( std::iter::once( "native-link" ).chain( args.iter().copied() )).map( Cli::actions )
	}

	#[test]
	fn loads_run_before_calls() {
		let actions = actions( &[ "--call", "foo", "{}", "--dir", "build/debug", "--load", "a", "--load", "b" ])
			.expect( "Valid arguments" );
		assert_eq!( actions, vec![
			Action::Load { name: "a".to_string(), directory: Some( PathBuf::from( "build/debug" )) },
			Action::Load { name: "b".to_string(), directory: Some( PathBuf::from( "build/debug" )) },
			Action::Call { name: "foo".to_string(), args: "{}".to_string() },
		]);
	}

	#[test]
	fn calls_keep_their_order() {
		let actions = actions( &[ "--call", "foo", "{\"bar\": 1}", "--call", "bar", "" ]).expect( "Valid arguments" );
		assert_eq!( actions, vec![
			Action::Call { name: "foo".to_string(), args: "{\"bar\": 1}".to_string() },
			Action::Call { name: "bar".to_string(), args: String::new() },
		]);
	}

	#[test]
	fn missing_values_and_unknown_options() {
		assert!( actions( &[ "--call", "foo" ]).is_err() );
		assert!( actions( &[ "--load" ]).is_err() );
		assert!( actions( &[ "--frobnicate" ]).is_err() );
	}

	#[test]
	fn command_is_well_formed() {
		use clap::CommandFactory ;
		Cli::command().debug_assert();
	}

}
