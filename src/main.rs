use std::fs;

use clap::Parser;
use hsl::{
    error::ErrorReporter,
    interpreter::{
        evaluator::core::{DEFAULT_MAX_CALL_DEPTH, InterpreterOptions},
        script::Script,
    },
};
use tracing_subscriber::EnvFilter;

/// hsl runs small embedded scripts from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells hsl to look at a file instead of a script.
    #[arg(short, long)]
    file: bool,

    /// Call the first declared native overload when several match equally
    /// well, instead of failing.
    #[arg(long)]
    permit_ambiguous: bool,

    /// How deep script functions may recurse before the run fails.
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Only tokenize, parse and resolve the script; do not run it.
    #[arg(short, long)]
    resolve_only: bool,

    contents: String,
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_env("HSL_LOG"))
                             .with_writer(std::io::stderr)
                             .init();

    let args = Args::parse();

    let source = if args.file {
        fs::read_to_string(&args.contents).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                      &args.contents);
            std::process::exit(1);
        })
    } else {
        args.contents
    };

    let options = InterpreterOptions::default().permit_ambiguous_external_functions(args.permit_ambiguous)
                                               .max_call_depth(args.max_call_depth)
                                               .echo_print(true);
    let mut script = Script::new(source.as_str()).with_options(options);

    let result = if args.resolve_only {
        script.resolve()
    } else {
        script.evaluate().map(|_| ())
    };

    if let Err(error) = result {
        for diagnostic in ErrorReporter::new(&source).render_all(&error) {
            eprintln!("{diagnostic}");
        }
        std::process::exit(65);
    }
}
