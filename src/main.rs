use clap::{Parser as ClapParser, Subcommand};
use peek_query::cli::{self, CheckMode, CheckOptions, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "peek")]
#[command(about = "peek - Query and search JSON snapshots with paths and expressions")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and print its AST as JSON
    Parse {
        /// The expression to parse
        expression: String,
    },

    /// Evaluate an expression against a JSON object
    Eval {
        /// The expression to evaluate
        expression: String,

        /// JSON object whose keys are bound as names (reads from stdin if piped)
        #[arg(short, long)]
        context: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Tokenize a path and print the tokens and canonical form
    Tokens {
        /// The path to tokenize
        path: String,
    },

    /// Run a path query and print every match
    Query {
        /// The path to run
        path: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Search a snapshot with a path or a key fragment
    Search {
        /// Path expression or key fragment
        query: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'peek docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse { expression } => run_check(CheckMode::Parse, expression, None, true),
        Commands::Eval {
            expression,
            context,
            pretty,
        } => read_input(context)
            .and_then(|input| run_check(CheckMode::Eval, expression, input, pretty)),
        Commands::Tokens { path } => run_check(CheckMode::Tokens, path, None, true),
        Commands::Query {
            path,
            input,
            pretty,
        } => read_input(input).and_then(|input| run_check(CheckMode::Query, path, input, pretty)),
        Commands::Search {
            query,
            input,
            pretty,
        } => read_input(input)
            .and_then(|input| run_check(CheckMode::Search, query, input, pretty)),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// The flag value, else stdin when it is piped.
fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn run_check(
    mode: CheckMode,
    source: String,
    input: Option<String>,
    pretty: bool,
) -> Result<(), CliError> {
    let options = CheckOptions {
        mode,
        source,
        input,
    };

    let output = cli::execute_check(&options)?;
    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }?;
    println!("{}", json);
    Ok(())
}
