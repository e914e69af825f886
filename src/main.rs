use clap::{Parser as ClapParser, Subcommand};
use rql_engine::cli::{self, CliError, FilterOptions, ParseOptions};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "rql")]
#[command(about = "rql - Build, encode and evaluate RQL queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON query tree to the wire format
    Encode {
        /// Query tree, e.g. {"name":"eq","args":["name","pump"]}
        json: String,
    },

    /// Parse a wire query into its normalized JSON tree
    Parse {
        /// The wire query
        query: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Apply a wire query to a JSON array
    Filter {
        /// The wire query
        query: String,

        /// JSON array input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Visitor options file ({"propertyNameMap": {...}})
        #[arg(long)]
        options: Option<PathBuf>,

        /// Property alias, as alias=path (repeatable)
        #[arg(long = "map")]
        mappings: Vec<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Encode { json } => cli::execute_encode(&json).map(|rql| println!("{}", rql)),
        Commands::Parse { query, pretty } => {
            cli::execute_parse(&ParseOptions { query, pretty }).map(|json| println!("{}", json))
        }
        Commands::Filter {
            query,
            input,
            options,
            mappings,
            pretty,
        } => run_filter(query, input, options, mappings, pretty),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_filter(
    query: String,
    input: Option<String>,
    options: Option<PathBuf>,
    mappings: Vec<String>,
    pretty: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = options.map(std::fs::read_to_string).transpose()?;

    let output = cli::execute_filter(&FilterOptions {
        query,
        input,
        options,
        mappings,
    })?;

    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);
    Ok(())
}
