//! sqltype command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use sqltype::cli::check::{self, CheckConfig};
use sqltype::cli::output::{self, ColorChoice};
use sqltype::cli::{SessionFlags, catalog};
use std::path::PathBuf;

/// SQL expression type checker
#[derive(Parser)]
#[command(name = "sqltype")]
#[command(author, version, about = "Type checking and constant folding for SQL expression trees", long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Treat `+` over strings as concatenation
    #[arg(long, global = true)]
    plus_as_concat: Option<bool>,

    /// MySQL date and numeric compatibility
    #[arg(long, global = true)]
    mysql: bool,

    /// Disable constant folding
    #[arg(long, global = true)]
    no_fold: bool,

    /// Fail on invalid date arithmetic instead of returning NULL
    #[arg(long, global = true)]
    strict_dates: bool,

    /// When to color output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type a JSON expression or query tree
    Check {
        /// Tree file (JSON)
        file: PathBuf,

        /// Statement text the tree's spans refer to
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the common type of two types
    Types {
        left: String,
        right: String,
    },

    /// List the overloads of an operator
    Signatures {
        /// Operator name or symbol (`+`, `date_add`, `IN`)
        operator: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    cli.color.apply();
    init_logging(cli.verbose);

    let flags = SessionFlags {
        config: cli.config.clone(),
        plus_as_concat: cli.plus_as_concat,
        mysql: cli.mysql,
        no_fold: cli.no_fold,
        strict_dates: cli.strict_dates,
    };

    let result: Result<bool> = match cli.command {
        Commands::Check {
            file,
            source,
            pretty,
            output,
        } => check::check(CheckConfig {
            file,
            source,
            flags,
            pretty,
            output_file: output,
            verbose: cli.verbose,
        }),
        Commands::Types { left, right } => flags.session_config().and_then(|config| {
            let common = catalog::common_type_of_names(&left, &right, &config)?;
            println!("{}", common);
            Ok(true)
        }),
        Commands::Signatures { operator } => flags.session_config().and_then(|config| {
            for line in catalog::signature_lines(&operator, &config)? {
                println!("{}", line);
            }
            Ok(true)
        }),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}
