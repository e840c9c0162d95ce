use std::path::PathBuf;

use clap::Parser;
use drdl_unroll::{config, runner, unroll};

/// drdl-unroll - Flatten nested DRDL schemas into relational tables
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source DRDL file (default: src.drdl)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Destination DRDL file (default: dst.drdl)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML configuration file used instead of DRDL_UNROLL_* environment variables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Column segment marking a nested class (default: oid)
    #[arg(long)]
    class_marker: Option<String>,

    /// Substring marking array-position columns (default: _idx)
    #[arg(long)]
    index_marker: Option<String>,

    /// Rewrite mode: flatten, flatten-and-collapse or collapse
    #[arg(long)]
    mode: Option<unroll::RewriteMode>,

    /// Prefix for collapsed recursive table names
    #[arg(long)]
    collapsed_prefix: Option<String>,

    /// Fail on recursion shapes that cannot be collapsed instead of warning
    #[arg(long)]
    strict_recursion: bool,

    /// Warn on uncollapsible recursion shapes even if the config file sets strict mode
    #[arg(long, conflicts_with = "strict_recursion")]
    no_strict_recursion: bool,

    /// Default log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long)]
    log_level: Option<String>,
}

impl From<Cli> for config::CliConfig {
    fn from(cli: Cli) -> Self {
        config::CliConfig {
            config_file: cli.config,
            input: cli.input,
            output: cli.output,
            class_marker: cli.class_marker,
            index_marker: cli.index_marker,
            mode: cli.mode,
            collapsed_table_prefix: cli.collapsed_prefix,
            strict_recursion: match (cli.strict_recursion, cli.no_strict_recursion) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            log_level: cli.log_level,
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Create configuration from CLI args
    let cli_config: config::CliConfig = cli.into();
    let config = match config::UnrollConfig::from_cli(cli_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logger - defaults to the configured level, can be overridden with RUST_LOG
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Err(e) = runner::run_with_config(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
