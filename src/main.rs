use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use colored::*;
use std::path::PathBuf;
use std::process;

use mdtidy_lib::exit_codes;

mod commands;

use commands::Session;

#[derive(Parser)]
#[command(name = "mdtidy", author, version, about = "Lint, fix and format Markdown documents", long_about = None)]
pub struct Cli {
    /// Settings file (.json or .toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// markdownlint config file (.json, .yaml) used instead of the mapped lint rules
    #[arg(long, global = true)]
    engine_config: Option<PathBuf>,

    /// Pretty-printer used by `fmt`
    #[arg(long, value_enum, default_value_t = PrinterKind::Builtin, global = true)]
    printer: PrinterKind,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PrinterKind {
    /// In-process whitespace canonicalization
    Builtin,
    /// The `prettier` CLI
    Prettier,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a document and print its issues
    Check { file: PathBuf },

    /// Fix lint issues in place
    Fix {
        file: PathBuf,

        /// Run one round at a time and ask before each further round
        #[arg(short, long)]
        interactive: bool,
    },

    /// Post-process and pretty-print a document in place
    Fmt {
        file: PathBuf,

        /// Only report whether the document is formatted
        #[arg(long)]
        check: bool,
    },

    /// Generate or refresh the table of contents
    Toc {
        file: PathBuf,

        /// Remove the table of contents instead
        #[arg(long)]
        remove: bool,
    },

    /// Print the effective engine configuration
    Config {
        /// Print the settings JSON Schema instead
        #[arg(long)]
        schema: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (detected from $SHELL if omitted)
        #[arg(value_enum)]
        shell: Option<Shell>,

        /// List available shells
        #[arg(long)]
        list: bool,
    },
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    if let Commands::Completions { shell, list } = cli.command {
        return Ok(commands::completions::handle_completions(shell, list));
    }

    let session = Session::load(cli.config.as_deref(), cli.engine_config.as_deref(), cli.printer)?;
    match cli.command {
        Commands::Check { file } => commands::check::handle_check(&session, &file),
        Commands::Fix { file, interactive } => commands::fix::handle_fix(&session, &file, interactive),
        Commands::Fmt { file, check } => commands::fmt::handle_fmt(&session, &file, check),
        Commands::Toc { file, remove } => commands::toc::handle_toc(&session, &file, remove),
        Commands::Config { schema } => commands::config::handle_config(&session, schema),
        Commands::Completions { .. } => Ok(exit_codes::SUCCESS),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e:#}", "Error".red().bold());
            exit_codes::TOOL_ERROR
        }
    };
    process::exit(code);
}
