// Rust guideline compliant 2026-10-16

//! Helpmate CLI Application
//!
//! Command-line interface for the Helpmate helper marketplace.

use clap::Parser;
use helpmate_app::DataDir;
use helpmate_cli::commands::{
    self, booking::BookingAction, dispute::DisputeAction, helper::HelperAction,
    payment::PaymentAction,
};
use helpmate_cli::{create_formatter, init_tracing, OutputFormatter};
use helpmate_core::OutputFormat;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "helpmate",
    version,
    about = "Helpmate: on-demand helper marketplace",
    long_about = "Helpmate books household helpers: customers request jobs, helpers accept and work them through a checked lifecycle, and payments settle with optional escrow. All records live in JSONL files under .helpmate/.",
    after_help = "Examples:\n  helpmate init\n  helpmate booking create --customer cust-1 --category cleaning --address addr-1\n  helpmate booking accept bkg-0123456789 --helper helper-1\n  helpmate booking status bkg-0123456789 enroute --actor helper-1\n  helpmate payment record bkg-0123456789 --actor cust-1 --amount 450\n  helpmate helper rank --category cleaning --lat 12.97 --lng 77.59\n  helpmate dispute raise bkg-0123456789 --actor cust-1 --reason \"no show\"\n"
)]
struct Cli {
    /// Enable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Output format
    #[arg(long, value_enum, global = true)]
    format: Option<FormatArg>,

    /// Project root containing .helpmate (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Append JSON logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FormatArg {
    Json,
    Table,
    Plain,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Initialize a Helpmate data directory
    Init,

    /// Manage bookings
    Booking {
        #[command(subcommand)]
        action: BookingAction,
    },

    /// Manage payments and escrow
    Payment {
        #[command(subcommand)]
        action: PaymentAction,
    },

    /// Manage helper profiles, moderation, ranking and earnings
    Helper {
        #[command(subcommand)]
        action: HelperAction,
    },

    /// Raise and decide booking disputes
    Dispute {
        #[command(subcommand)]
        action: DisputeAction,
    },
}

/// Picks the output format: explicit flags first, then the data directory's
/// configured format, then tables.
fn resolve_format(cli: &Cli, root: Option<&Path>) -> OutputFormat {
    if let Some(format) = cli.format {
        return format.into();
    }
    if cli.json {
        return OutputFormat::Json;
    }
    DataDir::discover(root)
        .and_then(|data_dir| data_dir.load_config())
        .map(|config| config.output_format)
        .unwrap_or_default()
}

fn run(command: Option<Commands>, root: Option<&Path>, formatter: &dyn OutputFormatter, json: bool) -> anyhow::Result<()> {
    match command {
        Some(Commands::Init) => commands::init::execute(root, json),
        Some(Commands::Booking { action }) => commands::booking::execute(action, root, formatter),
        Some(Commands::Payment { action }) => commands::payment::execute(action, root, formatter),
        Some(Commands::Helper { action }) => commands::helper::execute(action, root, formatter),
        Some(Commands::Dispute { action }) => commands::dispute::execute(action, root, formatter),
        None => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli.log_level, cli.log_file.as_deref())?;

    let root = cli.root.clone();
    let format = resolve_format(&cli, root.as_deref());
    let formatter = create_formatter(format);
    let json = format == OutputFormat::Json;

    match run(cli.command, root.as_deref(), formatter.as_ref(), json) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!(error = %err, "Command failed");
            if json {
                println!("{}", formatter.format_error(&err));
            } else {
                eprintln!("{}", formatter.format_error(&err));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
