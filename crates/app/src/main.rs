use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "slipread")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read amount and memo from Thai bank transfer slips", long_about = None)]
struct Cli {
    /// TOML file overriding the default scan settings
    #[arg(long, global = true, env = "SLIPREAD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Engine {
    /// Run the `tesseract` executable
    Cli,
    /// Link libtesseract in-process (needs the `tesseract` feature)
    Lib,
}

#[derive(Subcommand)]
enum Commands {
    /// Read slip images and print the results table
    Scan {
        /// Slip images; other files are skipped
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Existing results sheet (.csv/.xlsx/.ods) to continue numbering from
        #[arg(long)]
        append: Option<PathBuf>,

        /// OCR language hint, e.g. `eng+tha`
        #[arg(long)]
        language: Option<String>,

        #[arg(long, value_enum, default_value = "cli")]
        engine: Engine,

        /// Path to the tesseract executable
        #[arg(long, default_value = "tesseract", env = "SLIPREAD_TESSERACT")]
        tesseract: PathBuf,

        /// Tessdata directory for the in-process engine
        #[arg(long, env = "TESSDATA_PREFIX")]
        tessdata: Option<String>,

        #[command(flatten)]
        output: commands::OutputArgs,
    },
    /// Load a results sheet, optionally drop rows, and print or re-export it
    Import {
        sheet: PathBuf,

        /// Row numbers to remove; the rest are renumbered
        #[arg(long = "drop", value_delimiter = ',')]
        drop_rows: Vec<usize>,

        #[command(flatten)]
        output: commands::OutputArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { files, append, language, engine, tesseract, tessdata, output } => {
            let mut config = config;
            if let Some(language) = language {
                config.language = language;
            }
            let scan = commands::ScanArgs { files, append, engine, tesseract, tessdata, output };
            commands::scan(config, scan).await
        }
        Commands::Import { sheet, drop_rows, output } => {
            commands::import(&sheet, &drop_rows, &output)
        }
    }
}
