use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stikqr")]
#[command(about = "Scan, generate and keep a history of QR codes")]
#[command(version)]
pub struct Cli {
    /// Show debug logging
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    /// Config file (defaults to ~/.config/stikqr/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Settings database holding the scan history
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode QR codes from image files and add them to the history
    Scan(ScanArgs),

    /// Sample frames from a directory and add every code seen
    Watch(WatchArgs),

    /// Generate a QR code from text
    Generate(GenerateArgs),

    /// List scanned codes, most recent first
    List(ListArgs),

    /// Print the content of a scanned code
    Show(IdArgs),

    /// Open a scanned URL with the default handler
    Open(IdArgs),

    /// Remove a scanned code from the history
    Delete(IdArgs),

    /// Remove every scanned code
    Clear(ClearArgs),

    /// Write one or all scanned codes to a text file
    Export(ExportArgs),
}

#[derive(Parser)]
pub struct ScanArgs {
    /// Images to decode
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct WatchArgs {
    /// Directory receiving frames, one image file per frame
    pub dir: PathBuf,

    /// Keep waiting for new frames instead of stopping when the directory is drained
    #[arg(long, default_value_t = false)]
    pub follow: bool,

    /// Stop after this long, e.g. "30s" or "5m"
    #[arg(long)]
    pub duration: Option<String>,

    /// Wait between polls for new frames, e.g. "250ms"
    #[arg(long)]
    pub interval: Option<String>,

    /// Switch the source's illumination aid on
    #[arg(long, default_value_t = false)]
    pub torch: bool,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Text or URL to encode
    pub text: String,

    /// Write a PNG here instead of printing to the terminal
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Pixels per module in the PNG
    #[arg(long)]
    pub scale: Option<u32>,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct IdArgs {
    /// Id of the scanned code (any unique prefix)
    pub id: String,
}

#[derive(Parser)]
pub struct ClearArgs {
    /// Skip confirmation
    #[arg(long, default_value_t = false)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Export only this code (any unique id prefix); all codes when omitted
    pub id: Option<String>,

    /// Open the export with the default handler instead of printing its path
    #[arg(long, default_value_t = false)]
    pub open: bool,

    /// Directory to write into (defaults to the temporary directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}
