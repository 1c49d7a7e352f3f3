// CLI definitions using clap

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "musedacled")]
#[command(author, version, about = "MuseDAC+ SPI LED strip driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// SPI device node to drive
    #[arg(
        long,
        global = true,
        default_value = "/dev/spidev0.0",
        value_name = "PATH"
    )]
    pub device: String,

    /// Capture frames in memory instead of writing to hardware
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the command loop: color/anim/stop/status lines on stdin
    #[command(visible_alias = "r")]
    Run,

    /// Set a static color frame and exit
    #[command(visible_alias = "c")]
    Color {
        /// Color tokens, e.g. red green:10 #00ff00:5
        #[arg(required = true)]
        spec: Vec<String>,
    },

    /// Print driver status and the command reference
    #[command(visible_alias = "s")]
    Status,
}
