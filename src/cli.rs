use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "motionphoto")]
#[command(author, version, about = "Build and verify Motion Photo files")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Turn a video into a Motion Photo using one of its frames as the cover
    Encode {
        /// Video to embed
        #[arg(required = true)]
        video: PathBuf,

        /// Output file (default: video name with the configured suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cover frame position in milliseconds (overrides config)
        #[arg(long)]
        timestamp_ms: Option<u64>,
    },

    /// Check a file for Motion Photo conformance
    Verify {
        /// File to check
        #[arg(required = true)]
        file: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Read XMP through exiftool instead of scanning the file
        #[arg(long)]
        exiftool: bool,
    },

    /// Write the embedded image and video of a Motion Photo to separate files
    Extract {
        /// Motion Photo to split
        #[arg(required = true)]
        file: PathBuf,

        /// Where to write the cover image
        #[arg(long)]
        image: Option<PathBuf>,

        /// Where to write the video
        #[arg(long)]
        video: Option<PathBuf>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
