use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "squeeze-workflow",
    about = "Upload, preview, compress and download a single image",
    long_about = "squeeze-workflow runs the single-image compression workflow: the file is validated \
                  (images only, 10MB maximum), previewed, compressed toward a target size with the \
                  chosen quality and maximum dimension, and the result is saved as compressed_<name>.",
    version,
    after_help = "EXAMPLES:\n  \
    squeeze-workflow compress photo.jpg -q 75 -w 1280\n  \
    squeeze-workflow compress shot.png -o small.png --target-size 0.2\n  \
    squeeze-workflow check photo.jpg"
)]
pub struct Args {
    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Path to a TOML config file",
        long_help = "TOML file with target_size_mb, prefer_off_thread, default_quality and \
                     default_max_dimension. Command-line flags take precedence."
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print workflow transitions and the download reference")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress one image and save the download",
        long_about = "Validate, preview and compress one image, then write the result. \
                      The output defaults to compressed_<name> next to the input."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(short = 'o', long, help = "Where to save the compressed image")]
        output: Option<PathBuf>,

        #[arg(
            short = 'q',
            long,
            help = "Compression quality (1-100, default: 80)",
            long_help = "Initial quality from 1 (lowest) to 100 (highest). The codec may lower it \
                         further while searching for the target size."
        )]
        quality: Option<u8>,

        #[arg(
            short = 'w',
            long = "max-dimension",
            help = "Maximum width or height in pixels (default: 1920)",
            long_help = "The longest side of the result is limited to this many pixels. \
                         Aspect ratio is preserved and smaller images are not enlarged."
        )]
        max_dimension: Option<u32>,

        #[arg(
            short = 't',
            long,
            help = "Target size in MB (default: 0.5)",
            long_help = "Soft ceiling for the compressed size in megabytes."
        )]
        target_size: Option<f64>,

        #[arg(long, help = "Encode on the calling thread instead of a worker")]
        no_worker: bool,
    },

    #[command(
        about = "Validate an image and show its preview information",
        long_about = "Run intake and preview only: type and size checks, original size and dimensions."
    )]
    Check {
        #[arg(help = "Image file path to check")]
        input: PathBuf,
    },
}
