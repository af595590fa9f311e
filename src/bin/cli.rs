use anyhow::Context;
use clap::{Parser, Subcommand};
use imgutil::{Image, scale_jpeg_file};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgutil", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the mean HSV brightness of an image (0.0 - 1.0)
    Brightness { input: PathBuf },
    /// Burn a text label into an image
    Text {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, env = "IMGUTIL_TEXT")]
        text: String,
    },
    /// Resize a JPEG file to exactly WIDTH x HEIGHT
    Scale {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, env = "IMGUTIL_WIDTH")]
        width: u32,
        #[arg(long, env = "IMGUTIL_HEIGHT")]
        height: u32,
    },
    /// Write the blue color-range mask of an image as PNG
    Mask { input: PathBuf, output: PathBuf },
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Brightness { input } => {
            let image = Image::from_path(&input)?;
            let brightness = image
                .mean_brightness()
                .with_context(|| format!("measuring {}", input.display()))?;
            println!("{brightness:.4}");
        }

        Commands::Text {
            input,
            output,
            text,
        } => {
            let mut image = Image::from_path(&input)?;
            image.put_text(&text);
            image
                .save(&output)
                .with_context(|| format!("saving {}", output.display()))?;
        }

        Commands::Scale {
            input,
            output,
            width,
            height,
        } => {
            scale_jpeg_file(&input, &output, width, height)
                .with_context(|| format!("scaling {} to {width}x{height}", input.display()))?;
        }

        Commands::Mask { input, output } => {
            let image = Image::from_path(&input)?;
            image
                .write_blue_mask(&output)
                .with_context(|| format!("writing mask {}", output.display()))?;
        }
    }

    Ok(())
}
