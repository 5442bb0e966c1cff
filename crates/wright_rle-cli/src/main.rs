//! rle - Pack sprites into run-length containers and back
//!
//! A command-line tool for converting PNG artwork into the compact bitmaps
//! the watch-face firmware loads, and for inspecting or unpacking them.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{info, Level};
use std::fs;
use std::path::{Path, PathBuf};
use wright_rle::{
    decode, encode_with_options, split_transparency, ContainerHeader, EncodeOptions, RasterImage,
    Variant,
};

#[derive(Parser)]
#[command(name = "rle")]
#[command(version)]
#[command(about = "Pack sprites into run-length containers and back", long_about = None)]
struct Cli {
    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Mono,
    Color,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Mono => Variant::Monochrome,
            VariantArg::Color => Variant::Color,
        }
    }
}

#[derive(clap::Args)]
struct EncodeArgs {
    /// Container variant (default: `color` for files tagged ~color, else `mono`)
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Never try the checkerboard-unscreened stream
    #[arg(long)]
    no_unscreen: bool,

    /// Fixed RLE chunk width (1, 2, 4 or 8) instead of the smallest
    #[arg(long)]
    chunk_width: Option<u8>,
}

impl EncodeArgs {
    fn options(&self) -> EncodeOptions {
        EncodeOptions {
            allow_unscreen: !self.no_unscreen,
            chunk_width: self.chunk_width,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a PNG sprite into an .rle container
    Encode {
        /// Input image file (PNG)
        input: PathBuf,

        /// Output file (default: input with .rle extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        args: EncodeArgs,
    },

    /// Split a transparent PNG into _white.rle and _black.rle masks
    Trans {
        /// Input image file (PNG)
        input: PathBuf,

        #[command(flatten)]
        args: EncodeArgs,
    },

    /// Decode an .rle container to PNG
    Decode {
        /// Input .rle file
        input: PathBuf,

        /// Output PNG file (default: <input>_unpacked.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the header of an .rle container
    Inspect {
        /// Input .rle file
        input: PathBuf,
    },
}

fn init_logger(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::Error,
        (false, 0) => Level::Warn,
        (false, 1) => Level::Info,
        (false, 2) => Level::Debug,
        (false, _) => Level::Trace,
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("Failed to initialize logger: {e}");
    }
}

fn load_raster(input: &Path) -> Result<RasterImage, Box<dyn std::error::Error>> {
    let img = image::open(input)
        .map_err(|e| format!("Failed to open '{}': {}", input.display(), e))?;
    let rgba_img = img.to_rgba8();
    let (width, height) = rgba_img.dimensions();
    Ok(RasterImage::from_rgba(
        rgba_img.into_raw(),
        width as usize,
        height as usize,
    )?)
}

fn with_suffix(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.{extension}"))
}

fn write_sprite(
    image: &RasterImage,
    variant: Variant,
    opts: &EncodeOptions,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let sprite = encode_with_options(image, variant, opts)?;
    fs::write(output, &sprite.data)?;
    println!(
        "{}: {} vs. {}",
        output.display(),
        sprite.data.len(),
        sprite.raw_size()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Encode {
            input,
            output,
            args,
        } => {
            let image = load_raster(&input)?;
            let variant = args.variant.map(Variant::from).unwrap_or_else(|| {
                Variant::from_file_name(&input.file_name().unwrap_or_default().to_string_lossy())
            });
            info!(
                "Encoding '{}' ({}x{}) as {:?}",
                input.display(),
                image.width,
                image.height,
                variant
            );

            let output = output.unwrap_or_else(|| input.with_extension("rle"));
            write_sprite(&image, variant, &args.options(), &output)?;
        }

        Commands::Trans { input, args } => {
            let image = load_raster(&input)?;
            let masks = split_transparency(&image);
            let variant = args.variant.map(Variant::from).unwrap_or(Variant::Monochrome);
            let opts = args.options();

            write_sprite(&masks.white, variant, &opts, &with_suffix(&input, "_white", "rle"))?;
            write_sprite(&masks.black, variant, &opts, &with_suffix(&input, "_black", "rle"))?;
        }

        Commands::Decode { input, output } => {
            let data = fs::read(&input)
                .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;
            info!("Decoding ({} bytes)", data.len());

            let decoded = decode(&data)?;
            let output_path = output.unwrap_or_else(|| with_suffix(&input, "_unpacked", "png"));

            let img = image::RgbaImage::from_raw(
                decoded.width as u32,
                decoded.height as u32,
                decoded.pixels,
            )
            .ok_or("Failed to create image from decoded data")?;
            img.save(&output_path)?;

            println!(
                "Decoded: {}x{} pixels -> '{}'",
                decoded.width,
                decoded.height,
                output_path.display()
            );
        }

        Commands::Inspect { input } => {
            let data = fs::read(&input)
                .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;
            let header = ContainerHeader::parse(&data)?;

            println!("{}", input.display());
            println!(
                "  size:     {}x{} (padded {})",
                header.width,
                header.height,
                header.padded_width()
            );
            println!("  format:   {} ({})", header.format, header.format.code());
            println!("  chunk:    {}", header.chunk_spec);
            println!("  rle:      {} bytes", header.rle_range().len());
            println!("  values:   {} bytes", header.values_range().len());
            println!("  palette:  {} colors", header.palette_range(data.len()).len());
            println!("  total:    {} bytes", data.len());
        }
    }

    Ok(())
}
