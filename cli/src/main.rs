//! cmif cli sample app

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use cmif::{Decoder, Encoder, PixelBuffer, Preprocess, RgbBuffer};
use log::{LevelFilter, Log, Metadata, Record};
use std::path::{Path, PathBuf};

/// Converts between CMIF and ordinary image files.
///
/// The direction follows the file extensions: `.cmif` in, image out, or the other way round.
#[derive(Parser, Debug)]
#[command(name = "cli", version)]
struct Cli {
    /// Input file (.cmif, or any format the image crate reads)
    input: PathBuf,

    /// Output file. Defaults to the input with a .png or .cmif extension
    output: Option<PathBuf>,

    /// Convert to grayscale before encoding
    #[arg(long)]
    grayscale: bool,

    /// Dither to LEVELS values per channel before encoding (2..=256)
    #[arg(long, value_name = "LEVELS")]
    dither: Option<u16>,

    /// Only print the header of a .cmif input
    #[arg(long)]
    info: bool,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

enum Format {
    Cmif,
    Image(image::ImageFormat),
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .ok_or_else(|| anyhow!("unknown file extension: {}", path.display()))?;
        if ext == cmif::PREFERRED_FILE_EXT {
            return Ok(Format::Cmif);
        }
        image::ImageFormat::from_extension(ext)
            .map(Format::Image)
            .ok_or_else(|| anyhow!("unknown file extension: {}", path.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let input_format = Format::from_path(&cli.input)?;
    let read_data =
        std::fs::read(&cli.input).with_context(|| format!("cannot read {}", cli.input.display()))?;

    if cli.info {
        if !matches!(input_format, Format::Cmif) {
            bail!("--info needs a .{} input", cmif::PREFERRED_FILE_EXT);
        }
        let decoder = Decoder::from_padded(&read_data).context("cannot decode input file")?;
        let info = decoder.info();
        let index_bits = decoder.index_bits();
        let image = decoder.decode().context("cannot decode input file")?;
        println!("size:        {}x{}", info.width, info.height);
        println!("background:  #{:06x}", info.background.to_u32());
        println!("index bits:  {}", index_bits);
        println!("groups:      {}", image.groups().len());
        println!("entries:     {}", image.spans().count());
        return Ok(());
    }

    let output = cli.output.clone().unwrap_or_else(|| match input_format {
        Format::Cmif => cli.input.with_extension("png"),
        _ => cli.input.with_extension(cmif::PREFERRED_FILE_EXT),
    });
    let output_format = Format::from_path(&output)?;

    let mut buffer = match input_format {
        Format::Image(format) => {
            let rgb = image::load_from_memory_with_format(&read_data, format)
                .context("cannot decode input file")?
                .to_rgb8();
            RgbBuffer::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
                .context("unexpected image layout")?
        }
        Format::Cmif => Decoder::from_padded(&read_data)
            .and_then(|decoder| decoder.decode())
            .and_then(|image| image.to_rgb_buffer())
            .context("cannot decode input file")?,
    };

    let preprocess = Preprocess {
        grayscale: cli.grayscale,
        dither: cli.dither,
    };
    preprocess
        .apply(&mut buffer)
        .with_context(|| format!("cannot preprocess (dither levels: {:?})", cli.dither))?;

    match output_format {
        Format::Image(format) => {
            let rgb = image::RgbImage::from_raw(buffer.width(), buffer.height(), buffer.as_raw_rgb())
                .context("unexpected image layout")?;
            rgb.save_with_format(&output, format)
                .with_context(|| format!("cannot write {}", output.display()))?;
        }
        Format::Cmif => {
            let image = cmif::convert(&buffer).context("cannot convert image")?;
            let encoded = Encoder::encode(&image).context("cannot encode image")?;
            log::info!(
                "{} groups, {} bits ({} padding)",
                image.groups().len(),
                encoded.bit_len(),
                encoded.padding_bits()
            );
            std::fs::write(&output, encoded.into_bytes())
                .with_context(|| format!("cannot write {}", output.display()))?;
        }
    }

    eprintln!("wrote {}", output.display());
    Ok(())
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logger(verbose: u8) {
    static LOGGER: StderrLogger = StderrLogger;
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
