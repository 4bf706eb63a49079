use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qrok::{ECLevel, MaskPattern, QRBuilder, QROutput, Size, Version};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EcArg {
    L,
    M,
    Q,
    H,
}

impl From<EcArg> for ECLevel {
    fn from(ecl: EcArg) -> Self {
        match ecl {
            EcArg::L => ECLevel::L,
            EcArg::M => ECLevel::M,
            EcArg::Q => ECLevel::Q,
            EcArg::H => ECLevel::H,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SizeArg {
    Original,
    Xs,
    S,
    M,
    L,
    Xl,
}

impl From<SizeArg> for Size {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Original => Size::Original,
            SizeArg::Xs => Size::XS,
            SizeArg::S => Size::S,
            SizeArg::M => Size::M,
            SizeArg::L => Size::L,
            SizeArg::Xl => Size::XL,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate QR codes", long_about = None)]
struct Args {
    /// Text to encode
    text: String,

    #[arg(short, long, value_enum, default_value_t = EcArg::M, help = "Error correction level")]
    ec_level: EcArg,

    #[arg(short, long, default_value_t = qrok::builder::DEFAULT_OUTLINE_WIDTH)]
    outline: usize,

    #[arg(short, long, value_enum, default_value_t = SizeArg::M, help = "Nominal image size")]
    size: SizeArg,

    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..8))]
    mask: Option<u8>,

    #[arg(long = "symbol-version", value_parser = clap::value_parser!(u8).range(1..=40))]
    symbol_version: Option<u8>,

    /// Write a PNG file instead of printing the symbol
    #[arg(long, conflicts_with = "base64")]
    out: Option<PathBuf>,

    /// Print the PNG as base64 instead of printing the symbol
    #[arg(long)]
    base64: bool,
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut builder = QRBuilder::from_text(&args.text);
    builder.ec_level(args.ec_level.into()).outline_width(args.outline).size(args.size.into());
    if let Some(v) = args.symbol_version {
        builder.version(Version::new(v as usize)?);
    }
    if let Some(m) = args.mask {
        builder.mask(MaskPattern::try_new(m)?);
    }
    debug!(config = %builder.metadata(), "Parsed arguments");

    if let Some(out) = &args.out {
        let name = out.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let dir = match out.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if let QROutput::File(path) = builder.output_path(dir).to_file(&name)? {
            println!("{}", path.display());
        }
    } else if args.base64 {
        if let QROutput::Base64(s) = builder.to_base64()? {
            println!("{s}");
        }
    } else {
        let qr = builder.build()?;
        println!("{}", qr.to_str(1));
    }
    Ok(())
}

fn main() -> ExitCode {
    setup_logging();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
