use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use zxpack::codec::bitbuster::{BitBuster, BitBusterOptions};
use zxpack::codec::dan1::{Dan1, Dan1Options};
use zxpack::codec::dan3::{Dan3, Dan3Options};
use zxpack::codec::lzf::Lzf;
use zxpack::codec::mdkrle::MdkRle;
use zxpack::codec::pletter::{Pletter, PletterOptions};
use zxpack::codec::zx0::{Zx0, Zx0Options};
use zxpack::codec::zx7::Zx7;
use zxpack::{compare_all, verify_roundtrip, Codec, CodecKind};

/// Codec argument for the CLI (maps to CodecKind)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CodecArg {
    /// Detect from the file extension
    Auto,
    Mdkrle,
    Lzf,
    Pletter,
    Dan1,
    Dan3,
    Zx7,
    Zx0,
    Bitbuster,
}

impl CodecArg {
    fn to_kind(self) -> Option<CodecKind> {
        match self {
            Self::Auto => None,
            Self::Mdkrle => Some(CodecKind::MdkRle),
            Self::Lzf => Some(CodecKind::Lzf),
            Self::Pletter => Some(CodecKind::Pletter),
            Self::Dan1 => Some(CodecKind::Dan1),
            Self::Dan3 => Some(CodecKind::Dan3),
            Self::Zx7 => Some(CodecKind::Zx7),
            Self::Zx0 => Some(CodecKind::Zx0),
            Self::Bitbuster => Some(CodecKind::BitBuster),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "zxpack")]
#[command(about = "Compress and decompress 8-bit-era formats bit-exactly")]
#[command(version)]
struct Args {
    /// Input file
    input: PathBuf,

    /// Output file (default: input plus/minus the codec extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Decompress instead of compressing
    #[arg(short, long)]
    decompress: bool,

    /// Codec to use
    #[arg(short, long, value_enum, default_value = "auto")]
    codec: CodecArg,

    /// DAN1: allow RAW literal blocks in the parse
    #[arg(long)]
    rle: bool,

    /// ZX0: disable new-offset gamma inversion
    #[arg(long)]
    classic: bool,

    /// ZX0: compress for back-to-front decompression
    #[arg(long)]
    backwards: bool,

    /// ZX0: cap the offset window at the ZX7 value
    #[arg(long)]
    quick: bool,

    /// ZX0: bytes of an already-in-place prefix
    #[arg(long, default_value = "0")]
    skip: usize,

    /// Pletter: headerless dsk2rom stream (q = 2)
    #[arg(long)]
    dsk2rom: bool,

    /// Compress with every codec and print a size table
    #[arg(long)]
    compare: bool,

    /// Decompress the result again and require byte equality
    #[arg(long)]
    verify: bool,

    /// Show per-codec diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn build_codec(kind: CodecKind, args: &Args) -> Box<dyn Codec> {
    match kind {
        CodecKind::MdkRle => Box::new(MdkRle),
        CodecKind::Lzf => Box::new(Lzf),
        CodecKind::Pletter => Box::new(Pletter {
            options: PletterOptions { dsk2rom: args.dsk2rom },
        }),
        CodecKind::Dan1 => Box::new(Dan1 {
            options: Dan1Options { rle: args.rle, verbose: args.verbose, ..Dan1Options::default() },
        }),
        CodecKind::Dan3 => Box::new(Dan3 {
            options: Dan3Options { verbose: args.verbose, ..Dan3Options::default() },
        }),
        CodecKind::Zx7 => Box::new(Zx7),
        CodecKind::Zx0 => Box::new(Zx0 {
            options: Zx0Options {
                classic: args.classic,
                backwards: args.backwards,
                quick: args.quick,
                skip: args.skip,
            },
        }),
        CodecKind::BitBuster => Box::new(BitBuster { options: BitBusterOptions::default() }),
    }
}

/// Resolve the codec from the argument or the relevant file extension.
fn resolve_kind(args: &Args) -> Option<CodecKind> {
    if let Some(kind) = args.codec.to_kind() {
        return Some(kind);
    }
    let path = if args.decompress { &args.input } else { args.output.as_ref()? };
    CodecKind::from_extension(path.extension()?.to_str()?)
}

fn default_output(args: &Args, kind: CodecKind) -> PathBuf {
    if args.decompress {
        let mut path = args.input.clone();
        if path.extension().is_some() {
            path.set_extension("");
        } else {
            path.set_extension("out");
        }
        path
    } else {
        let mut name = args.input.as_os_str().to_owned();
        name.push(".");
        name.push(kind.extension());
        PathBuf::from(name)
    }
}

fn run(args: &Args) -> zxpack::Result<u8> {
    let data = fs::read(&args.input)?;

    if args.compare {
        let results = compare_all(&data, &CodecKind::ALL);
        if !args.quiet {
            println!("{} bytes input", data.len());
            for comparison in results {
                match comparison.result {
                    Ok(size) => println!(
                        "{:<10} {:>8} bytes  {:>6.2}%",
                        comparison.kind.name(),
                        size,
                        size as f64 * 100.0 / data.len().max(1) as f64
                    ),
                    Err(err) => println!("{:<10} {}", comparison.kind.name(), err),
                }
            }
        }
        return Ok(EXIT_OK);
    }

    let Some(kind) = resolve_kind(args) else {
        eprintln!("cannot infer codec; pass --codec");
        return Ok(EXIT_ERROR);
    };
    let codec = build_codec(kind, args);

    let output = if args.decompress {
        codec.decompress(&data)?
    } else if args.verify {
        verify_roundtrip(codec.as_ref(), &data)?
    } else {
        codec.compress(&data)?
    };

    let path = args.output.clone().unwrap_or_else(|| default_output(args, kind));
    fs::write(&path, &output)?;
    if !args.quiet {
        println!(
            "{}: {} -> {} bytes ({})",
            kind.name(),
            data.len(),
            output.len(),
            path.display()
        );
    }
    Ok(EXIT_OK)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.quiet {
        LevelFilter::Error
    } else if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).ok();

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(zxpack::Error::RoundTripMismatch) => {
            eprintln!("error: {}", zxpack::Error::RoundTripMismatch);
            ExitCode::from(EXIT_FAILED)
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
