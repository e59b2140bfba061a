//! fwimg command-line tool

use clap::{Parser, Subcommand};
use fwimg::exceptions::FwImgError;
use fwimg::exit_codes::*;
use fwimg::img::{decode, encode, encode::EncodeOptions};
use fwimg::{api, logger::JsonLogger, version};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::{env, panic, process};

const VERSION: &str = version::VERSION;

#[derive(Parser, Debug)]
#[command(name = "fwimg", version = VERSION, about = "Authenticate, decode, and checksum firmware images")]
struct Args {
    /// Log level (trace, debug, info, warn, error, or json:<level>)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Authenticate an obfuscated image and decode it
    Decode {
        /// Source image file
        #[arg(short, long)]
        source: PathBuf,

        /// Destination file, or - for stdout
        #[arg(short, long)]
        dest: String,
    },

    /// Produce an obfuscated image with fresh key material
    Encode {
        /// Source content file (length must be a multiple of 16)
        #[arg(short, long)]
        source: PathBuf,

        /// Destination file, or - for stdout
        #[arg(short, long)]
        dest: String,

        /// Seed for deterministic key derivation
        #[arg(long, conflicts_with = "key_hex")]
        key_seed: Option<String>,

        /// Explicit 16-byte key block, hex encoded
        #[arg(long)]
        key_hex: Option<String>,
    },

    /// Verify the appended checksum of a system image
    Verify {
        /// Image file carrying a 4-byte checksum trailer
        #[arg(short, long)]
        source: PathBuf,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Recompute and write the appended checksum in place
    Update {
        /// Image file to update (opened read+write)
        #[arg(short, long)]
        source: PathBuf,
    },
}

fn main() {
    // Set up panic handler to return specific exit code
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        process::exit(EXIT_PANIC);
    }));

    // Wrap main logic in catch_unwind for extra safety
    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: Unhandled panic");
            process::exit(EXIT_PANIC);
        }
    }
}

fn run() -> i32 {
    // Handle --version before clap for the full build string
    if env::args().nth(1).as_deref() == Some("--version") {
        println!("fwimg {}", version::full_version());
        return EXIT_SUCCESS;
    }

    let args = Args::parse();

    // Initialize logging with level if provided
    if let Some(ref level) = args.log_level {
        JsonLogger::init_with_level(level, "CLI --log-level");
    } else {
        JsonLogger::init();
    }

    match args.command {
        Command::Decode { source, dest } => run_decode(&source, &dest),
        Command::Encode {
            source,
            dest,
            key_seed,
            key_hex,
        } => run_encode(&source, &dest, key_seed, key_hex),
        Command::Verify { source, json } => run_verify(&source, json),
        Command::Update { source } => run_update(&source),
    }
}

fn exit_code_for(err: &FwImgError) -> i32 {
    match err {
        FwImgError::FormatError(_) => EXIT_FORMAT_ERROR,
        FwImgError::AuthenticationError(_) => EXIT_AUTH_ERROR,
        FwImgError::MemError(_) => EXIT_MEM_ERROR,
        FwImgError::IoError(_) => EXIT_IO_ERROR,
        FwImgError::Generic(_) => EXIT_ERROR,
    }
}

fn open_source(source: &Path) -> Option<io::BufReader<File>> {
    match File::open(source) {
        Ok(file) => Some(io::BufReader::new(file)),
        Err(e) => {
            eprintln!("Error: unable to open source file {source:?}: {e}");
            None
        }
    }
}

fn run_decode(source: &Path, dest: &str) -> i32 {
    let result = if dest == "-" {
        let Some(mut src) = open_source(source) else {
            return EXIT_IO_ERROR;
        };
        let stdout = io::stdout();
        let mut out = stdout.lock();
        decode::decode_stream(&mut src, &mut out).and_then(|report| {
            out.flush()?;
            Ok(report)
        })
    } else {
        api::decode_image(source, Path::new(dest))
    };

    match result {
        Ok(report) => {
            eprintln!("✓ Image authenticated, {} bytes decoded", report.content_size);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Decode error: {e}");
            exit_code_for(&e)
        }
    }
}

fn run_encode(source: &Path, dest: &str, key_seed: Option<String>, key_hex: Option<String>) -> i32 {
    let key_block = match key_hex {
        Some(ref h) => {
            let parsed = hex::decode(h)
                .ok()
                .and_then(|bytes| <[u8; 16]>::try_from(bytes).ok());
            match parsed {
                Some(key) => Some(key),
                None => {
                    eprintln!("Error: --key-hex must be exactly 32 hex characters");
                    return EXIT_INVALID_ARGS;
                }
            }
        }
        None => None,
    };
    let options = EncodeOptions {
        key_block,
        key_seed,
    };

    let result = if dest == "-" {
        let Some(mut src) = open_source(source) else {
            return EXIT_IO_ERROR;
        };
        let stdout = io::stdout();
        let mut out = stdout.lock();
        encode::encode_stream(&mut src, &mut out, &options).and_then(|key| {
            out.flush()?;
            Ok(key)
        })
    } else {
        api::encode_image(source, Path::new(dest), &options)
    };

    match result {
        Ok(key) => {
            eprintln!("✓ Image encoded with key {}", hex::encode(key));
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Encode error: {e}");
            exit_code_for(&e)
        }
    }
}

fn run_verify(source: &Path, json: bool) -> i32 {
    match api::verify_image_checksum(source) {
        Ok(report) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).unwrap_or_default()
                );
            }
            if report.is_valid() {
                eprintln!("✓ Checksum matches");
                EXIT_SUCCESS
            } else {
                eprintln!(
                    "✗ Checksum mismatch: stored {:08X}, computed {:08X}",
                    report.stored, report.computed
                );
                EXIT_CHECKSUM_MISMATCH
            }
        }
        Err(e) => {
            eprintln!("Verify error: {e}");
            exit_code_for(&e)
        }
    }
}

fn run_update(source: &Path) -> i32 {
    match api::update_image_checksum(source) {
        Ok(checksum) => {
            eprintln!("✓ Checksum updated to {checksum:08X}");
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Update error: {e}");
            exit_code_for(&e)
        }
    }
}
