//! Guard CLI — operational tooling for sealing and opening tokens
//!
//! Usage:
//!   guard keygen [--length N]
//!   guard random [--length N]
//!   guard seal --passphrase <p> [--cipher C] [--input F] [--output F]
//!   guard open --passphrase <p> [--cipher C] [--input F] [--output F]
//!   guard inspect <file>

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use guard_envelope::{wire, Guard, GuardConfig, DEFAULT_GENERATED_KEY_BYTES};
use tracing_subscriber::EnvFilter;

/// Upper bound for `--length` on keygen and random.
const MAX_LENGTH_BYTES: u64 = 1 << 20;

fn length_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..=MAX_LENGTH_BYTES)
}

#[derive(Parser)]
#[command(name = "guard", version, about = "Authenticated symmetric encryption envelopes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a freshly generated key (hex)
    Keygen {
        #[arg(long, default_value_t = DEFAULT_GENERATED_KEY_BYTES, value_parser = length_parser())]
        length: usize,
    },
    /// Print a random hex string of LENGTH random bytes
    Random {
        #[arg(long, default_value_t = 16, value_parser = length_parser())]
        length: usize,
    },
    /// Encrypt a file (or stdin) into a token
    Seal(CryptoArgs),
    /// Decrypt a token file (or stdin)
    Open(CryptoArgs),
    /// Show token structure without verifying or decrypting
    Inspect {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct CryptoArgs {
    /// Passphrase the key is derived from
    #[arg(long, env = "GUARD_PASSPHRASE", hide_env_values = true)]
    passphrase: String,

    /// Cipher name; defaults to GUARD_CIPHER or AES-256-CBC
    #[arg(long)]
    cipher: Option<String>,

    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen { length } => {
            let key = guard_envelope::generate_key(length).context("random source failed")?;
            println!("{}", hex::encode(key));
        }
        Commands::Random { length } => {
            println!("{}", guard_envelope::random_string(length).context("random source failed")?);
        }
        Commands::Seal(args) => {
            let guard = build_guard(&args)?;
            let plaintext = read_input(args.input.as_ref())?;
            let token = guard.encrypt(&plaintext).context("seal failed")?;
            write_output(args.output.as_ref(), token.as_str().as_bytes())?;
        }
        Commands::Open(args) => {
            let guard = build_guard(&args)?;
            let input = read_input(args.input.as_ref())?;
            let token = String::from_utf8(input).context("token is not UTF-8")?;
            let plaintext = guard.decrypt(token.trim()).context("open failed")?;
            write_output(args.output.as_ref(), &plaintext)?;
        }
        Commands::Inspect { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let env = wire::parse(raw.trim()).context("not a guard token")?;
            eprintln!("Token: {}", path.display());
            eprintln!("  iv:         {} bytes", env.iv.len());
            eprintln!("  ciphertext: {} bytes", env.ciphertext.len());
            eprintln!("  mac:        {} bytes", env.mac.len());
        }
    }

    Ok(())
}

fn build_guard(args: &CryptoArgs) -> Result<Guard> {
    let mut config = GuardConfig::from_env().context("invalid environment configuration")?;
    if let Some(cipher) = &args.cipher {
        config.cipher = cipher.clone();
    }

    let mut guard = Guard::from_config(&config);
    guard.set_key(&args.passphrase).context("invalid passphrase")?;
    Ok(guard)
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, bytes).with_context(|| format!("writing {}", path.display())),
        None => {
            io::stdout().write_all(bytes)?;
            Ok(())
        }
    }
}
