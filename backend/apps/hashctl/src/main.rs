//! hashctl Entry Point
//!
//! Command line front end for the `authn` hashing core.
//! Uses `anyhow` for I/O and startup errors; hashing failures keep their
//! `authn::ErrorKind` in the log.
//!
//! Passwords are always read from stdin so they never show up in the
//! process list or shell history.
//!
//! Exit codes: `0` success or match, `1` mismatch, `2` error.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::Context;
use authn::{ClearTextPassword, PasswordHashError, PasswordHasher};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "hashctl", version, about = "Hash and verify passwords")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hash the password read from stdin with the configured parameters
    Hash {
        #[arg(long, short, env = "HASHCTL_ALGORITHM", default_value = "argon2id")]
        algorithm: String,
    },
    /// Verify the password read from stdin against an encoded hash
    Verify {
        #[arg(long = "hash")]
        encoded: String,
    },
    /// Print the decoded parameters of an encoded hash as JSON
    Inspect { encoded: String },
    /// Check whether an encoded hash is out of date for an algorithm
    NeedsRehash {
        #[arg(long, short, env = "HASHCTL_ALGORITHM", default_value = "argon2id")]
        algorithm: String,
        #[arg(long = "hash")]
        encoded: String,
    },
    /// List the registered algorithms
    Algorithms,
}

fn main() -> ExitCode {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout carries command output only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hashctl=info,authn=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<PasswordHashError>() {
                Some(hash_error) => {
                    tracing::error!(kind = %hash_error.kind(), error = %e, "Command failed")
                }
                None => tracing::error!(error = %e, "Command failed"),
            }
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Command) -> anyhow::Result<ExitCode> {
    let hasher = PasswordHasher::from_env();
    let mut stdout = io::stdout().lock();

    match command {
        Command::Hash { algorithm } => {
            let password = read_password(io::stdin().lock())?;
            let encoded = hasher.hash(&algorithm, &password)?;
            tracing::info!(algorithm = encoded.algorithm(), "Password hashed");
            writeln!(stdout, "{encoded}")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { encoded } => {
            let password = read_password(io::stdin().lock())?;
            if hasher.verify(&password, &encoded)? {
                writeln!(stdout, "match")?;
                Ok(ExitCode::SUCCESS)
            } else {
                writeln!(stdout, "mismatch")?;
                Ok(ExitCode::from(1))
            }
        }
        Command::Inspect { encoded } => {
            let decoded = hasher.decode(&encoded)?;
            serde_json::to_writer_pretty(&mut stdout, &decoded.summary())?;
            writeln!(stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::NeedsRehash { algorithm, encoded } => {
            if hasher.needs_rehash(&algorithm, &encoded)? {
                writeln!(stdout, "rehash")?;
                Ok(ExitCode::from(1))
            } else {
                writeln!(stdout, "current")?;
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Algorithms => {
            for name in hasher.registry().algorithms() {
                writeln!(stdout, "{name}")?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Read the whole of `input` as the password, minus one trailing line ending
fn read_password(mut input: impl Read) -> anyhow::Result<ClearTextPassword> {
    let mut raw = Vec::new();
    input
        .read_to_end(&mut raw)
        .context("failed to read password from stdin")?;

    let len = strip_line_ending(&raw).len();
    raw.truncate(len);
    Ok(ClearTextPassword::from(raw))
}

fn strip_line_ending(raw: &[u8]) -> &[u8] {
    raw.strip_suffix(b"\r\n")
        .or_else(|| raw.strip_suffix(b"\n"))
        .unwrap_or(raw)
}
