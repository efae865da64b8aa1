//! Offline verifier for revealed seed pairs
//!
//! Recomputes digests, floats, integers and shuffles from a revealed server
//! seed so a player can check historical outcomes without trusting the
//! operator. Output is JSON on stdout.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fairness_core_rs::rng::{self, verify_commitment};
use fairness_core_rs::{FairnessCheck, SeedTuple};
use serde_json::json;
use std::process::exit;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status when a recomputed value does not match the published one
const EXIT_MISMATCH: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "fairness-cli", version, about = "Verify provably fair game outcomes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct TupleArgs {
    /// Revealed server seed
    #[arg(long)]
    server_seed: String,

    #[arg(long)]
    client_seed: String,

    #[arg(long)]
    nonce: u64,
}

impl TupleArgs {
    fn tuple(&self) -> SeedTuple {
        SeedTuple::new(&self.server_seed, &self.client_seed, self.nonce)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// HMAC-SHA256 digest of one block
    Digest {
        #[command(flatten)]
        tuple: TupleArgs,

        #[arg(long, default_value_t = 0)]
        cursor: u64,

        /// Published digest to compare against
        #[arg(long)]
        expect: Option<String>,
    },

    /// Floats in [0, 1)
    Floats {
        #[command(flatten)]
        tuple: TupleArgs,

        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Integers in [min, max]
    Ints {
        #[command(flatten)]
        tuple: TupleArgs,

        #[arg(long, default_value_t = 1)]
        count: usize,

        #[arg(long, allow_hyphen_values = true)]
        min: i64,

        #[arg(long, allow_hyphen_values = true)]
        max: i64,
    },

    /// Shuffle of 0..size
    Shuffle {
        #[command(flatten)]
        tuple: TupleArgs,

        #[arg(long)]
        size: usize,
    },

    /// Check a server seed against its published SHA-256
    Commitment {
        #[arg(long)]
        server_seed: String,

        #[arg(long)]
        hash: String,
    },
}

fn main() {
    setup_logging();

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Running");

    match run(cli.command) {
        Ok(check) => {
            if !check.is_verified() {
                exit(EXIT_MISMATCH);
            }
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            exit(1);
        }
    }
}

fn run(command: Command) -> Result<FairnessCheck> {
    let (output, check) = match command {
        Command::Digest {
            tuple,
            cursor,
            expect,
        } => {
            let digest = rng::verify(&tuple.server_seed, &tuple.client_seed, tuple.nonce, cursor)
                .context("computing digest")?;
            let check = expect
                .map(|expected| FairnessCheck::compare(&expected, digest.clone()))
                .unwrap_or(FairnessCheck::Verified);
            (json!({ "digest": digest, "check": check }), check)
        }
        Command::Floats { tuple, count } => {
            let values = rng::floats(&tuple.tuple(), count).context("computing floats")?;
            (json!({ "floats": values }), FairnessCheck::Verified)
        }
        Command::Ints {
            tuple,
            count,
            min,
            max,
        } => {
            let values = rng::ints(&tuple.tuple(), count, min, max).context("computing integers")?;
            (json!({ "ints": values }), FairnessCheck::Verified)
        }
        Command::Shuffle { tuple, size } => {
            let order = rng::shuffle((0..size).collect::<Vec<usize>>(), &tuple.tuple())
                .context("computing shuffle")?;
            (json!({ "shuffle": order }), FairnessCheck::Verified)
        }
        Command::Commitment { server_seed, hash } => {
            let check = verify_commitment(&server_seed, &hash);
            (
                json!({ "server_seed_hash": rng::server_seed_hash(&server_seed), "check": check }),
                check,
            )
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(check)
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
