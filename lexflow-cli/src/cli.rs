//! Command-line surface of `lexflow-keys`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding the registry password.
pub const REGISTRY_PASSWORD_ENV: &str = "LEXFLOW_REGISTRY_PASSWORD";

/// Environment variable holding the Base64 private key.
pub const PRIVATE_KEY_ENV: &str = "LEXFLOW_PRIVATE_KEY";

/// Directory under the platform data dir used when `--registry-dir` is absent.
pub const DEFAULT_DATA_SUBDIR: &str = "lexflow";

#[derive(Parser, Debug)]
#[command(name = "lexflow-keys", version)]
#[command(about = "Issue, verify and track LexFlow license tokens")]
pub struct Cli {
    /// Directory holding the encrypted registry and its salt
    #[arg(long, global = true, env = "LEXFLOW_REGISTRY_DIR")]
    pub registry_dir: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new Ed25519 key pair
    Keygen,

    /// Issue a license and record it in the registry
    Generate(GenerateArgs),

    /// List every issued license
    List,

    /// Verify a token and look it up in the registry
    Verify(VerifyArgs),

    /// Mark a license as revoked
    Revoke {
        /// License id
        id: String,
    },

    /// Mark a license as activated
    Activate {
        /// License id
        id: String,
    },

    /// Export the registry as CSV
    Export {
        /// Output file (defaults to the registry directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show registry statistics
    Stats,
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Client name (prompted if absent)
    #[arg(long)]
    pub client: Option<String>,

    /// License id (generated if absent or empty)
    #[arg(long)]
    pub id: Option<String>,

    /// Expiry date as YYYY-MM-DD, UTC (one year from now if absent or empty)
    #[arg(long)]
    pub expires: Option<String>,

    /// File containing the Base64 private key
    #[arg(long)]
    pub private_key_file: Option<PathBuf>,

    /// Issue even if the id is already in the registry
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// The LXFW token
    pub token: String,

    /// Base64 public key; without it the claims are shown unverified
    #[arg(long, env = "LEXFLOW_PUBLIC_KEY")]
    pub public_key: Option<String>,
}

impl Cli {
    /// The registry directory: `--registry-dir`, or the platform data dir
    /// joined with [`DEFAULT_DATA_SUBDIR`].
    pub fn registry_dir(&self) -> Result<PathBuf> {
        match &self.registry_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(DEFAULT_DATA_SUBDIR))
                .context("no platform data directory; pass --registry-dir"),
        }
    }
}
