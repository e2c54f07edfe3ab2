//! LexFlow license issuing tool.
//!
//! Issues Ed25519-signed LXFW tokens and keeps an encrypted registry of
//! every token ever issued.
//!
//! Usage:
//!   lexflow-keys keygen
//!   lexflow-keys generate --client "Acme" --id A1 --expires 2099-01-01
//!   lexflow-keys verify <TOKEN>
//!
//! Logs go to stderr; tokens, tables and reports go to stdout.

use std::{
    env, fs,
    io::{self, Write},
    path::Path,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use lexflow_cli::{
    cli::{GenerateArgs, VerifyArgs, PRIVATE_KEY_ENV, REGISTRY_PASSWORD_ENV},
    prompt,
    render::{self, RegistryLookup, SignatureCheck, VerifyReport},
    Cli, Command,
};
use lexflow_license::{compute_burn_hash, inspect, now_ms, parse_public_key, verify, KeyPair};
use lexflow_registry::{
    parse_expiry_date, validate_client, IssueRequest, Ledger, RegistryError, RegistryResult,
    RegistryStore, DEFAULT_EXPORT_FILE_NAME, MIN_PASSWORD_LEN,
};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    match &cli.command {
        Command::Keygen => cmd_keygen(),
        Command::Generate(args) => cmd_generate(&cli, args),
        Command::List => cmd_list(&cli),
        Command::Verify(args) => cmd_verify(&cli, args),
        Command::Revoke { id } => cmd_revoke(&cli, id),
        Command::Activate { id } => cmd_activate(&cli, id),
        Command::Export { out } => cmd_export(&cli, out.as_deref()),
        Command::Stats => cmd_stats(&cli),
    }
}

fn cmd_keygen() -> Result<()> {
    let keys = KeyPair::generate();
    info!("generated new key pair");
    println!("{}", render::key_pair(&keys));
    Ok(())
}

fn cmd_generate(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let keys = load_private_key(args)?;
    eprintln!("{}", render::key_loaded(&keys));

    let client = match &args.client {
        Some(client) => client.clone(),
        None => prompt_until("Client name: ", |s| validate_client(s).map(str::to_string))?,
    };
    let id = match &args.id {
        Some(id) => id.clone(),
        None => prompt_line("License ID (empty = generated): ")?,
    };
    let expiry_ms = match &args.expires {
        Some(date) => Some(parse_expiry_date(date)?),
        None => prompt_until("Expiry YYYY-MM-DD (empty = 1 year): ", |s| {
            if s.is_empty() {
                Ok(None)
            } else {
                parse_expiry_date(s).map(Some)
            }
        })?,
    };

    let mut request = IssueRequest::new(client).allow_duplicate(args.yes);
    request.id = Some(id);
    request.expiry_ms = expiry_ms;

    let (store, password) = open_registry(cli)?;
    let mut ledger = Ledger::new(store.open(&password)?);

    let issued = match ledger.issue(&keys, request.clone()) {
        Err(RegistryError::DuplicateId(id)) => {
            eprintln!("WARNING: license id '{id}' is already in the registry.");
            if !confirm("Issue it anyway? [y/N]: ")? {
                eprintln!("Aborted, nothing issued.");
                return Ok(());
            }
            ledger.issue(&keys, request.allow_duplicate(true))?
        }
        other => other?,
    };

    store
        .save(&password, ledger.entries())
        .context("failed to save registry")?;
    println!("{}", render::issued(&issued, ledger.len()));
    Ok(())
}

fn cmd_list(cli: &Cli) -> Result<()> {
    let (store, password) = open_registry(cli)?;
    let ledger = Ledger::new(store.open(&password)?);
    let now = now_ms();
    println!(
        "{}",
        render::entry_table(ledger.entries(), &ledger.stats(now), now)
    );
    Ok(())
}

fn cmd_verify(cli: &Cli, args: &VerifyArgs) -> Result<()> {
    let token = args.token.as_str();

    let (payload, signature, expired) = match &args.public_key {
        Some(raw) => {
            let public_key = parse_public_key(raw).context("invalid public key")?;
            let verified = verify(&public_key, token).context("token rejected")?;
            (verified.payload, SignatureCheck::Valid, verified.expired)
        }
        None => {
            warn!("no public key given, showing claims without signature check");
            let payload = inspect(token).context("token rejected")?;
            let expired = payload.is_expired_at(now_ms());
            (payload, SignatureCheck::Unchecked, expired)
        }
    };

    let burn_hash = compute_burn_hash(token);
    let store = RegistryStore::new(cli.registry_dir()?);
    let ledger = if store.exists() {
        let password = registry_password(&store)?;
        Some(Ledger::new(store.open(&password)?))
    } else {
        None
    };

    let registry = match &ledger {
        None => RegistryLookup::NoRegistry,
        Some(ledger) => match ledger.find_by_token(token) {
            Some(entry) => RegistryLookup::Found(entry),
            None => {
                warn!("token not found in registry");
                RegistryLookup::Missing
            }
        },
    };

    println!(
        "{}",
        render::verification(&VerifyReport {
            payload: &payload,
            signature,
            expired,
            burn_hash: &burn_hash,
            registry,
        })
    );
    Ok(())
}

fn cmd_revoke(cli: &Cli, id: &str) -> Result<()> {
    let (store, password) = open_registry(cli)?;
    let mut ledger = Ledger::new(store.open(&password)?);
    let updated = ledger.revoke(id)?;
    store.save(&password, ledger.entries())?;
    println!("{}", render::status_changed(id, "revoked", updated));
    Ok(())
}

fn cmd_activate(cli: &Cli, id: &str) -> Result<()> {
    let (store, password) = open_registry(cli)?;
    let mut ledger = Ledger::new(store.open(&password)?);
    let updated = ledger.mark_activated(id)?;
    store.save(&password, ledger.entries())?;
    println!("{}", render::status_changed(id, "activated", updated));
    Ok(())
}

fn cmd_export(cli: &Cli, out: Option<&Path>) -> Result<()> {
    let dir = cli.registry_dir()?;
    let (store, password) = open_registry(cli)?;
    let ledger = Ledger::new(store.open(&password)?);
    if ledger.is_empty() {
        println!("Registry is empty.");
        return Ok(());
    }

    let path = out.map_or_else(|| dir.join(DEFAULT_EXPORT_FILE_NAME), Path::to_path_buf);
    let rows = lexflow_registry::export_csv_to_path(ledger.entries(), &path)
        .with_context(|| format!("failed to export to {}", path.display()))?;
    println!("{}", render::exported(&path, rows));
    Ok(())
}

fn cmd_stats(cli: &Cli) -> Result<()> {
    let (store, password) = open_registry(cli)?;
    let ledger = Ledger::new(store.open(&password)?);
    println!("{}", render::stats(&ledger.stats(now_ms())));
    Ok(())
}

/// Store for the configured directory plus its password.
fn open_registry(cli: &Cli) -> Result<(RegistryStore, String)> {
    let dir = cli.registry_dir()?;
    debug!("registry directory: {}", dir.display());
    let store = RegistryStore::new(dir);
    let password = registry_password(&store)?;
    Ok((store, password))
}

/// Password from the environment, else prompted. A new registry asks twice.
fn registry_password(store: &RegistryStore) -> Result<String> {
    if let Ok(password) = env::var(REGISTRY_PASSWORD_ENV) {
        return Ok(password);
    }

    if store.exists() {
        return prompt_secret("Registry password: ");
    }

    eprintln!("First run: choose a password for the license registry.");
    let first = prompt_secret("New password: ")?;
    let second = prompt_secret("Confirm password: ")?;
    if first != second {
        bail!("passwords do not match");
    }
    if first.chars().count() < MIN_PASSWORD_LEN {
        bail!("password too short (minimum {MIN_PASSWORD_LEN} characters)");
    }
    Ok(first)
}

fn load_private_key(args: &GenerateArgs) -> Result<KeyPair> {
    let raw = if let Some(path) = &args.private_key_file {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read private key file {}", path.display()))?
    } else if let Ok(raw) = env::var(PRIVATE_KEY_ENV) {
        raw
    } else {
        prompt_secret("Private key (Base64): ")?
    };
    KeyPair::from_private_b64(&raw).context("invalid private key")
}

fn prompt_line(prompt: &str) -> Result<String> {
    prompt::ask(&mut io::stdin().lock(), &mut io::stderr(), prompt)
}

fn prompt_until<T>(prompt: &str, parse: impl Fn(&str) -> RegistryResult<T>) -> Result<T> {
    prompt::ask_until(&mut io::stdin().lock(), &mut io::stderr(), prompt, parse)
}

/// Read a secret from the terminal (hides input)
fn prompt_secret(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    rpassword::read_password().context("failed to read password")
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(prompt::is_yes(&prompt_line(prompt)?))
}
