//! Command-line front end for keybind.
//!
//! Opens the credential store under the data directory, then runs one
//! subcommand against it. Output goes to the supplied writer as text or,
//! with `--json`, as pretty-printed JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use keybind_crypto::{Keystore, KeyringKeystore, PassphraseKeystore, Salt, SALT_SIZE};
use keybind_device::{DeviceAttributes, DeviceFingerprint};
use keybind_session::{
    mask_license_key, now_millis, LoginOutcome, LoginRequest, SessionError, SessionManager,
};
use keybind_store::StoreConfig;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Service name under which the OS keyring holds the master key.
pub const KEYRING_SERVICE: &str = "keybind";

/// File next to the database holding the passphrase keystore salt.
pub const SALT_FILE: &str = "keystore.salt";

#[derive(Parser, Debug)]
#[command(name = "keybind")]
#[command(about = "Device-bound license and session credentials", version)]
pub struct Cli {
    /// Directory holding the credential database
    #[arg(long, global = true, env = "KEYBIND_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Where the master key comes from
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = KeystoreKind::Keyring,
        env = "KEYBIND_KEYSTORE"
    )]
    pub keystore: KeystoreKind,

    /// Passphrase for the passphrase keystore
    #[arg(long, global = true, env = "KEYBIND_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystoreKind {
    /// OS keychain / secret service / credential manager
    Keyring,
    /// Key derived from --passphrase
    Passphrase,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print this device's fingerprint
    Fingerprint {
        /// Also print the attributes it was derived from
        #[arg(long)]
        attributes: bool,
    },
    /// Show the stored session state
    Status,
    /// Store a session issued by the license server
    Login {
        #[arg(long)]
        license_key: String,
        #[arg(long)]
        session_token: String,
        #[arg(long)]
        refresh_token: Option<String>,
        /// Token lifetime in seconds from now
        #[arg(long, conflicts_with = "expires_at")]
        expires_in: Option<i64>,
        /// Absolute token expiry, milliseconds since the Unix epoch
        #[arg(long)]
        expires_at: Option<i64>,
        /// Replace a binding to a different device
        #[arg(long)]
        rebind: bool,
    },
    /// Erase all credentials and preferences
    Logout,
    /// Drop the session and refresh token, keep the license binding
    Revoke,
    /// Erase authentication data, keep preferences
    ClearAuth,
    /// List problems with the stored session
    Diagnose,
}

impl Cli {
    /// `--data-dir`, or the platform data directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("keybind"))
                .context("No data directory on this platform, pass --data-dir"),
        }
    }

    fn keystore(&self, data_dir: &Path) -> Result<Arc<dyn Keystore>> {
        match self.keystore {
            KeystoreKind::Keyring => Ok(Arc::new(KeyringKeystore::new(KEYRING_SERVICE))),
            KeystoreKind::Passphrase => {
                let Some(passphrase) = self.passphrase.as_deref() else {
                    bail!("--keystore passphrase requires --passphrase or KEYBIND_PASSPHRASE");
                };
                let salt = load_or_generate_salt(&data_dir.join(SALT_FILE))?;
                let keystore = PassphraseKeystore::new(passphrase, &salt)
                    .context("Failed to derive key from passphrase")?;
                Ok(Arc::new(keystore))
            }
        }
    }

    fn open_manager(&self) -> Result<SessionManager> {
        let data_dir = self.resolve_data_dir()?;
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        let config = StoreConfig::in_dir(&data_dir);
        debug!("Opening credential store at {:?}", config.db_path);
        let keystore = self.keystore(&data_dir)?;
        SessionManager::open(&config, keystore).context("Failed to open credential store")
    }
}

fn load_or_generate_salt(path: &Path) -> Result<Salt> {
    if path.exists() {
        let bytes = fs::read(path).context("Failed to read salt file")?;
        let bytes: [u8; SALT_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            anyhow::anyhow!("Salt file has {} bytes, expected {SALT_SIZE}", b.len())
        })?;
        Ok(Salt::from_bytes(bytes))
    } else {
        info!("Generating new keystore salt at {:?}", path);
        let salt = Salt::random();
        fs::write(path, salt.as_bytes()).context("Failed to write salt file")?;
        Ok(salt)
    }
}

#[derive(Serialize)]
struct FingerprintOutput<'a> {
    fingerprint: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a DeviceAttributes>,
}

#[derive(Serialize)]
struct ActionOutput {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<LoginOutcome>,
}

fn emit_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn emit_action(cli: &Cli, out: &mut dyn Write, action: &'static str, text: &str) -> Result<()> {
    if cli.json {
        emit_json(out, &ActionOutput { action, outcome: None })
    } else {
        writeln!(out, "{text}")?;
        Ok(())
    }
}

/// Runs the parsed command, writing results to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Commands::Fingerprint { attributes } => {
            let attrs = DeviceAttributes::collect();
            let fingerprint = DeviceFingerprint::from_attributes(&attrs);
            if cli.json {
                emit_json(
                    out,
                    &FingerprintOutput {
                        fingerprint: fingerprint.id(),
                        attributes: attributes.then_some(&attrs),
                    },
                )?;
            } else {
                writeln!(out, "{fingerprint}")?;
                if *attributes {
                    writeln!(out, "  os_name:    {}", attrs.os_name)?;
                    writeln!(out, "  os_arch:    {}", attrs.os_arch)?;
                    writeln!(out, "  os_version: {}", attrs.os_version)?;
                    writeln!(out, "  cpu_count:  {}", attrs.cpu_count)?;
                    writeln!(out, "  board:      {}", attrs.board)?;
                    writeln!(out, "  brand:      {}", attrs.brand)?;
                    writeln!(out, "  device:     {}", attrs.device)?;
                    writeln!(out, "  hardware:   {}", attrs.hardware)?;
                    writeln!(out, "  model:      {}", attrs.model)?;
                    writeln!(out, "  product:    {}", attrs.product)?;
                }
            }
        }
        Commands::Status => {
            let manager = cli.open_manager()?;
            let summary = manager.summary();
            if cli.json {
                emit_json(out, &summary)?;
            } else {
                writeln!(out, "Logged in:   {}", if summary.logged_in { "yes" } else { "no" })?;
                writeln!(out, "Session:     {}", manager.status())?;
                if let Some(key) = &summary.license_key {
                    writeln!(out, "License:     {key}")?;
                }
                if let Some(expires) = summary.expires_at {
                    writeln!(out, "Expires:     {}", expires.to_rfc3339())?;
                }
                match &summary.bound_device {
                    Some(bound) if summary.device_changed => writeln!(
                        out,
                        "Device:      bound to {bound}, this device is {} (changed)",
                        summary.current_device
                    )?,
                    Some(bound) => writeln!(out, "Device:      {bound}")?,
                    None => writeln!(out, "Device:      not bound")?,
                }
                writeln!(out, "Storage:     {} / {}", summary.storage_backend, summary.keystore)?;
            }
        }
        Commands::Login {
            license_key,
            session_token,
            refresh_token,
            expires_in,
            expires_at,
            rebind,
        } => {
            let manager = cli.open_manager()?;
            let expires_at_ms = match (expires_in, expires_at) {
                (Some(secs), _) => Some(now_millis().saturating_add(secs.saturating_mul(1000))),
                (None, at) => *at,
            };
            let mut request = LoginRequest::new(
                license_key.as_str(),
                session_token.as_str(),
                manager.device().clone(),
            );
            request.refresh_token = refresh_token.clone();
            request.expires_at_ms = expires_at_ms;

            let outcome = match manager.login(&request, *rebind) {
                Ok(outcome) => outcome,
                Err(SessionError::BindConflict { bound, presented }) => bail!(
                    "License is bound to device {bound}, this device is {presented}. Re-run with --rebind to move it."
                ),
                Err(e) => return Err(e).context("Login failed"),
            };
            if cli.json {
                emit_json(
                    out,
                    &ActionOutput {
                        action: "login",
                        outcome: Some(outcome),
                    },
                )?;
            } else {
                writeln!(
                    out,
                    "Logged in with {} ({:?}), session {}",
                    mask_license_key(license_key),
                    outcome,
                    manager.status()
                )?;
            }
        }
        Commands::Logout => {
            cli.open_manager()?.logout()?;
            emit_action(cli, out, "logout", "Logged out; all credentials erased")?;
        }
        Commands::Revoke => {
            cli.open_manager()?.revoke_session_only()?;
            emit_action(cli, out, "revoke", "Session revoked; license binding kept")?;
        }
        Commands::ClearAuth => {
            cli.open_manager()?.clear_authentication_data()?;
            emit_action(cli, out, "clear_auth", "Authentication data erased; preferences kept")?;
        }
        Commands::Diagnose => {
            let manager = cli.open_manager()?;
            let issues = manager.diagnose();
            if cli.json {
                emit_json(out, &issues)?;
            } else if issues.is_empty() {
                writeln!(out, "No issues found")?;
            } else {
                for issue in &issues {
                    let marker = if issue.is_blocking() { "!" } else { "-" };
                    writeln!(out, "{marker} {issue}")?;
                }
            }
        }
    }
    Ok(())
}
