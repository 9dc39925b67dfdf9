//! keygen — reproducible multi-chain key generation from one recovery phrase.
//!
//! Derives BIP-44/49/84/86 Bitcoin and BIP-44 Ethereum keys, prints them as
//! fixed-width tables and saves the export to the file system and,
//! optionally, a 1Password vault. Exports can be sealed with a password.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bitcoin::Network;
use clap::{ArgAction, Args, Parser, Subcommand};
use keygen_core::AddressScheme;
use keygen_core::constants::{DEFAULT_ACCOUNTS, DEFAULT_NAME};
use keygen_wallet::encryption::open_file;
use keygen_wallet::{
    ExportFormatter, ExportPayload, KeyManager, KeygenConfig, SaveContext, Saver, SaverSet,
    VaultConfig, generate_mnemonic, normalize_mnemonic,
};

/// Generate keys for Bitcoin and EVM chains from a BIP-39 phrase.
#[derive(Parser)]
#[command(name = "keygen")]
#[command(
    version,
    about = "Generate keys for various blockchains",
    long_about = "Generate keys for Bitcoin and EVM chains from one BIP-39 recovery phrase. \
                  Keys can be saved to the file system, sealed with AES-256-GCM, or stored in \
                  a 1Password vault. This tool has not been audited; use at your own risk."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Directory to save exports to, or the sealed file to decrypt.
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Password for encryption and decryption. Prompted for when needed.
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Do not print the mnemonic and private keys.
    #[arg(short, long, global = true)]
    suppress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate keys, print them and save them unencrypted.
    Generate(KeyArgs),
    /// Same as `generate`.
    Create(KeyArgs),
    /// Generate keys and save them sealed with a password.
    Encrypt(KeyArgs),
    /// Open a sealed export and print its contents.
    Decrypt,
}

#[derive(Args)]
struct KeyArgs {
    /// Recovery phrase to derive from. A fresh 24-word phrase is generated
    /// when omitted.
    #[arg(short, long)]
    mnemonic: Option<String>,

    /// Number of addresses per scheme.
    #[arg(short, long, default_value_t = DEFAULT_ACCOUNTS)]
    accounts: u32,

    /// Wallet name used in file names and vault item titles.
    #[arg(short, long, default_value = DEFAULT_NAME)]
    name: String,

    /// Use the password as the BIP-39 passphrase.
    #[arg(short, long)]
    encrypt_mnemonic: bool,

    /// Compressed public keys for legacy addresses and WIF.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    compressed: bool,

    /// Save the export.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    save: bool,

    /// Bitcoin network: bitcoin, testnet, signet or regtest.
    #[arg(long, default_value = "bitcoin")]
    network: Network,

    /// Comma-separated address schemes (legacy, nested, native, taproot, evm).
    #[arg(long, value_delimiter = ',')]
    schemes: Vec<AddressScheme>,

    /// Account level under which addresses are enumerated.
    #[arg(long, default_value_t = 0)]
    account: u32,

    /// Change level under which addresses are enumerated.
    #[arg(long, default_value_t = 0)]
    change: u32,

    /// Leave the recovery phrase out of the export.
    #[arg(long)]
    omit_mnemonic: bool,

    /// 1Password service account token (falls back to OP_SERVICE_ACCOUNT_TOKEN).
    #[arg(short = 't', long)]
    op_service_account_token: Option<String>,

    /// 1Password vault id (falls back to OP_VAULT_ID).
    #[arg(short = 'v', long)]
    op_vault_id: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Plain,
    Sealed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) | Commands::Create(args) => {
            generate(cli.global, args, Mode::Plain).await
        }
        Commands::Encrypt(args) => generate(cli.global, args, Mode::Sealed).await,
        Commands::Decrypt => decrypt(cli.global),
    }
}

/// Derive, save and print one export.
async fn generate(global: GlobalArgs, args: KeyArgs, mode: Mode) -> Result<()> {
    let mnemonic = args.mnemonic.clone();
    let mut config = build_config(global, args, mode)?;
    let needs_password = config.encrypt || config.encrypt_mnemonic;
    if needs_password && config.password().is_none() {
        config.password = Some(prompt_new_password()?);
    }
    config.validate()?;

    let phrase = match mnemonic {
        Some(m) => normalize_mnemonic(&m),
        None => generate_mnemonic()?,
    };
    let manager = KeyManager::with_network(&phrase, config.mnemonic_passphrase(), config.network)
        .context("invalid recovery phrase")?;
    let formatter = ExportFormatter::new(&manager, config.export_request());

    if config.save {
        let password = if config.encrypt { config.password() } else { None };
        let payload = ExportPayload::from_formatter(&formatter, password)?;
        let savers = SaverSet::from_config(&config)?;
        tracing::debug!(sinks = ?savers.names(), "saving export");
        savers
            .save(&SaveContext::new(&config.name), &payload)
            .await
            .context("failed to save export")?;
    }

    if mode == Mode::Plain && !config.suppress_output {
        println!("\n{:<18} ", config.name);
        print!("{}", formatter.render_pretty()?);
    }
    Ok(())
}

/// Open a sealed export and print it.
fn decrypt(global: GlobalArgs) -> Result<()> {
    let mut config = KeygenConfig {
        decrypt: true,
        file: global.file,
        password: global.password,
        ..Default::default()
    };
    if config.password().is_none() {
        config.password = Some(prompt_password("Password")?);
    }
    config.validate()?;

    let (Some(path), Some(password)) = (config.file.as_deref(), config.password()) else {
        bail!("a file path and password are required for decryption");
    };
    let plain = open_file(path, password.as_bytes())
        .with_context(|| format!("failed to decrypt {}", path.display()))?;
    println!("{}", String::from_utf8_lossy(&plain));
    Ok(())
}

/// Fold parsed arguments and the environment into a run configuration.
fn build_config(global: GlobalArgs, args: KeyArgs, mode: Mode) -> Result<KeygenConfig> {
    let vault = VaultConfig::from_env(args.op_service_account_token, args.op_vault_id)?;
    let schemes = if args.schemes.is_empty() {
        AddressScheme::ALL.to_vec()
    } else {
        args.schemes
    };
    Ok(KeygenConfig {
        name: args.name,
        accounts: args.accounts,
        compressed: args.compressed,
        save: args.save || mode == Mode::Sealed,
        encrypt: mode == Mode::Sealed,
        decrypt: false,
        encrypt_mnemonic: args.encrypt_mnemonic,
        password: global.password,
        file: global.file,
        suppress_output: global.suppress,
        network: args.network,
        schemes,
        account: args.account,
        change: args.change,
        include_mnemonic: !args.omit_mnemonic,
        vault,
    })
}

/// Prompt for a password securely (no echo).
fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(format!("{prompt}: ")).context("failed to read password")
}

/// Prompt twice and require a match.
fn prompt_new_password() -> Result<String> {
    let password = prompt_password("Enter password")?;
    let confirm = prompt_password("Confirm password")?;
    if password != confirm {
        bail!("passwords do not match");
    }
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}
