//! `watchprefs` command-line tool.
//!
//! Validates settings submissions against a Clay schema, migrates stored
//! preferences across schema versions and prints the device dictionary.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use env_logger::Env;
use watchprefs::{
    EncodedMessage, ItemDef, Platform, RawInput, Session, SubmitError, ValidationErrors,
    encode, migrate, store::PreferenceStore, transport::DictTransport,
};

use crate::ctx::{AppContext, ProjectConfig};

#[macro_use]
extern crate log;

mod ctx;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Project configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Override the watch platform from the configuration.
    #[arg(short, long, global = true, value_enum)]
    platform: Option<PlatformArg>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a submission and print the encoded message.
    Encode {
        /// Submitted values as a JSON object.
        input: PathBuf,
    },
    /// Validate, persist and encode a submission for the device.
    Submit {
        /// Submitted values as a JSON object.
        input: PathBuf,
        /// Also write the raw dictionary bytes to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Reconcile stored preferences with the current schema.
    Migrate {
        /// Save the migrated preferences.
        #[arg(short, long)]
        write: bool,
    },
    /// Print the numeric message key ids as C defines.
    Keys,
    /// Print a JSON Schema.
    Schema {
        /// Which document to describe.
        #[arg(value_enum, default_value_t = SchemaKind::Items)]
        kind: SchemaKind,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SchemaKind {
    /// The Clay settings item list.
    Items,
    /// The project configuration file.
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PlatformArg {
    Aplite,
    Basalt,
    Chalk,
    Diorite,
    Emery,
}

impl From<PlatformArg> for Platform {
    fn from(value: PlatformArg) -> Self {
        match value {
            PlatformArg::Aplite => Platform::Aplite,
            PlatformArg::Basalt => Platform::Basalt,
            PlatformArg::Chalk => Platform::Chalk,
            PlatformArg::Diorite => Platform::Diorite,
            PlatformArg::Emery => Platform::Emery,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Schema { kind } => print_schema(kind),
        command => {
            let ctx = AppContext::load(cli.config, cli.platform.map(Platform::from))?;
            match command {
                Command::Encode { input } => cmd_encode(&ctx, &input).await,
                Command::Submit { input, out } => cmd_submit(&ctx, &input, out).await,
                Command::Migrate { write } => cmd_migrate(&ctx, write),
                Command::Keys => cmd_keys(&ctx),
                Command::Schema { .. } => unreachable!("schema needs no project"),
            }
        }
    }
}

fn print_schema(kind: SchemaKind) -> anyhow::Result<()> {
    let schema = match kind {
        SchemaKind::Items => schemars::schema_for!(Vec<ItemDef>),
        SchemaKind::Config => schemars::schema_for!(ProjectConfig),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

async fn read_input(path: &Path) -> anyhow::Result<RawInput> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw: RawInput = serde_json::from_str(&content).with_context(|| {
        format!(
            "{} is not a flat object of booleans, integers and strings",
            path.display()
        )
    })?;
    Ok(raw)
}

fn print_message(message: &EncodedMessage) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(message)?);
    Ok(())
}

fn report_invalid(errors: &ValidationErrors) -> anyhow::Error {
    for field in errors {
        println!("  {} {}", field.key.to_string().red().bold(), field.error);
    }
    anyhow::anyhow!("{} invalid setting(s)", errors.len())
}

async fn cmd_encode(ctx: &AppContext, input: &Path) -> anyhow::Result<()> {
    let schema = ctx.schema()?;
    let raw = read_input(input).await?;
    let session = &ctx.config.session;

    match encode(&schema, &raw, &session.capability_set(), session.gray_policy) {
        Ok(message) => print_message(&message),
        Err(errors) => Err(report_invalid(&errors)),
    }
}

async fn cmd_submit(ctx: &AppContext, input: &Path, out: Option<PathBuf>) -> anyhow::Result<()> {
    let schema = ctx.schema()?;
    let raw = read_input(input).await?;
    let keys = ctx.key_table(&schema);
    let store = ctx.store()?;

    let mut session = Session::new(
        schema,
        ctx.config.session.clone(),
        store,
        DictTransport::new(keys, Vec::new()),
    );

    let submission = match session.submit(&raw) {
        Ok(submission) => submission,
        Err(SubmitError::Validation(errors)) => return Err(report_invalid(&errors)),
        Err(e) => return Err(e.into()),
    };

    print_message(&submission.message)?;
    let (store, transport) = session.into_parts();
    let bytes = transport.into_inner();
    println!(
        "{}",
        format!(
            "Preferences saved to {}\r\n  dictionary ({} bytes): {}",
            store.path().display(),
            bytes.len(),
            hex::encode(&bytes)
        )
        .bold()
        .purple()
    );

    if let Some(out) = out {
        let out = ctx.resolve(&out);
        tokio::fs::write(&out, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!("dictionary written to {}", out.display());
    }
    Ok(())
}

fn cmd_migrate(ctx: &AppContext, write: bool) -> anyhow::Result<()> {
    let schema = ctx.schema()?;
    let mut store = ctx.store()?;
    let previous = store.load()?;
    let merged = migrate(
        &EncodedMessage::new(),
        &previous,
        &schema,
        ctx.config.session.gray_policy,
    );

    for key in previous.keys().filter(|k| !merged.contains_key(*k)) {
        println!("  {} {key}", "-".red().bold());
    }
    for (key, value) in &merged {
        match previous.get(key) {
            Some(old) if old == value => println!("    {key} = {}", serde_json::to_string(value)?),
            _ => println!(
                "  {} {key} = {}",
                "+".green().bold(),
                serde_json::to_string(value)?
            ),
        }
    }

    if write {
        store.save(&merged)?;
        println!("{}", format!("Saved to {}", store.path().display()).bold().purple());
    } else if merged != previous {
        println!("Run with --write to save the migrated preferences.");
    }
    Ok(())
}

fn cmd_keys(ctx: &AppContext) -> anyhow::Result<()> {
    let schema = ctx.schema()?;
    let keys = ctx.key_table(&schema);
    let mut ids: Vec<_> = keys.iter().collect();
    ids.sort_by_key(|(_, id)| *id);

    let mut seen = std::collections::BTreeSet::new();
    for (key, id) in ids {
        if !seen.insert(id) {
            bail!("message id {id} is assigned to more than one key");
        }
        println!("#define MESSAGE_KEY_{key} {id}");
    }
    Ok(())
}
