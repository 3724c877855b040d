//! accelerator-kit - bind and manage global keyboard shortcuts.
//!
//! `run` registers every enabled shortcut with the OS and prints each
//! published event as a JSON line. The other commands edit or inspect the
//! saved bindings without touching OS hotkeys.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use accelerator_kit::binding::{FakeBackend, GlobalHotkeyBackend};
use accelerator_kit::config::{self, Config};
use accelerator_kit::engine::{AcceleratorEngine, EngineSettings};
use accelerator_kit::events::EventKind;
use accelerator_kit::logging;
use accelerator_kit::shortcuts::{ShortcutCategory, ShortcutStore, PRESETS};
use accelerator_kit::store::{JsonFileStore, MemoryStore};

#[derive(Parser)]
#[command(name = "accelerator-kit")]
#[command(about = "Global keyboard shortcut engine", version)]
struct Cli {
    /// Config file (default: ~/.accelerator-kit/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Skip hide/minimize/reload window shortcuts
    #[arg(long, global = true)]
    safe_mode: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register shortcuts and print triggered events until interrupted
    Run,

    /// List shortcuts with their effective accelerators
    List {
        /// Only shortcuts in this category (recording, navigation, editing, system)
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive filter over name, description and accelerator
        #[arg(long)]
        search: Option<String>,
    },

    /// Change a shortcut's accelerator
    Rebind {
        id: String,
        accelerator: String,
    },

    /// Enable or disable a shortcut
    Toggle { id: String },

    /// Check an accelerator string and print its canonical form
    Validate { accelerator: String },

    /// Report shortcuts that share an accelerator
    Conflicts,

    /// Print customized bindings as JSON
    Export,

    /// Replace customized bindings from a JSON file
    Import { file: PathBuf },

    /// Drop all customization
    Reset,

    /// Show failures recorded by the last registration pass
    Failures,

    /// List the built-in binding presets
    Presets,

    /// Replace customization with a built-in preset
    ApplyPreset { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    if cli.safe_mode {
        config.safe_mode = Some(true);
    }

    let _log_guard = logging::init(&config.log_dir(), &config.get_log_filter());

    match cli.command {
        Commands::Run => run(&config),
        Commands::List { category, search } => list(&config, category.as_deref(), search.as_deref()),
        Commands::Rebind { id, accelerator } => {
            let engine = offline_engine(&config)?;
            engine.rebind(&id, &accelerator)?;
            if let Some(shortcut) = engine.get(&id) {
                println!("{} -> {}", id, shortcut.accelerator);
            }
            Ok(())
        }
        Commands::Toggle { id } => {
            let engine = offline_engine(&config)?;
            let enabled = engine.toggle(&id)?;
            println!("{} {}", id, if enabled { "enabled" } else { "disabled" });
            Ok(())
        }
        Commands::Validate { accelerator } => validate(&accelerator),
        Commands::Conflicts => conflicts(&config),
        Commands::Export => {
            let engine = offline_engine(&config)?;
            println!("{}", engine.export_bindings()?);
            Ok(())
        }
        Commands::Import { file } => import(&config, &file),
        Commands::Reset => {
            let engine = offline_engine(&config)?;
            engine.reset_to_defaults()?;
            println!("Shortcuts reset to defaults");
            Ok(())
        }
        Commands::Failures => {
            let engine = offline_engine(&config)?;
            println!("{}", serde_json::to_string_pretty(&engine.last_failures()?)?);
            Ok(())
        }
        Commands::Presets => {
            for preset in PRESETS {
                println!("{:<14} {:<18} {}", preset.id, preset.name, preset.description);
            }
            Ok(())
        }
        Commands::ApplyPreset { id } => {
            let engine = offline_engine(&config)?;
            engine.apply_preset(&id)?;
            println!("Applied preset '{}'", id);
            Ok(())
        }
    }
}

/// Open the on-disk store, or an in-memory one if the data dir is unusable.
fn open_store(config: &Config) -> ShortcutStore {
    let path = config.store_path();
    match JsonFileStore::open(&path) {
        Ok(store) => ShortcutStore::new(store),
        Err(e) => {
            logging::log_error(
                "STORE",
                &e.to_string(),
                Some("opening binding store, customization will not persist"),
            );
            ShortcutStore::new(MemoryStore::new())
        }
    }
}

/// Engine over the saved bindings that never registers OS hotkeys.
fn offline_engine(config: &Config) -> Result<AcceleratorEngine> {
    let settings = EngineSettings {
        record_outcomes: false,
        ..EngineSettings::from(config)
    };
    AcceleratorEngine::new(FakeBackend::new(), open_store(config), settings)
        .context("Failed to load shortcuts")
}

fn run(config: &Config) -> Result<()> {
    let backend = GlobalHotkeyBackend::new().context("Failed to start hotkey manager")?;
    let engine = AcceleratorEngine::new(backend, open_store(config), EngineSettings::from(config))?;

    for kind in EventKind::ALL {
        engine.events().on(kind, |event| {
            if event.is_remediation() {
                warn!(event = event.name(), "Shortcut registration needs attention");
            }
            match serde_json::to_string(event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!(error = %e, "Failed to serialize event"),
            }
        });
    }

    let report = engine.register_all();
    info!(
        registered = report.registered.len(),
        failed = report.failed(),
        skipped = report.skipped.len(),
        "Listening for shortcuts"
    );

    let triggers = engine.trigger_receiver();
    while let Ok(accelerator) = triggers.recv_blocking() {
        engine.handle_trigger(&accelerator);
    }

    engine.unregister_all();
    Ok(())
}

fn list(config: &Config, category: Option<&str>, search: Option<&str>) -> Result<()> {
    let category = category
        .map(|name| {
            ShortcutCategory::parse(name).with_context(|| format!("Unknown category '{}'", name))
        })
        .transpose()?;

    let engine = offline_engine(config)?;
    for status in engine.status() {
        if category.is_some_and(|c| c != status.category) {
            continue;
        }
        if let Some(text) = search {
            if !engine.search(text).iter().any(|s| s.id == status.id) {
                continue;
            }
        }
        println!(
            "{:<24} {:<32} {:<11} {}",
            status.id,
            status.accelerator,
            status.category.as_str(),
            if status.enabled { "" } else { "(disabled)" }
        );
    }
    Ok(())
}

fn validate(accelerator: &str) -> Result<()> {
    let parsed = accelerator_kit::accelerator::validate(accelerator)
        .with_context(|| format!("'{}' is not a valid accelerator", accelerator))?;
    println!("{}", parsed);
    if accelerator_kit::shortcuts::is_reserved(&parsed) {
        println!("warning: {} is reserved by the operating system", parsed);
    }
    Ok(())
}

fn conflicts(config: &Config) -> Result<()> {
    let engine = offline_engine(config)?;
    let conflicts = engine.find_conflicts();
    if conflicts.is_empty() {
        println!("No conflicts");
    }
    for conflict in conflicts {
        println!(
            "{}: '{}' wins over '{}'",
            conflict.accelerator, conflict.winner_id, conflict.loser_id
        );
    }
    Ok(())
}

fn import(config: &Config, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let engine = offline_engine(config)?;
    engine.import_bindings(&json)?;
    println!("Imported bindings from {}", file.display());
    Ok(())
}
