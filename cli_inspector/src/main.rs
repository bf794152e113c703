use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use core_sim::{
    advance_meter_turn, load_meter_config_from_env, persistence, visibility, DumpContext,
    EmpireDirectory, MeterConfig, MeterConfigHandle, ObjectId, ObjectRegistry, SimulationObject,
    Visibility,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and rewrite object meter saves", long_about = None)]
struct Cli {
    /// Meter config file; takes precedence over `METER_CONFIG_PATH`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a one-line description of every object in a save.
    Dump { save: PathBuf },
    /// Show what an observer at the given visibility learns about one object.
    Censor {
        save: PathBuf,
        #[arg(long)]
        object: i32,
        #[arg(long, value_parser = parse_visibility)]
        visibility: Visibility,
        /// Special the observer may see; repeat for several.
        #[arg(long = "special")]
        specials: Vec<String>,
    },
    /// Advance every object's meters through empty turns and write the result.
    Turns {
        save: PathBuf,
        #[arg(long, default_value_t = 1)]
        count: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// Rewrite a save of any supported schema in the current schema.
    Upgrade {
        legacy: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_visibility(value: &str) -> Result<Visibility, String> {
    Visibility::from_name(value).ok_or_else(|| {
        let known: Vec<&str> = Visibility::ALL.iter().map(|vis| vis.name()).collect();
        format!("unknown visibility {value:?}; expected one of {}", known.join(", "))
    })
}

fn is_binary(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "bin")
}

fn read_save(path: &Path, config: &MeterConfig) -> Result<Vec<SimulationObject>> {
    let objects = if is_binary(path) {
        let bytes = fs::read(path).wrap_err_with(|| format!("reading {}", path.display()))?;
        persistence::load_bincode(&bytes, &config.persistence)?
    } else {
        let text =
            fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
        persistence::load_json(&text, &config.persistence)?
    };
    info!(path = %path.display(), objects = objects.len(), "Loaded save");
    Ok(objects)
}

fn write_save(path: &Path, registry: &ObjectRegistry) -> Result<()> {
    let written = if is_binary(path) {
        fs::write(path, persistence::save_bincode(registry.iter())?)
    } else {
        fs::write(path, persistence::save_json(registry.iter())?)
    };
    written.wrap_err_with(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), objects = registry.len(), "Wrote save");
    Ok(())
}

fn probe_version(path: &Path) -> Result<u32> {
    let bytes = fs::read(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let version = if is_binary(path) {
        sim_proto::probe_schema(&bytes)?
    } else {
        sim_proto::probe_schema_json(&String::from_utf8_lossy(&bytes))?
    };
    Ok(version)
}

fn load_registry(path: &Path, config: &MeterConfig) -> Result<ObjectRegistry> {
    let mut registry = ObjectRegistry::new();
    registry.restore(read_save(path, config)?, config.persistence.inhibit_signals_on_load);
    Ok(registry)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (config, config_path) = load_meter_config_from_env();
    if let Some(path) = config_path {
        info!(path = %path.display(), "Using meter config override");
    }
    let mut handle = MeterConfigHandle::new(config);
    if let Some(path) = &cli.config {
        let explicit = MeterConfig::from_file(path)?;
        handle.replace(Arc::new(explicit));
        info!(path = %path.display(), "Using meter config from --config");
    }
    let config = handle.get();

    match cli.command {
        Command::Dump { save } => {
            let registry = load_registry(&save, &config)?;
            let empires = EmpireDirectory::new();
            let ctx = DumpContext::new(&registry, &empires);
            for object in registry.iter() {
                println!("{}", object.dump(&ctx));
            }
        }
        Command::Censor {
            save,
            object,
            visibility: vis,
            specials,
        } => {
            let registry = load_registry(&save, &config)?;
            let target = registry
                .get(ObjectId(object))
                .ok_or_else(|| eyre!("object {object} is not in {}", save.display()))?;
            let visible: BTreeSet<String> = specials.into_iter().collect();
            let view = visibility::censor(target, vis, &visible);
            println!("{} {} as seen at {vis}", target.kind(), target.id());
            for (kind, meter) in view.meters.iter() {
                let shown = if meter.is_undisclosed() {
                    "(undisclosed)".to_string()
                } else {
                    meter.to_string()
                };
                println!("  {kind}: {shown}");
            }
            for (name, special) in &view.specials {
                println!(
                    "  special {name}: added on turn {} capacity {:.6}",
                    special.added_on_turn, special.capacity
                );
            }
        }
        Command::Turns { save, count, out } => {
            let mut registry = load_registry(&save, &config)?;
            for _ in 0..count {
                advance_meter_turn(&mut registry, &config.lifecycle, |_| {});
            }
            info!(turns = count, "Advanced meters");
            write_save(&out, &registry)?;
        }
        Command::Upgrade { legacy, out } => {
            let version = probe_version(&legacy)?;
            let registry = load_registry(&legacy, &config)?;
            write_save(&out, &registry)?;
            println!(
                "upgraded {} from schema {version} to {}",
                legacy.display(),
                sim_proto::CURRENT_SCHEMA_VERSION
            );
        }
    }

    Ok(())
}
