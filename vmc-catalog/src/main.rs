//! vmc-catalog - video metadata catalog tool
//!
//! Acts as the session controller and editing surface for the catalog:
//! shows a title's metadata (stored entry or live tags), applies edits,
//! and regenerates the HTML report after every confirmed save.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vmc_catalog::media_file::MediaFileSource;
use vmc_catalog::source::{LayeredSource, MapSource};
use vmc_catalog::store::flat_file;
use vmc_catalog::{
    CatalogRenderer, FlatFileCatalog, MetadataSource, SessionController, UpsertOutcome, WriteMode,
};
use vmc_common::config::{
    config_file_path, write_toml_config, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver, TomlConfig,
};
use vmc_common::human_time::format_millis_str;

const MODULE_NAME: &str = "vmc-catalog";

/// Command-line arguments for vmc-catalog
#[derive(Parser, Debug)]
#[command(name = "vmc-catalog")]
#[command(about = "Video metadata catalog: review, edit and report per-title metadata")]
#[command(version)]
struct Cli {
    /// Root folder holding the catalog and report
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// Catalog file (relative paths resolve against the root folder)
    #[arg(long, global = true, env = "VMC_CATALOG_FILE")]
    catalog: Option<PathBuf>,

    /// Report file (relative paths resolve against the root folder)
    #[arg(long, global = true, env = "VMC_REPORT_FILE")]
    report: Option<PathBuf>,

    /// Write catalog and report via temp file + rename
    #[arg(long, global = true)]
    atomic: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the metadata of one title, stored or live
    Show {
        #[command(flatten)]
        media: MediaArgs,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit one title's metadata and save it to the catalog
    Edit {
        #[command(flatten)]
        media: MediaArgs,

        /// Field assignment, e.g. --set Director="Ridley Scott"
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        sets: Vec<String>,
    },
    /// List stored titles
    List {
        /// Skip malformed records instead of failing
        #[arg(long)]
        lenient: bool,

        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Regenerate the report from the stored catalog
    Render {
        /// Skip malformed records instead of failing
        #[arg(long)]
        lenient: bool,
    },
    /// Write a config file with every setting spelled out
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Where live metadata comes from
#[derive(Args, Debug)]
struct MediaArgs {
    /// Media file whose tags seed a new entry
    media: Option<PathBuf>,

    /// Title to look up (defaults to the media's title tag, then file name)
    #[arg(long)]
    title: Option<String>,

    /// Live tag override, e.g. --tag Genre=Drama
    #[arg(long = "tag", value_name = "FIELD=VALUE")]
    tags: Vec<String>,

    /// TOML table of live tag overrides
    #[arg(long, value_name = "FILE")]
    tags_file: Option<PathBuf>,
}

/// Resolved file locations and write mode
struct Paths {
    catalog: PathBuf,
    report: PathBuf,
    mode: WriteMode,
}

fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, got {:?}", raw))?;
    let index = vmc_catalog::FieldCatalog
        .index_of_ignore_case(name.trim())
        .ok_or_else(|| anyhow!("unknown field {:?}", name.trim()))?;
    let canonical = vmc_catalog::fields::FIELD_NAMES[index];
    Ok((canonical.to_string(), value.to_string()))
}

fn load_tags_file(path: &Path) -> Result<MapSource> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tags file {}", path.display()))?;
    let table: toml::Table = toml::from_str(&content)
        .with_context(|| format!("Failed to parse tags file {}", path.display()))?;
    let mut source = MapSource::new();
    for (name, value) in table {
        let (name, _) = parse_assignment(&format!("{}=", name))?;
        let value = match value {
            toml::Value::String(s) => s,
            other => other.to_string(),
        };
        source.insert(name, value);
    }
    Ok(source)
}

fn resolve_paths(cli: &Cli, config: &TomlConfig) -> Result<Paths> {
    let root = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(cli.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let catalog = initializer.catalog_path(cli.catalog.as_deref().or(config.catalog_file.as_deref()));
    let report = initializer.report_path(cli.report.as_deref().or(config.report_file.as_deref()));
    let mode = if cli.atomic || config.atomic_writes {
        WriteMode::Atomic
    } else {
        WriteMode::Overwrite
    };

    info!("Catalog: {}", catalog.display());
    info!("Report: {}", report.display());
    Ok(Paths {
        catalog,
        report,
        mode,
    })
}

fn build_source(args: &MediaArgs) -> Result<(LayeredSource<'static>, Option<MediaFileSource>)> {
    let mut overrides = match &args.tags_file {
        Some(path) => load_tags_file(path)?,
        None => MapSource::new(),
    };
    for raw in &args.tags {
        let (name, value) = parse_assignment(raw)?;
        overrides.insert(name, value);
    }

    let media = args
        .media
        .as_deref()
        .map(MediaFileSource::open)
        .transpose()
        .context("Failed to read media tags")?;

    let mut layered = LayeredSource::new().push(overrides);
    if let Some(media) = &media {
        layered = layered.push(media.clone());
    }
    Ok((layered, media))
}

fn resolve_title(args: &MediaArgs, source: &dyn MetadataSource, media: Option<&MediaFileSource>) -> Result<String> {
    args.title
        .clone()
        .or_else(|| source.get_field("Title").filter(|t| !t.is_empty()))
        .or_else(|| media.and_then(MediaFileSource::fallback_title))
        .ok_or_else(|| anyhow!("no title: pass a media file, --title, or --tag Title=..."))
}

fn controller(paths: &Paths) -> SessionController<FlatFileCatalog> {
    SessionController::new(
        FlatFileCatalog::new(&paths.catalog).with_write_mode(paths.mode),
        CatalogRenderer::new(paths.mode),
        &paths.report,
    )
}

fn print_record(record: &vmc_catalog::MetadataRecord) {
    println!("{:<12} Value", "Attribute");
    for (name, value) in record.iter() {
        match (name, format_millis_str(value)) {
            ("Duration", Some(clock)) => println!("{:<12} {} ({})", name, value, clock),
            _ => println!("{:<12} {}", name, value),
        }
    }
}

fn run_show(paths: &Paths, media: &MediaArgs, json: bool) -> Result<()> {
    let (source, file) = build_source(media)?;
    let title = resolve_title(media, &source, file.as_ref())?;

    let mut controller = controller(paths);
    let session = controller.open(&title, &source)?;
    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
    } else {
        println!("# {} ({:?})", session.key, session.origin);
        print_record(&session.record);
    }
    controller.cancel()?;
    Ok(())
}

fn run_edit(paths: &Paths, media: &MediaArgs, sets: &[String]) -> Result<()> {
    let assignments = sets
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;
    let (source, file) = build_source(media)?;
    let title = resolve_title(media, &source, file.as_ref())?;

    let mut controller = controller(paths);
    controller.open(&title, &source)?;
    {
        let record = controller.record_mut()?;
        for (name, value) in assignments {
            record.set_field(&name, value)?;
        }
    }

    let outcome = match controller.commit() {
        Ok(outcome) => outcome,
        Err(e) => {
            // Leave nothing half-open behind
            if let Err(cancel_err) = controller.cancel() {
                warn!("Cancel after failed confirm: {}", cancel_err);
            }
            return Err(e).context("Failed to save changes");
        }
    };

    let verb = match outcome.upsert {
        UpsertOutcome::Updated(_) => "Updated",
        UpsertOutcome::Inserted(_) => "Added",
    };
    println!(
        "{} \"{}\" ({} records), report: {}",
        verb,
        outcome.key,
        outcome.records,
        outcome.report_path.display()
    );
    Ok(())
}

fn load_store(paths: &Paths, lenient: bool) -> Result<vmc_catalog::RecordStore> {
    if lenient {
        let load = flat_file::load_lenient(&paths.catalog)?;
        for skipped in &load.skipped {
            warn!("{}", skipped);
        }
        Ok(load.store)
    } else {
        Ok(flat_file::load(&paths.catalog)?)
    }
}

fn run_list(paths: &Paths, lenient: bool, json: bool) -> Result<()> {
    let store = load_store(paths, lenient)?;
    if json {
        println!("{}", serde_json::to_string_pretty(store.records())?);
        return Ok(());
    }
    for record in &store {
        let duration = record
            .field("Duration")
            .and_then(format_millis_str)
            .unwrap_or_default();
        println!("{}\t{}", record.key(), duration);
    }
    Ok(())
}

fn run_render(paths: &Paths, lenient: bool) -> Result<()> {
    let store = load_store(paths, lenient)?;
    CatalogRenderer::new(paths.mode).write_report(&paths.report, &store)?;
    println!("Report: {} ({} records)", paths.report.display(), store.len());
    Ok(())
}

fn run_init(cli: &Cli, config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path.ok_or_else(|| anyhow!("no config directory on this platform"))?;
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }

    let mut config = TomlConfig::from_defaults(&CompiledDefaults::for_current_platform());
    if let Some(root) = &cli.root_folder {
        config.root_folder = Some(root.clone());
    }
    config.atomic_writes = cli.atomic;
    write_toml_config(&config, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Config: {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config_file_path(MODULE_NAME);
    let config_result = match &config_path {
        Some(path) => TomlConfig::load(path),
        None => Ok(TomlConfig::default()),
    };
    let log_level = config_result
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| CompiledDefaults::for_current_platform().log_level);

    // Logs go to stderr so command output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting vmc-catalog v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = match config_result {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            TomlConfig::default()
        }
    };
    let paths = resolve_paths(&cli, &config)?;

    match &cli.command {
        Command::Show { media, json } => run_show(&paths, media, *json),
        Command::Edit { media, sets } => {
            if sets.is_empty() {
                bail!("nothing to edit");
            }
            run_edit(&paths, media, sets)
        }
        Command::List { lenient, json } => run_list(&paths, *lenient, *json),
        Command::Render { lenient } => run_render(&paths, *lenient),
        Command::Init { force } => run_init(&cli, config_path.as_deref(), *force),
    }
}
