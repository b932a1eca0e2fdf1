//! rowgraph CLI - hydrate NDJSON row dumps into entity graphs
//!
//! Usage:
//!   rowgraph hydrate --schema <schema.toml> --rows <rows.ndjson> --root <entity> [--segment-size N]
//!   rowgraph describe --schema <schema.toml> --root <entity> --columns id,customer.name
//!
//! `--declarations <entities.toml>` can replace `--schema`; entities are then
//! scanned from their doc-comment annotations using the `[annotations]` and
//! `[cache]` settings.
//!
//! The first line of a rows file is the column header (a JSON array of
//! strings); every following line is one row (a JSON array of values).

use clap::{Args, Parser, Subcommand};
use rowgraph::annotations::{AnnotationRegistry, Namespaces};
use rowgraph::config::Settings;
use rowgraph::logging::init_logging;
use rowgraph::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "rowgraph")]
#[command(about = "rowgraph - hydrate flat dotted-column rows into entity graphs")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ROWGRAPH_CONFIG, ./rowgraph.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hydrate rows and print one JSON object per root entity
    Hydrate {
        #[command(flatten)]
        entities: EntitySource,

        /// Path to the NDJSON rows file
        #[arg(short, long)]
        rows: PathBuf,

        /// Root entity id
        #[arg(long)]
        root: String,

        /// Rows per segment (overrides the settings file)
        #[arg(long)]
        segment_size: Option<usize>,
    },

    /// Print the resolved paths and column instructions for a column set
    Describe {
        #[command(flatten)]
        entities: EntitySource,

        /// Root entity id
        #[arg(long)]
        root: String,

        /// Comma-separated column keys
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
    },
}

/// Where entity structures come from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct EntitySource {
    /// Path to the schema TOML file
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Path to a TOML file of annotated entity declarations
    #[arg(short, long)]
    declarations: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.logging);

    let result = match cli.command {
        Commands::Hydrate {
            entities,
            rows,
            root,
            segment_size,
        } => cmd_hydrate(&settings, &entities, &rows, &root, segment_size),
        Commands::Describe {
            entities,
            root,
            columns,
        } => cmd_describe(&settings, &entities, &root, columns),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_hydrate(
    settings: &Settings,
    entities: &EntitySource,
    rows: &Path,
    root: &str,
    segment_size: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = load_provider(settings, entities)?;
    let source = read_rows(rows)?;
    let columns = source.columns().map(<[String]>::to_vec).unwrap_or_default();

    let plan = HydrationPlan::builder(root).columns(columns).build(&provider)?;

    let mut options = settings.hydration_options()?;
    if let Some(size) = segment_size {
        options = options.segment_size(size);
    }

    let cursor = HydrationCursor::new(plan, RecordActivator, source, options)?;
    for entity in cursor.into_entities() {
        println!("{}", entity?.to_json());
    }
    Ok(())
}

fn cmd_describe(
    settings: &Settings,
    entities: &EntitySource,
    root: &str,
    columns: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = load_provider(settings, entities)?;
    let plan = HydrationPlan::builder(root).columns(columns).build(&provider)?;

    println!("Root: {}", plan.root_entity_id());
    println!();
    println!("Paths:");
    for path in plan.paths().iter() {
        match (&path.relation, path.cardinality, path.parent_slot) {
            (Some(relation), Some(cardinality), Some(parent)) => println!(
                "  [{}] {} -> {} ({} via '{}' on slot {})",
                path.slot, path.path, path.entity_id, cardinality, relation, parent
            ),
            _ => println!("  [{}] {} -> {}", path.slot, path.path, path.entity_id),
        }
    }
    println!();
    println!("Columns:");
    for instruction in plan.instructions() {
        println!(
            "  {} {} -> slot {} .{} ({})",
            instruction.source_column,
            instruction.column_key,
            instruction.slot,
            instruction.field,
            instruction.conversion
        );
    }
    Ok(())
}

fn load_provider(
    settings: &Settings,
    entities: &EntitySource,
) -> Result<Box<dyn EntityStructureProvider>, Box<dyn std::error::Error>> {
    match (&entities.schema, &entities.declarations) {
        (Some(schema), _) => Ok(Box::new(SchemaRegistry::from_file(schema)?)),
        (None, Some(declarations)) => {
            let registry = AnnotationRegistry::from_file(declarations, Namespaces::default())?;
            let provider =
                AnnotatedStructureProvider::from_settings(registry, &settings.annotations, &settings.cache)?;
            Ok(Box::new(provider))
        }
        (None, None) => Err("either --schema or --declarations is required".into()),
    }
}

/// Read an NDJSON rows file: header line, then one row per line.
fn read_rows(path: &Path) -> Result<VecRowSource, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let header: Vec<String> = match lines.next() {
        Some(line) => serde_json::from_str(line)?,
        None => return Err(format!("'{}' has no header line", path.display()).into()),
    };

    let rows = lines
        .map(serde_json::from_str::<Row>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VecRowSource::new(rows).with_columns(header))
}
