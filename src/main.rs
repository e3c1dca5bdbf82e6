use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use unipoi::{MemoryStore, Pipeline, RunConfig, SourceTable};

/// Merge POI source datasets into the canonical, spatially-indexed dataset
#[derive(Parser, Debug)]
#[command(name = "unipoi")]
#[command(about = "Canonical POI dataset engine", long_about = None)]
struct Args {
    /// Path to a JSON fixture listing source tables (schema + rows)
    #[arg(short, long, default_value = "./data/source_tables.json")]
    fixtures: PathBuf,

    /// Datasets to consider this run; defaults to every table in the fixture
    #[arg(short, long)]
    datasets: Vec<String>,

    /// Layer receiving nearest-neighbor enrichment
    #[arg(short, long, default_value = "long_term_listings")]
    query_layer: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting unipoi v{}", env!("CARGO_PKG_VERSION"));
    info!("Fixtures: {:?}", args.fixtures);

    let tables: Vec<SourceTable> = serde_json::from_reader(File::open(&args.fixtures)?)?;
    info!("Loaded {} source tables", tables.len());

    let datasets = if args.datasets.is_empty() {
        tables.iter().map(|t| t.schema.name.clone()).collect()
    } else {
        args.datasets.clone()
    };

    let store = MemoryStore::new();
    for table in tables {
        store.register_table(table);
    }

    let config = RunConfig::new(datasets, &args.query_layer);
    let report = Pipeline::new(&store, config).run()?;

    println!("{report}");
    Ok(())
}
