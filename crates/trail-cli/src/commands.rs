use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use trail_lineage::LineageResolver;
use trail_server::{ServerConfig, TrailServer};
use trail_store::{LedgerStore, SqliteLedgerStore};
use trail_types::{LineageNode, RecordDraft};

use crate::cli::{
    Cli, Command, GraphArgs, LogArgs, OutputFormat, RecordArgs, ServeArgs,
};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let db = db_path(cli.db);
    match cli.command {
        Command::Serve(args) => cmd_serve(db, args).await,
        Command::Record(args) => cmd_record(db, args).await,
        Command::Log(args) => cmd_log(db, &cli.format, args).await,
        Command::Graph(args) => cmd_graph(db, &cli.format, args).await,
        Command::Datasets(_) => cmd_datasets(db, &cli.format).await,
        Command::Pipeline(_) => cmd_pipeline(db).await,
    }
}

fn db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from("trail.db"))
}

async fn open_store(db: &PathBuf) -> anyhow::Result<Arc<SqliteLedgerStore>> {
    let store = SqliteLedgerStore::open(db)
        .await
        .with_context(|| format!("opening ledger database {}", db.display()))?;
    Ok(Arc::new(store))
}

async fn cmd_serve(db: PathBuf, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig { db_path: db, ..ServerConfig::default() },
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind.parse().context("invalid --bind address")?;
    }
    TrailServer::new(config).serve().await?;
    Ok(())
}

async fn cmd_record(db: PathBuf, args: RecordArgs) -> anyhow::Result<()> {
    let store = open_store(&db).await?;
    let mut draft = RecordDraft::new(args.dataset_id, args.operation)?;
    if let Some(source) = args.source {
        draft = draft.with_source(source);
    }
    if let Some(raw) = args.metadata {
        let metadata = serde_json::from_str(&raw).context("--metadata is not valid JSON")?;
        draft = draft.with_metadata(metadata);
    }
    let record = store.append(draft).await?;
    println!(
        "{} Recorded {} — {} (record {})",
        "✓".green().bold(),
        record.dataset_id.yellow(),
        record.operation,
        record.id
    );
    Ok(())
}

async fn cmd_log(db: PathBuf, format: &OutputFormat, args: LogArgs) -> anyhow::Result<()> {
    let store = open_store(&db).await?;
    let resolver = LineageResolver::new(store);
    let records = resolver.flat_lineage(&args.dataset_id).await?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records for dataset {}.", args.dataset_id.yellow());
        return Ok(());
    }
    println!(
        "Lineage for {} ({} records)",
        args.dataset_id.yellow().bold(),
        records.len()
    );
    for record in &records {
        println!(
            "  [{}] {} @ {}",
            record.id,
            record.operation.bold(),
            record.timestamp.to_rfc3339().dimmed()
        );
        if let Some(source) = &record.source_dataset_id {
            println!("      source: {}", source.yellow());
        }
        if let Some(metadata) = &record.metadata {
            println!("      metadata: {metadata}");
        }
    }
    Ok(())
}

async fn cmd_graph(db: PathBuf, format: &OutputFormat, args: GraphArgs) -> anyhow::Result<()> {
    let store = open_store(&db).await?;
    let resolver = LineageResolver::new(store);
    let graph = resolver.lineage_graph(&args.dataset_id).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
        OutputFormat::Text => print_graph(&graph, 0),
    }
    Ok(())
}

fn print_graph(node: &LineageNode, depth: usize) {
    let pad = "  ".repeat(depth);
    if node.cycle {
        println!("{pad}{} {}", node.dataset_id.yellow().bold(), "(cycle)".red());
        return;
    }
    println!("{pad}{}", node.dataset_id.yellow().bold());
    for op in &node.operations {
        println!(
            "{pad}  • {} @ {}",
            op.operation,
            op.timestamp.to_rfc3339().dimmed()
        );
    }
    for source in &node.sources {
        print_graph(source, depth + 1);
    }
}

async fn cmd_datasets(db: PathBuf, format: &OutputFormat) -> anyhow::Result<()> {
    let store = open_store(&db).await?;
    let ids = store.list_dataset_ids().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ids)?),
        OutputFormat::Text => {
            if ids.is_empty() {
                println!("No datasets recorded.");
            }
            for id in &ids {
                println!("{id}");
            }
        }
    }
    Ok(())
}

async fn cmd_pipeline(db: PathBuf) -> anyhow::Result<()> {
    let store = open_store(&db).await?;
    let final_id = record_pipeline(store.as_ref()).await?;

    println!();
    println!("Lineage graph for {}:", final_id.yellow().bold());
    let resolver = LineageResolver::new(store);
    print_graph(&resolver.lineage_graph(&final_id).await?, 0);
    Ok(())
}

/// The demo ETL chain: load → clean → filter → aggregate → enrich, each step
/// recorded against the previous one. Returns the final dataset id.
async fn record_pipeline(store: &dyn LedgerStore) -> anyhow::Result<String> {
    let steps = [
        RecordDraft::new("raw_dataset_001", "load_from_source")?.with_metadata(json!({
            "source": "external_api",
            "record_count": 100,
            "columns": ["customer_id", "age", "purchase_amount", "region"],
        })),
        RecordDraft::new("clean_dataset_001", "clean_data")?
            .with_source("raw_dataset_001")
            .with_metadata(json!({
                "operations": ["remove_duplicates", "fill_missing_values"],
                "input_records": 100,
                "output_records": 100,
            })),
        RecordDraft::new("filtered_dataset_001", "filter_by_age")?
            .with_source("clean_dataset_001")
            .with_metadata(json!({
                "filter_condition": "age >= 30",
                "input_records": 100,
                "output_records": 83,
            })),
        RecordDraft::new("aggregated_dataset_001", "aggregate_by_region")?
            .with_source("filtered_dataset_001")
            .with_metadata(json!({
                "group_by": "region",
                "aggregations": {"purchase_amount": ["sum", "mean", "count"], "age": "mean"},
                "output_records": 4,
            })),
        RecordDraft::new("final_dataset_001", "enrich_with_calculations")?
            .with_source("aggregated_dataset_001")
            .with_metadata(json!({
                "new_columns": ["purchase_per_customer"],
                "calculations": ["total_purchase / customer_count"],
            })),
    ];

    for draft in steps {
        let record = store.append(draft).await?;
        println!(
            "{} Recorded: {} — {}",
            "✓".green(),
            record.dataset_id.yellow(),
            record.operation
        );
    }
    Ok("final_dataset_001".to_owned())
}
