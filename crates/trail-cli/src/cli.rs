use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "trail",
    about = "datatrail — record and query data-transformation lineage",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the ledger database [default: trail.db].
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the lineage HTTP API
    Serve(ServeArgs),
    /// Record one transformation event
    Record(RecordArgs),
    /// Show the flat event list for a dataset
    Log(LogArgs),
    /// Show the recursive lineage graph for a dataset
    Graph(GraphArgs),
    /// List every dataset identifier ever recorded
    Datasets(DatasetsArgs),
    /// Run the demo ETL pipeline and show its lineage
    Pipeline(PipelineArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind, overriding the config file.
    #[arg(long)]
    pub bind: Option<String>,
    /// TOML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct RecordArgs {
    pub dataset_id: String,
    pub operation: String,
    /// Dataset this event consumed.
    #[arg(long)]
    pub source: Option<String>,
    /// Opaque metadata, as a JSON document.
    #[arg(long)]
    pub metadata: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    pub dataset_id: String,
}

#[derive(Args)]
pub struct GraphArgs {
    pub dataset_id: String,
}

#[derive(Args)]
pub struct DatasetsArgs {}

#[derive(Args)]
pub struct PipelineArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record() {
        let cli = Cli::try_parse_from(["trail", "record", "clean", "dedupe"]).unwrap();
        if let Command::Record(args) = cli.command {
            assert_eq!(args.dataset_id, "clean");
            assert_eq!(args.operation, "dedupe");
            assert!(args.source.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_record_with_source_and_metadata() {
        let cli = Cli::try_parse_from([
            "trail", "record", "clean", "dedupe",
            "--source", "raw",
            "--metadata", r#"{"dropped": 3}"#,
        ])
        .unwrap();
        if let Command::Record(args) = cli.command {
            assert_eq!(args.source, Some("raw".into()));
            assert_eq!(args.metadata, Some(r#"{"dropped": 3}"#.into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_log() {
        let cli = Cli::try_parse_from(["trail", "log", "final"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert_eq!(args.dataset_id, "final");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_graph_with_json_format() {
        let cli = Cli::try_parse_from(["trail", "--format", "json", "graph", "final"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Command::Graph(_)));
    }

    #[test]
    fn parse_datasets() {
        let cli = Cli::try_parse_from(["trail", "datasets"]).unwrap();
        assert!(matches!(cli.command, Command::Datasets(_)));
    }

    #[test]
    fn parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["trail", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_db_flag() {
        let cli = Cli::try_parse_from(["trail", "--db", "/tmp/x.db", "datasets"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn parse_pipeline() {
        let cli = Cli::try_parse_from(["trail", "pipeline"]).unwrap();
        assert!(matches!(cli.command, Command::Pipeline(_)));
    }

    #[test]
    fn db_flag_is_optional() {
        let cli = Cli::try_parse_from(["trail", "datasets"]).unwrap();
        assert!(cli.db.is_none());
    }
}
