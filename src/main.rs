use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlbook::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt as _;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Analyse SQL the way the notebook editor does.
#[derive(Debug, Parser)]
#[command(name = "sqlbook", version)]
struct Cli {
    /// SQL dialect (hive, presto, trino, spark, mysql, postgres, ...).
    #[arg(short, long, global = true)]
    language: Option<String>,
    /// PostgreSQL URL whose information_schema serves as the catalog.
    #[arg(long, global = true, env = "SQLBOOK_DATABASE_URL")]
    database_url: Option<String>,
    /// Catalog JSON file, used when no database URL is given.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the token stream.
    Tokens {
        /// Fail on unterminated strings and comments instead of closing them.
        #[arg(long)]
        strict: bool,
        input: Option<PathBuf>,
    },
    /// Run one worker analysis and print the CodeAnalysisResult.
    Analyze {
        #[arg(long, value_enum, default_value_t = AnalysisMode::Lint)]
        mode: AnalysisMode,
        input: Option<PathBuf>,
    },
    /// Print context-free and, with a catalog, schema warnings.
    Lint {
        #[arg(long, default_value_t = 0)]
        metastore_id: MetastoreId,
        input: Option<PathBuf>,
    },
    /// Print completion candidates at a cursor.
    Complete {
        /// Byte offset of the cursor.
        #[arg(long, conflicts_with_all = ["line", "ch"])]
        offset: Option<usize>,
        /// Zero-based editor line of the cursor.
        #[arg(long, requires = "ch")]
        line: Option<usize>,
        /// Zero-based character column of the cursor.
        #[arg(long, requires = "line")]
        ch: Option<usize>,
        input: Option<PathBuf>,
    },
    /// Print tables dropped and not re-created by the script.
    DroppedTables { input: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let language = cli.language.clone().unwrap_or_else(|| config.language.clone());
    debug!("Using dialect {language}");

    match &cli.command {
        Command::Tokens { strict, input } => {
            let sql = read_input(input.as_deref()).await?;
            let tokens = if *strict {
                Tokenizer::new(
                    TokenizeOptions::for_language(&language).with_recovery(RecoveryPolicy::Strict),
                )
                .tokenize(&sql)?
            } else {
                tokenize(&sql, &language)
            };
            print(&tokens, cli.pretty)
        }
        Command::Analyze { mode, input } => {
            let sql = read_input(input.as_deref()).await?;
            let dispatcher = Dispatcher::new(&config);
            dispatcher.init()?;
            let analysis = dispatcher.analyze_code(sql, *mode, &language).await;
            dispatcher.dispose().await;
            print(&analysis?, cli.pretty)
        }
        Command::Lint {
            metastore_id,
            input,
        } => {
            let sql = read_input(input.as_deref()).await?;
            let warnings = match catalog(&cli).await? {
                Some((metastore, catalog)) => {
                    let service = AnalysisService::new(&config, metastore, catalog);
                    service.init()?;
                    let warnings = service.lint(&sql, &language, *metastore_id).await;
                    service.dispose().await;
                    warnings?
                }
                None => {
                    info!("No catalog configured, skipping schema checks");
                    let statements = simple_parse(&tokenize(&sql, &language));
                    let lineage = find_table_reference_and_alias(&statements);
                    ContextFreeLinter::new(
                        SqlDialect::from_language(&language),
                        LintOptions::from(&config),
                    )
                    .lint(&statements, &lineage)
                }
            };
            print(&warnings, cli.pretty)
        }
        Command::Complete {
            offset,
            line,
            ch,
            input,
        } => {
            let sql = read_input(input.as_deref()).await?;
            let cursor = match (offset, line, ch) {
                (Some(offset), _, _) => Cursor::new(*offset),
                (None, Some(line), Some(ch)) => Cursor::from_position(&sql, Position::new(*line, *ch)),
                _ => Cursor::new(sql.len()),
            };
            let (metastore, catalog) = match catalog(&cli).await? {
                Some(found) => found,
                None => {
                    let empty = Arc::new(Database::new("empty"));
                    (empty.clone() as Arc<dyn Metastore>, empty)
                }
            };
            let service = AnalysisService::new(&config, metastore, catalog);
            service.init()?;
            let suggestions = service.complete(&sql, cursor, &language).await;
            service.dispose().await;
            print(&suggestions?, cli.pretty)
        }
        Command::DroppedTables { input } => {
            let sql = read_input(input.as_deref()).await?;
            print(&get_dropped_tables(&sql), cli.pretty)
        }
    }
}

/// SQL from `path`, or from stdin when no path (or `-`) is given.
async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(tokio::fs::read_to_string(path).await?),
        _ => {
            let mut sql = String::new();
            tokio::io::stdin().read_to_string(&mut sql).await?;
            Ok(sql)
        }
    }
}

/// Metastore and completion catalog from `--database-url` or `--catalog`.
async fn catalog(cli: &Cli) -> Result<Option<(Arc<dyn Metastore>, Arc<Database>)>> {
    if let Some(url) = &cli.database_url {
        let metastore = PgMetastore::connect(url).await?;
        let catalog = Arc::new(metastore.load_database("postgres").await?);
        let metastore: Arc<dyn Metastore> = Arc::new(metastore);
        return Ok(Some((metastore, catalog)));
    }
    if let Some(path) = &cli.catalog {
        let catalog = Arc::new(Database::from_json(&tokio::fs::read_to_string(path).await?)?);
        info!("Loaded catalog {} from {}", catalog.name, path.display());
        let metastore: Arc<dyn Metastore> = catalog.clone();
        return Ok(Some((metastore, catalog)));
    }
    Ok(None)
}

fn print(value: &impl Serialize, pretty: bool) -> Result {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
