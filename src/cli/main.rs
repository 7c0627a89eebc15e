use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::io::BufRead;
use std::path::PathBuf;
use subject_engine::search::{SearchConfigBuilder, SearchService, WorkDocument};

/// Documents written per commit when loading an index
const INDEX_BATCH_SIZE: usize = 1000;

#[derive(Parser)]
#[command(name = "subject-cli")]
#[command(about = "Subject engine CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get a subject
    Get {
        /// Subject key, e.g. `/subjects/person:plato` or `love`
        #[arg(value_name = "KEY")]
        key: String,

        #[arg(short, long)]
        details: bool,

        #[arg(short, long)]
        offset: Option<u64>,

        #[arg(short, long)]
        limit: Option<u64>,

        /// `editions` or `new`
        #[arg(short, long)]
        sort: Option<String>,

        /// A year (`1950`) or a range (`1950-1960`)
        #[arg(short, long)]
        published_in: Option<String>,

        #[arg(long)]
        has_fulltext: bool,
    },

    /// Check server health
    Health,

    /// Load work documents (one JSON object per line) into an embedded index
    Index {
        #[arg(value_name = "JSONL")]
        input: PathBuf,

        #[arg(short, long)]
        index_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Get {
            key,
            details,
            offset,
            limit,
            sort,
            published_in,
            has_fulltext,
        } => {
            let path = key.trim_start_matches("/subjects/");
            let url = format!("{}/subjects/{}.json", cli.endpoint, path);

            let mut query: Vec<(&str, String)> = Vec::new();
            if details {
                query.push(("details", "true".to_string()));
            }
            if let Some(offset) = offset {
                query.push(("offset", offset.to_string()));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            if let Some(sort) = sort {
                query.push(("sort", sort));
            }
            if let Some(published_in) = published_in {
                query.push(("published_in", published_in));
            }
            if has_fulltext {
                query.push(("has_fulltext", "true".to_string()));
            }

            let response = client
                .get(&url)
                .query(&query)
                .send()
                .await
                .with_context(|| format!("Request to {} failed", url))?;
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Index { input, index_path } => {
            let config = SearchConfigBuilder::new()
                .index_path(index_path)
                .realtime_indexing(false)
                .build();
            let service = SearchService::new(config).await?;

            let file = std::fs::File::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let reader = std::io::BufReader::new(file);
            let mut batch = Vec::with_capacity(INDEX_BATCH_SIZE);
            let mut total = 0;

            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }

                let work: WorkDocument = serde_json::from_str(&line)
                    .with_context(|| format!("Invalid work document on line {}", line_no + 1))?;
                batch.push(work);

                if batch.len() == INDEX_BATCH_SIZE {
                    total += service.index_works(&batch).await?;
                    batch.clear();
                }
            }

            if !batch.is_empty() {
                total += service.index_works(&batch).await?;
            }

            let stats = service.get_stats().await?;
            println!(
                "Indexed {} works ({} documents in index, {} segments)",
                total, stats.total_documents, stats.num_segments
            );
        }
    }

    Ok(())
}
