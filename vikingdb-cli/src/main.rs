use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vikingdb::config::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_REGION};
use vikingdb::model::{
    CollectionLocator, EmbeddingData, EmbeddingModelOpt, EmbeddingRequest, Fields,
    FetchDataInCollectionRequest, FullModalData, IndexLocator, RerankRequest, SearchBase,
    SearchByKeywordsRequest, SearchByMultiModalRequest, SearchByRandomRequest, UpsertDataRequest,
};
use vikingdb::{Auth, Client, Config, RequestOptions};

#[derive(Parser)]
#[command(name = "vikingdb", version, about = "Command-line client for the VikingDB data API")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, env = "VIKINGDB_HOST", default_value = DEFAULT_ENDPOINT)]
    host: String,
    #[arg(long, env = "VIKINGDB_REGION", default_value = DEFAULT_REGION)]
    region: String,
    #[arg(long, env = "VIKINGDB_AK")]
    ak: Option<String>,
    #[arg(long, env = "VIKINGDB_SK", hide_env_values = true)]
    sk: Option<String>,
    /// Takes precedence over --ak/--sk.
    #[arg(long, env = "VIKINGDB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "VIKINGDB_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
    #[arg(long, env = "VIKINGDB_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: i32,
    /// Sent as X-Tt-Logid.
    #[arg(long)]
    request_id: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a one-document random search to check connectivity and credentials
    Ping {
        #[arg(long, env = "VIKINGDB_COLLECTION")]
        collection: String,
        #[arg(long, env = "VIKINGDB_INDEX")]
        index: String,
    },
    /// Upsert documents given as a JSON array of objects
    Upsert {
        #[arg(long, env = "VIKINGDB_COLLECTION")]
        collection: String,
        #[arg(long)]
        data: String,
        #[arg(long)]
        ttl: Option<i32>,
    },
    /// Fetch documents by primary key, given as a JSON array
    Fetch {
        #[arg(long, env = "VIKINGDB_COLLECTION")]
        collection: String,
        #[arg(long)]
        ids: String,
    },
    /// Keyword search over an index
    SearchKeywords {
        #[arg(long, env = "VIKINGDB_COLLECTION")]
        collection: String,
        #[arg(long, env = "VIKINGDB_INDEX")]
        index: String,
        #[arg(long, value_delimiter = ',', required = true)]
        keywords: Vec<String>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Multimodal search with a text query
    SearchText {
        #[arg(long, env = "VIKINGDB_COLLECTION")]
        collection: String,
        #[arg(long, env = "VIKINGDB_INDEX")]
        index: String,
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Dense embeddings for one or more texts
    Embed {
        #[arg(long)]
        model: String,
        #[arg(long)]
        model_version: Option<String>,
        #[arg(long = "text", required = true)]
        texts: Vec<String>,
    },
    /// Rerank documents against a query
    Rerank {
        #[arg(long)]
        model: String,
        #[arg(long)]
        model_version: String,
        #[arg(long)]
        query: String,
        #[arg(long = "doc", required = true)]
        docs: Vec<String>,
    },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn resolve_auth(cli: &Cli) -> CliResult<Auth> {
    if let Some(key) = cli.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(Auth::api_key(key));
    }
    match (cli.ak.as_deref(), cli.sk.as_deref()) {
        (Some(ak), Some(sk)) => Ok(Auth::iam(ak, sk)),
        _ => Err("no credentials: set --api-key (VIKINGDB_API_KEY) or --ak/--sk \
                  (VIKINGDB_AK/VIKINGDB_SK)"
            .into()),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(flag: &str, raw: &str) -> CliResult<T> {
    serde_json::from_str(raw).map_err(|e| format!("--{flag} is not valid JSON: {e}").into())
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> CliResult<()> {
    let auth = resolve_auth(&cli)?;
    let config = Config::new(cli.host.clone())
        .with_region(cli.region.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs))
        .with_max_retries(cli.max_retries);
    tracing::debug!(host = %cli.host, region = %cli.region, "resolved configuration");
    let client = Client::new(auth, config)?;

    let mut options = RequestOptions::new();
    if let Some(request_id) = cli.request_id.clone() {
        options = options.request_id(request_id);
    }

    match cli.command {
        Command::Ping { collection, index } => {
            let request = SearchByRandomRequest {
                search: SearchBase::with_limit(1),
            };
            let response = client
                .index(IndexLocator::new(collection, index))
                .search_by_random(&request, &options)
                .await?;
            let hits = response.result.map(|r| r.data.len()).unwrap_or(0);
            print_json(&json!({"request_id": response.request_id, "hits": hits}))
        }
        Command::Upsert {
            collection,
            data,
            ttl,
        } => {
            let docs: Vec<Fields> = parse_json("data", &data)?;
            let mut request = UpsertDataRequest::new(docs);
            request.base.ttl = ttl;
            let response = client
                .collection(CollectionLocator::new(collection))
                .upsert(&request, &options)
                .await?;
            print_json(&response)
        }
        Command::Fetch { collection, ids } => {
            let ids: Vec<Value> = parse_json("ids", &ids)?;
            let response = client
                .collection(CollectionLocator::new(collection))
                .fetch(&FetchDataInCollectionRequest { ids }, &options)
                .await?;
            print_json(&response)
        }
        Command::SearchKeywords {
            collection,
            index,
            keywords,
            limit,
        } => {
            let request = SearchByKeywordsRequest {
                search: SearchBase::with_limit(limit),
                keywords,
                ..Default::default()
            };
            let response = client
                .index(IndexLocator::new(collection, index))
                .search_by_keywords(&request, &options)
                .await?;
            print_json(&response)
        }
        Command::SearchText {
            collection,
            index,
            text,
            limit,
        } => {
            let request = SearchByMultiModalRequest {
                search: SearchBase::with_limit(limit),
                text: Some(text),
                need_instruction: Some(false),
                ..Default::default()
            };
            let response = client
                .index(IndexLocator::new(collection, index))
                .search_by_multi_modal(&request, &options)
                .await?;
            print_json(&response)
        }
        Command::Embed {
            model,
            model_version,
            texts,
        } => {
            let mut dense = EmbeddingModelOpt::new(model);
            dense.version = model_version;
            let request = EmbeddingRequest {
                dense_model: Some(dense),
                data: texts.into_iter().map(EmbeddingData::text).collect(),
                ..Default::default()
            };
            let response = client.embedding().embedding(&request, &options).await?;
            print_json(&response)
        }
        Command::Rerank {
            model,
            model_version,
            query,
            docs,
        } => {
            let request = RerankRequest {
                model_name: model,
                model_version,
                data: docs
                    .into_iter()
                    .map(|doc| vec![FullModalData::text(doc)])
                    .collect(),
                query: vec![FullModalData::text(query)],
                ..Default::default()
            };
            let response = client.rerank().rerank(&request, &options).await?;
            print_json(&response)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
