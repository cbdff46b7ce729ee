use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{error, info};

use metaquery::environment::{log_dir_from_env, Backend, Settings};
use metaquery::extract::filter_from_completion;
use metaquery::llm::{CandleGenerator, ComputeDevice, LLMClient, LLMParams, TextGenerator};
use metaquery::prompt::filter_extraction_prompt;
use metaquery::vector::{define_collection, MediaKind, StorePredicates};
use metaquery::{CompletionGenerator, FilterExtractor, FilterOutcome, GenerationError};

#[derive(Parser)]
#[clap(
    name = "metaquery",
    about = "Extract structured file filters from free-text queries"
)]
struct Cli {
    /// Generation backend: ollama, openai or local
    #[clap(long, env = "METAQUERY_BACKEND")]
    backend: Option<Backend>,

    /// Model name for hosted backends
    #[clap(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// Maximum number of tokens the model may generate
    #[clap(long, env = "MAX_NEW_TOKENS")]
    max_new_tokens: Option<u32>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the filter for a query and print it as JSON
    Extract {
        /// The user's query
        #[clap(required = true)]
        query: String,
    },

    /// Print the prompt that would be sent to the model
    Prompt {
        #[clap(required = true)]
        query: String,
    },

    /// Parse a saved raw completion (file or stdin) into a filter
    Parse {
        /// File holding the completion; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Extract the filter for a query and print the vector-store predicates it implies
    Predicates {
        #[clap(required = true)]
        query: String,
    },

    /// Create the image and video collections in the vector store
    DefineCollections,
}

async fn build_generator(settings: &Settings) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match settings.backend {
        Backend::Ollama => {
            info!("Connecting to Ollama at {}:{}", settings.ollama_host, settings.ollama_port);
            Arc::new(LLMParams {
                llm_client: LLMClient::ollama(&settings.ollama_host, settings.ollama_port),
                model: settings.model.clone(),
                temperature: settings.temperature,
            })
        }
        Backend::OpenAI => {
            let api_key = settings
                .openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY environment variable required for the openai backend")?;
            Arc::new(LLMParams {
                llm_client: LLMClient::openai(api_key),
                model: settings.model.clone(),
                temperature: settings.temperature,
            })
        }
        Backend::Local => {
            settings.local_model.ensure_models_exist().await?;
            let device = ComputeDevice::select(settings.local_use_gpu);
            let config = settings.local_model.clone();
            let generator =
                tokio::task::spawn_blocking(move || CandleGenerator::load(&config, device))
                    .await??;
            Arc::new(generator)
        }
    };
    Ok(generator)
}

async fn run_extraction(settings: &Settings, query: &str) -> Result<FilterOutcome> {
    let generator = build_generator(settings).await?;
    let completion = CompletionGenerator::new(generator).with_max_new_tokens(settings.max_new_tokens);
    let extractor = FilterExtractor::new(completion);

    // The pipeline has no deadline of its own; bound it here.
    let limit = settings.generation_timeout_secs;
    match timeout(Duration::from_secs(limit), extractor.extract(query)).await {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(GenerationError::Timeout(limit).into()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let _log_guard = metaquery::logging::configure_logging(&log_dir_from_env());
    let mut settings = Settings::from_env();

    if let Some(backend) = args.backend {
        settings.backend = backend;
    }
    if let Some(model) = args.model {
        settings.model = model;
    }
    if let Some(max_new_tokens) = args.max_new_tokens {
        settings.max_new_tokens = max_new_tokens;
    }

    match args.command {
        Commands::Extract { query } => {
            let outcome = run_extraction(&settings, &query).await.map_err(|e| {
                error!("Extraction failed: {:#}", e);
                e
            })?;
            print_json(&outcome)?;
        }
        Commands::Prompt { query } => {
            print!("{}", filter_extraction_prompt(&query));
        }
        Commands::Parse { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            print_json(&filter_from_completion(&raw))?;
        }
        Commands::Predicates { query } => {
            let outcome = run_extraction(&settings, &query).await?;
            print_json(&StorePredicates::from_outcome(&outcome))?;
        }
        Commands::DefineCollections => {
            let client = settings.vector.connect()?;
            for kind in MediaKind::ALL {
                let created = define_collection(&client, kind, settings.vector.dimensions).await?;
                if created {
                    println!("created collection {}", kind);
                } else {
                    println!("collection {} already exists", kind);
                }
            }
        }
    }

    Ok(())
}

