//! mtgjudge - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;

use mtgjudge::{
    acquire::DocumentAcquirer,
    chunking::{self, ExtractedChunks},
    cli::{Args, Commands, Config, Verbosity},
    embedding::{Embedder, EmbeddingEngine},
    indexer::Indexer,
    llm::InferenceClient,
    rag::{format_rule, JudgePipeline, RetrievalEngine},
    repl::{DisplayManager, InputHandler, ReplSession},
    telemetry,
    vector_db::{QdrantRuleStore, RuleStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    telemetry::init(verbosity);

    let mut config = Config::load(args.config.clone())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    match &args.command {
        Commands::Fetch => run_fetch(&config).await,
        Commands::Index { input } => {
            let input = input.clone().unwrap_or_else(|| config.rules_json());
            run_index(&config, &input, verbosity).await?;
        }
        Commands::Ask { question } => run_ask(&config, question, verbosity).await?,
        Commands::Search { question } => run_search(&config, question).await?,
        Commands::Rule { number } => run_rule(&config, number).await?,
        Commands::Start => run_repl(&config, verbosity).await?,
        Commands::Config { init: false } => show_config(&config, verbosity),
        Commands::Config { init: true } => init_config(&args, &config)?,
    }

    Ok(())
}

/// Download the latest document and write both chunk files; errors are reported, not returned
async fn run_fetch(config: &Config) {
    let display = DisplayManager::new(false);
    match fetch_and_extract(config).await {
        Ok(chunks) => {
            display.show_success(&format!(
                "Extracted {} rules -> {}",
                chunks.rules.len(),
                config.rules_json().display()
            ));
            display.show_success(&format!(
                "Extracted {} glossary entries -> {}",
                chunks.glossary.len(),
                config.glossary_json().display()
            ));
        }
        Err(e) => display.show_error(&format!("{:#}", e)),
    }
}

async fn fetch_and_extract(config: &Config) -> Result<ExtractedChunks> {
    let acquirer = DocumentAcquirer::new(config.source.rules_url.clone());
    let document = acquirer.acquire(&config.download_dir()).await?;
    if document.downloaded {
        println!("Downloaded {}", document.file_name.bold());
    } else {
        println!("Using cached {}", document.file_name.bold());
    }

    let text = chunking::read_document(&document.path)?;
    let chunks = chunking::extract_all(&text, &document.source_doc())?;

    chunking::write_chunks(&config.rules_json(), &chunks.rules)?;
    chunking::write_chunks(&config.glossary_json(), &chunks.glossary)?;
    Ok(chunks)
}

fn load_embedder(config: &Config) -> Result<EmbeddingEngine> {
    tracing::info!(model = %config.embedding.model_id, "loading embedding model");
    let engine = EmbeddingEngine::from_hub(&config.embedding.model_id, config.embedding.max_seq_len)?;
    Ok(engine)
}

fn connect_store(config: &Config) -> Result<QdrantRuleStore> {
    let store = QdrantRuleStore::new(
        &config.qdrant.url,
        config.qdrant_api_key(),
        config.qdrant.collection.clone(),
    )?;
    Ok(store)
}

async fn run_index(config: &Config, input: &Path, verbosity: Verbosity) -> Result<()> {
    let chunks = chunking::read_rule_chunks(input)
        .with_context(|| format!("Failed to load rule chunks from {}", input.display()))?;
    println!("Loaded {} rule chunks", chunks.len());

    let embedder = load_embedder(config)?;
    let store = connect_store(config)?;

    let report = Indexer::new(&embedder, &store, config.embedding.dimension)
        .with_batch_size(config.embedding.batch_size)
        .with_strategy(config.retrieval.id_strategy)
        .with_progress(verbosity.show_progress())
        .run(&chunks)
        .await?;

    let display = DisplayManager::new(false);
    display.show_success(&format!(
        "Indexed {} rules into '{}'",
        report.stored(),
        config.qdrant.collection
    ));
    if report.collisions > 0 {
        println!(
            "{} {} chunk(s) shared an id with an earlier chunk and were overwritten",
            "⚠".yellow(),
            report.collisions
        );
    }
    Ok(())
}

fn inference_client(config: &Config) -> Result<InferenceClient> {
    let client = InferenceClient::from_env(
        &config.llm.api_base,
        &config.llm.model,
        &config.llm.token_env,
        config.generation_params(),
    )?;
    Ok(client)
}

async fn run_ask(config: &Config, question: &str, verbosity: Verbosity) -> Result<()> {
    let generator = inference_client(config)?;
    let embedder = load_embedder(config)?;
    let store = connect_store(config)?;

    let retrieval = RetrievalEngine::with_params(&embedder, &store, config.search_params());
    let pipeline = JudgePipeline::new(retrieval, &generator);
    let answer = pipeline.answer_question(question).await?;

    DisplayManager::new(verbosity.show_rules()).show_answer(&answer.rules, &answer.answer);
    Ok(())
}

async fn run_search(config: &Config, question: &str) -> Result<()> {
    let embedder = load_embedder(config)?;
    let store = connect_store(config)?;

    let retrieval = RetrievalEngine::with_params(&embedder, &store, config.search_params());
    let rules = retrieval.search_with_expansion(question).await?;
    DisplayManager::new(true).show_rules(&rules);
    Ok(())
}

async fn run_rule(config: &Config, number: &str) -> Result<()> {
    let store = connect_store(config)?;
    let display = DisplayManager::new(false);

    match store.find_rule(number.trim()).await? {
        Some(found) => {
            println!("{}", format_rule(&found.payload));
            println!("{}", format!("id: {}", found.id).dimmed());
        }
        None => display.show_rule_not_found(number),
    }
    Ok(())
}

async fn run_repl(config: &Config, verbosity: Verbosity) -> Result<()> {
    let generator = inference_client(config)?;
    let embedder = load_embedder(config)?;
    let store = connect_store(config)?;

    let stored = store.count().await?;
    if stored == 0 {
        println!(
            "{} Collection '{}' is empty; run {} first",
            "⚠".yellow(),
            config.qdrant.collection,
            "mtgjudge index".green()
        );
    }
    tracing::debug!(dimension = embedder.dimension(), points = stored, "query service ready");

    let retrieval = RetrievalEngine::with_params(&embedder, &store, config.search_params());
    let pipeline = JudgePipeline::new(retrieval, &generator);

    let input = match InputHandler::default_history_path() {
        Some(path) => InputHandler::with_history(path)?,
        None => InputHandler::new()?,
    };
    let mut session = ReplSession::new(input, DisplayManager::new(verbosity.show_rules()));
    session.display().show_banner(
        env!("CARGO_PKG_VERSION"),
        &config.llm.model,
        &config.qdrant.collection,
    );

    let answered = session.run(&pipeline).await?;
    tracing::info!(answered, "session finished");
    session.display().show_goodbye();
    Ok(())
}

fn init_config(args: &Args, config: &Config) -> Result<()> {
    let path = args
        .config
        .clone()
        .or_else(Config::default_path)
        .context("No home directory; pass --config <PATH>")?;
    config.init_file(&path)?;
    DisplayManager::new(false).show_success(&format!("Wrote {}", path.display()));
    Ok(())
}

fn show_config(config: &Config, verbosity: Verbosity) {
    let source = Config::default_path()
        .filter(|path| path.exists())
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    println!("\n{}", "mtgjudge Configuration".bold().cyan());
    println!("{}\n", format!("  (from {})", source).dimmed());

    println!("Source:");
    println!("  Rules page:     {}", config.source.rules_url);
    println!("  Download dir:   {}", config.download_dir().display());
    println!("  Output dir:     {}", config.output_dir().display());
    println!();

    println!("Qdrant:");
    println!("  URL:            {}", config.qdrant.url);
    println!("  Collection:     {}", config.qdrant.collection);
    println!(
        "  API key:        {}",
        if config.qdrant_api_key().is_some() { "set" } else { "none" }
    );
    println!();

    println!("Embedding:");
    println!("  Model:          {}", config.embedding.model_id);
    println!("  Dimension:      {}", config.embedding.dimension);
    println!("  Max tokens:     {}", config.embedding.max_seq_len);
    println!("  Batch size:     {}", config.embedding.batch_size);
    println!();

    println!("LLM:");
    println!("  Model:          {}/{}", config.llm.api_base, config.llm.model);
    println!("  Token env:      {}", config.llm.token_env);
    println!("  Max new tokens: {}", config.llm.max_new_tokens);
    println!("  Temperature:    {}", config.llm.temperature);
    println!();

    println!("Retrieval:");
    println!("  Top K:          {}", config.retrieval.top_k);
    println!("  Expansion:      {}", config.retrieval.expansion_limit);
    println!("  Point ids:      {:?}", config.retrieval.id_strategy);
    println!("  Verbosity:      {}", verbosity.as_str());
    println!();
}
