use anyhow::Context;
use hybrid_chatbot::config::{AppConfig, ConfigLoader};
use hybrid_chatbot::encyclopedia::create_encyclopedia_client;
use hybrid_chatbot::error::AppError;
use hybrid_chatbot::models::intent::IntentStore;
use hybrid_chatbot::observability::init_tracing;
use hybrid_chatbot::services::{ChatSession, Responder, SessionEnd};
use hybrid_chatbot::storage::{load_intents, resolve_intents_path};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        if e.downcast_ref::<AppError>().is_some_and(AppError::is_fatal) {
            eprintln!("Please ensure:");
            eprintln!("1. Your JSON file exists and is valid");
            eprintln!("2. You have internet connection for Wikipedia");
            eprintln!("3. chatbot.toml / CHATBOT_* settings are valid");
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ConfigLoader::load().map_err(AppError::from)?;
    let guard = init_tracing(&config.logging);
    info!("Configuration loaded successfully");

    ConfigLoader::validate(&config)
        .map_err(|e| AppError::Config(e.to_string()))
        .context("invalid configuration")?;

    let store = load_store(&config)?;
    info!(
        intents = store.len(),
        patterns = store.pattern_count(),
        "Intent store initialized"
    );

    let encyclopedia = create_encyclopedia_client(&config.encyclopedia)?;

    let mut responder = Responder::new(Arc::new(store), encyclopedia, &config.responder);
    if config.encyclopedia.enabled {
        responder = responder.with_lookup_timeout(config.encyclopedia.lookup_timeout());
    }
    let responder = Arc::new(responder);
    info!(threshold = responder.threshold(), "Responder initialized");

    let mut session = ChatSession::new(responder.clone());
    let summary = session
        .run(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            },
        )
        .await?;

    responder.metrics().log_summary();

    if summary.end == SessionEnd::Interrupted {
        // stdin 读取线程仍阻塞，直接退出而不是等待运行时关闭
        drop(guard);
        std::process::exit(0);
    }

    Ok(())
}

/// 加载意图库；找不到文件时提示用户输入路径
fn load_store(config: &AppConfig) -> anyhow::Result<IntentStore> {
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);

    let path = match resolve_intents_path(explicit, &config.intents) {
        Some(path) => path,
        None => prompt_for_path()?,
    };

    load_intents(&path)
        .with_context(|| format!("failed to load intents from {}", path.display()))
}

fn prompt_for_path() -> anyhow::Result<PathBuf> {
    print!("Please enter full path to intents JSON file: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}
