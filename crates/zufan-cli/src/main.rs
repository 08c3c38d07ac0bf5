use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{paths, Config};
use chat_store::{
    ChatStreamer, ConversationStore, FileStateStorage, SendOutcome, SessionBackend, StoreError,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures_util::StreamExt;
use rag_client::{ChatRequest, RagClient, TextStream};
use session_client::SessionClient;

#[derive(Parser)]
#[command(name = "zufan")]
#[command(about = "Zufan legal-document chat client")]
#[command(version)]
struct Cli {
    /// RAG backend base URL (overrides config)
    #[arg(long)]
    api_base: Option<String>,

    /// Session service base URL (overrides config)
    #[arg(long)]
    session_base: Option<String>,

    /// Authenticated user id; omit to run as guest
    #[arg(long)]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat
    Chat,
    /// Send a single message in the active conversation
    Send {
        /// Message content
        message: String,
    },
    /// List conversations
    Sessions,
    /// List indexed documents
    Documents,
    /// Upload a document to the knowledge base
    Upload {
        /// Path of the file to upload
        file: PathBuf,
    },
    /// Show vector store statistics
    VectorStats,
    /// Run a test search against the vector store
    Search {
        /// Search query
        query: String,
        /// Number of results
        #[arg(short, default_value = "5")]
        k: usize,
    },
    /// Show recent audit log entries
    Audit {
        #[arg(long, default_value = "50")]
        limit: usize,
    },
}

/// Streamer that echoes fragments to stdout as they arrive, so the reply
/// renders incrementally like the web client.
struct EchoStreamer {
    inner: RagClient,
}

#[async_trait]
impl ChatStreamer for EchoStreamer {
    async fn chat_stream(&self, request: ChatRequest) -> rag_client::Result<TextStream> {
        let stream = RagClient::chat_stream(&self.inner, &request).await?;
        Ok(Box::pin(stream.map(|item| {
            if let Ok(fragment) = &item {
                print!("{fragment}");
                let _ = io::stdout().flush();
            }
            item
        })))
    }
}

fn load_config(cli: &Cli) -> Config {
    let mut config = Config::load();
    if let Some(api_base) = &cli.api_base {
        config.api_base = api_base.clone();
    }
    if let Some(session_base) = &cli.session_base {
        config.session_base = session_base.clone();
    }
    if let Some(user_id) = &cli.user_id {
        config.user_id = Some(user_id.clone());
    }
    config
}

fn build_store(config: &Config) -> ConversationStore<FileStateStorage> {
    let storage = FileStateStorage::new(paths::state_dir());
    let backend = match &config.user_id {
        Some(user_id) => {
            SessionBackend::authenticated(user_id.clone(), Arc::new(SessionClient::new(config)))
        }
        None => SessionBackend::guest(),
    };
    ConversationStore::new(storage, backend)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli);
    let rag = RagClient::new(&config);

    match cli.command {
        Commands::Chat => run_interactive_chat(&config, rag).await,
        Commands::Send { message } => send_once(&config, rag, &message).await,
        Commands::Sessions => list_sessions(&config).await,
        Commands::Documents => {
            let documents = rag.list_documents().await?;
            for doc in documents {
                println!(
                    "{}  {} chunks, {} pages, {} chars",
                    doc.filename.bold(),
                    doc.chunks,
                    doc.page_count,
                    doc.total_chars
                );
            }
            Ok(())
        }
        Commands::Upload { file } => {
            let result = rag.upload_document(&file).await?;
            println!("{} {result}", "uploaded:".green());
            Ok(())
        }
        Commands::VectorStats => {
            let stats = rag.vector_stats().await?;
            println!("vectors: {}", stats.total_vectors);
            println!("index size: {}", stats.index_size);
            println!("model: {}", stats.model_info);
            Ok(())
        }
        Commands::Search { query, k } => {
            let results = rag.vector_search(&query, k).await?;
            for (i, result) in results.iter().enumerate() {
                println!("{} {:.3}  {}", format!("#{}", i + 1).dimmed(), result.score, result.content);
            }
            Ok(())
        }
        Commands::Audit { limit } => {
            let logs = rag.audit_logs(limit).await?;
            for entry in logs {
                println!("{entry}");
            }
            Ok(())
        }
    }
}

async fn send_once(config: &Config, rag: RagClient, message: &str) -> anyhow::Result<()> {
    let store = build_store(config);
    store.load().await?;
    let streamer = EchoStreamer { inner: rag };

    match store.send_message(message, &streamer).await {
        Ok(SendOutcome::Completed { .. }) => {
            println!();
            Ok(())
        }
        Ok(SendOutcome::Failed { error }) => {
            println!("\n{}", chat_core::text::REPLY_ERROR.red());
            log::warn!("reply failed: {error}");
            Ok(())
        }
        Err(StoreError::GuestLimitReached) => {
            println!("{}", StoreError::GuestLimitReached.to_string().yellow());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn list_sessions(config: &Config) -> anyhow::Result<()> {
    let store = build_store(config);
    store.load().await?;

    let active_id = store.active_id().await;
    for conversation in store.conversations().await {
        let marker = if conversation.id == active_id {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{marker} {}  {} ({} messages)",
            conversation.id.dimmed(),
            conversation.title.bold(),
            conversation.messages.len()
        );
    }
    Ok(())
}

async fn run_interactive_chat(config: &Config, rag: RagClient) -> anyhow::Result<()> {
    let store = build_store(config);
    store.load().await?;
    let streamer = EchoStreamer { inner: rag };

    if config.user_id.is_some() {
        println!("{}", "signed in - conversations sync to your account".dimmed());
    } else {
        println!("{}", "guest mode - conversations stay on this machine".dimmed());
    }

    let active = store
        .active_conversation()
        .await
        .ok_or_else(|| anyhow::anyhow!("no active conversation"))?;
    println!("{}", active.title.bold());
    for message in &active.messages {
        print_message(&message.role, &message.content);
    }
    println!(
        "{}",
        "commands: /new /list /switch <id> /delete <id> /quit".dimmed()
    );

    let stdin = io::stdin();
    loop {
        print!("{} ", ">".cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) | ("/exit", _) => break,
            ("/new", _) => {
                let conversation = store.create_conversation().await?;
                println!("{} {}", "created".green(), conversation.title.bold());
            }
            ("/list", _) => {
                let active_id = store.active_id().await;
                for conversation in store.conversations().await {
                    let marker = if conversation.id == active_id { "*" } else { " " };
                    println!("{marker} {}  {}", conversation.id.dimmed(), conversation.title);
                }
            }
            ("/switch", id) => match store.activate(id.trim()).await {
                Ok(()) => {
                    let active = store
                        .active_conversation()
                        .await
                        .ok_or_else(|| anyhow::anyhow!("no active conversation"))?;
                    println!("{}", active.title.bold());
                    for message in &active.messages {
                        print_message(&message.role, &message.content);
                    }
                }
                Err(err) => println!("{}", err.to_string().red()),
            },
            ("/delete", id) => match store.delete_conversation(id.trim()).await {
                Ok(()) => println!("{}", "deleted".green()),
                Err(err) => println!("{}", err.to_string().red()),
            },
            _ => {
                match store.send_message(line, &streamer).await {
                    Ok(SendOutcome::Completed { .. }) => println!(),
                    Ok(SendOutcome::Failed { error }) => {
                        println!("\n{}", chat_core::text::REPLY_ERROR.red());
                        log::warn!("reply failed: {error}");
                    }
                    Err(StoreError::GuestLimitReached) => {
                        println!("{}", StoreError::GuestLimitReached.to_string().yellow());
                    }
                    Err(err) => println!("{}", err.to_string().red()),
                }
            }
        }
    }
    Ok(())
}

fn print_message(role: &chat_core::Role, content: &str) {
    match role {
        chat_core::Role::User => println!("{} {content}", "you:".cyan()),
        chat_core::Role::Assistant => println!("{} {content}", "ዝፋን:".green()),
    }
}
