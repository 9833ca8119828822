//! CLI binary for scriptmark.
//!
//! A thin shim over the library crate: `serve` runs the HTTP service,
//! `grade` runs the assembler + orchestrator once against local files and
//! prints the verdict JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scriptmark::{
    assemble, evaluate, AppState, EvaluationRequest, FileStatus, GraderConfig, LlmScorer,
    SubmittedFile,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scriptmark",
    version,
    about = "Rubric-based exam answer grading over Vision Language Models"
)]
struct Cli {
    /// LLM model identifier (e.g. gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, global = true, env = "SCRIPTMARK_MODEL")]
    model: Option<String>,

    /// LLM provider name (openai, anthropic, ollama, …).
    #[arg(long, global = true, env = "SCRIPTMARK_LLM_PROVIDER")]
    provider: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP evaluation service.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8088", env = "SCRIPTMARK_ADDR")]
        addr: SocketAddr,
    },

    /// Grade local answer files once and print the verdict JSON.
    Grade {
        /// The exam question.
        #[arg(long)]
        question: String,

        /// Mark scale to rescale onto.
        #[arg(long)]
        max_marks: f64,

        /// Exam type label (defaults to "GS").
        #[arg(long)]
        exam_type: Option<String>,

        /// Time limit in minutes, if the answer was written under one.
        #[arg(long)]
        time_limit: Option<f64>,

        /// Answer files: PDF, DOCX, PPTX, PNG, or JPEG.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = GraderConfig::builder();
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    let config = builder.build()?;

    match cli.command {
        Command::Serve { addr } => serve(addr, config).await,
        Command::Grade {
            question,
            max_marks,
            exam_type,
            time_limit,
            files,
        } => grade(question, max_marks, exam_type, time_limit, files, config).await,
    }
}

async fn serve(addr: SocketAddr, config: GraderConfig) -> Result<()> {
    // Resolve credentials once, up front: a service with no usable provider
    // should fail at startup, not on the first request.
    let scorer = LlmScorer::from_config(&config)?;
    let app = scriptmark::create_router(AppState::new(scorer, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("scriptmark listening on {addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn grade(
    question: String,
    max_marks: f64,
    exam_type: Option<String>,
    time_limit: Option<f64>,
    paths: Vec<PathBuf>,
    config: GraderConfig,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes =
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(SubmittedFile::new(name, None, bytes));
    }

    let payload = assemble(&files, &config).await;
    for status in &payload.files {
        match status {
            FileStatus::Skipped { name, reason } => {
                eprintln!("warning: {name} skipped ({reason})");
            }
            FileStatus::Failed { name, error } => {
                eprintln!("warning: {name} failed ({error})");
            }
            FileStatus::Empty { name } => {
                eprintln!("warning: {name} contained no extractable text");
            }
            _ => {}
        }
    }

    let scorer = LlmScorer::from_config(&config)?;
    let request = EvaluationRequest {
        question,
        max_marks,
        exam_type,
        time_limit,
        texts: payload.texts,
        images: payload.images,
    };

    let result = evaluate(&scorer, &request, &config).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
