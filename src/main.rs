use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ragchat::{Config, HttpBackend, SelectedFile, Session};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

mod render;
mod repl;

/// Upload a document to a RAG backend and ask questions about it.
#[derive(Debug, Parser)]
#[command(name = "ragchat", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and RAGCHAT_BACKEND_URL
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Session(SessionCommand),
    /// Print shell completions
    Completions { shell: Shell },
}

/// Commands that talk to the backend.
#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Interactive session (default)
    Chat,
    /// Upload one document
    Upload { path: PathBuf },
    /// Ask one question, optionally uploading a document first
    Ask {
        #[arg(long, value_name = "PATH")]
        upload: Option<PathBuf>,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Check that the backend is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Command::Session(SessionCommand::Chat)) {
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ragchat", &mut std::io::stdout());
            Ok(())
        }
        Command::Session(command) => run(command, cli.config.as_deref(), cli.backend_url).await,
    }
}

async fn run(command: SessionCommand, config_path: Option<&Path>, backend_url: Option<String>) -> Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(url) = backend_url {
        config.backend_url = url;
        config.validate()?;
    }
    let backend = HttpBackend::new(&config)?;
    let session = Session::new(Arc::new(backend));
    tracing::debug!(session = %session.id(), backend = %config.backend_url, "session created");

    match command {
        SessionCommand::Chat => {
            let stdin = BufReader::new(tokio::io::stdin());
            repl::run(session, &config.backend_url, stdin).await
        }
        SessionCommand::Upload { path } => upload(&session, &path).await,
        SessionCommand::Ask { upload: doc, question } => {
            if let Some(path) = doc {
                upload(&session, &path).await?;
            }
            let answer = session.ask(question.join(" ")).await.map_err(|err| {
                let message = err.user_message().unwrap_or("Query did not run.");
                anyhow::Error::new(err).context(message)
            })?;
            render::answer(&answer);
            Ok(())
        }
        SessionCommand::Health => {
            let status = session
                .health()
                .await
                .with_context(|| format!("Backend at {} is not reachable", config.backend_url))?;
            println!("{}", status.message);
            Ok(())
        }
    }
}

async fn upload(session: &Session, path: &Path) -> Result<()> {
    let file = SelectedFile::from_path(path).await?;
    render::selection(&file);
    session.select_file(Some(file));
    let message = session.upload().await.map_err(|err| {
        let message = err.user_message().unwrap_or("Upload did not run.");
        anyhow::Error::new(err).context(message)
    })?;
    render::notice(message);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "ragchat=info,warn",
        2 => "ragchat=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
