use crate::render;
use anyhow::Result;
use ragchat::{Action, Answer, SelectedFile, Session, SessionError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Select(String),
    Upload,
    Status,
    Help,
    Quit,
    Ask(String),
    Unknown(String),
    Blank,
}

impl Input {
    /// `:word` is a command; `::` sends a question starting with `:`. A colon
    /// not followed by a word (`:)`, `:-(`) is part of an ordinary question.
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Input::Blank;
        }
        if let Some(escaped) = trimmed.strip_prefix("::") {
            return Input::Ask(format!(":{escaped}"));
        }
        let Some(command) = trimmed.strip_prefix(':') else {
            return Input::Ask(line.to_string());
        };
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        if name != "?" && (name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic())) {
            return Input::Ask(line.to_string());
        }
        match name {
            "file" | "f" => Input::Select(arg.to_string()),
            "upload" | "u" => Input::Upload,
            "status" | "s" => Input::Status,
            "help" | "h" | "?" => Input::Help,
            "quit" | "q" | "exit" => Input::Quit,
            _ => Input::Unknown(name.to_string()),
        }
    }
}

enum Completion {
    Uploaded(Result<&'static str, SessionError>),
    Answered(Result<Answer, SessionError>),
}

/// Read commands from `input` until `:quit`, end of input or Ctrl-C.
///
/// Uploads and questions run as background tasks so both can be outstanding
/// at once. When input ends, requests already sent are still waited for and
/// shown; `:quit` and Ctrl-C leave immediately.
pub async fn run<R>(session: Session, backend_url: &str, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("ragchat -> {backend_url}. Type a question, or :help.");

    let mut lines = input.lines();
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut reading = true;
    let mut outstanding = 0usize;

    while reading || outstanding > 0 {
        tokio::select! {
            line = lines.next_line(), if reading => {
                let Some(line) = line? else {
                    reading = false;
                    debug!(outstanding, "input closed");
                    continue;
                };
                match Input::parse(&line) {
                    Input::Blank => {}
                    Input::Quit => break,
                    Input::Help => render::help(),
                    Input::Status => render::status(&session.snapshot()),
                    Input::Unknown(name) => eprintln!("unknown command :{name}, try :help"),
                    Input::Select(path) if path.is_empty() => eprintln!("usage: :file PATH"),
                    Input::Select(path) => match SelectedFile::from_path(&path).await {
                        Ok(file) => {
                            render::selection(&file);
                            session.select_file(Some(file));
                        }
                        Err(err) => eprintln!("{err}"),
                    },
                    Input::Upload => {
                        let session = session.clone();
                        let tx = tx.clone();
                        outstanding += 1;
                        tokio::spawn(async move {
                            let _ = tx.send(Completion::Uploaded(session.upload().await));
                        });
                    }
                    Input::Ask(text) => {
                        if !session.is_enabled(Action::Query) {
                            render::error(&SessionError::Busy(Action::Query));
                            continue;
                        }
                        session.set_query_text(text);
                        let session = session.clone();
                        let tx = tx.clone();
                        outstanding += 1;
                        tokio::spawn(async move {
                            let _ = tx.send(Completion::Answered(session.query().await));
                        });
                    }
                }
            }
            Some(done) = rx.recv() => {
                outstanding -= 1;
                match done {
                    Completion::Uploaded(Ok(message)) => render::notice(message),
                    Completion::Answered(Ok(answer)) => render::answer(&answer),
                    Completion::Uploaded(Err(err)) | Completion::Answered(Err(err)) => {
                        debug!(error = %err, "operation failed");
                        render::error(&err);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let state = session.snapshot();
    if state.upload_in_flight || state.query_in_flight {
        eprintln!("leaving with a request still outstanding");
    }
    Ok(())
}
