use console::style;
use ragchat::document::describe_selection;
use ragchat::{Action, Answer, SelectedFile, SessionError, SessionSnapshot};

pub fn answer(answer: &Answer) {
    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!("{}", style(format!("sources: {}", answer.sources.join(", "))).dim());
    }
}

pub fn notice(message: &str) {
    println!("{}", style(message).green());
}

pub fn selection(file: &SelectedFile) {
    eprintln!("{} {}", style("selected").cyan(), describe_selection(file));
}

pub fn error(err: &SessionError) {
    match err {
        SessionError::Busy(action) => {
            eprintln!("{}", style(format!("{} (still waiting)", action.busy_label())).yellow());
        }
        other => {
            let message = other.user_message().unwrap_or("Something went wrong.");
            eprintln!("{}", style(message).red());
        }
    }
}

pub fn status(state: &SessionSnapshot) {
    let file = state
        .selected_file
        .as_ref()
        .map(describe_selection)
        .unwrap_or_else(|| "(none)".to_string());
    println!("file:     {file}");
    println!(
        "actions:  [{}] [{}]",
        state.label(Action::Upload),
        state.label(Action::Query)
    );
    if !state.query_text.is_empty() {
        println!("question: {}", state.query_text);
    }
    if !state.error_text.is_empty() {
        println!("error:    {}", style(&state.error_text).red());
    }
    if !state.response_text.is_empty() {
        println!("response: {}", state.response_text);
    }
}

pub fn help() {
    println!("Type a question and press enter to ask it.");
    println!("  :file PATH   select a document");
    println!("  :upload      upload the selected document");
    println!("  :status      show the session");
    println!("  :help        show this help");
    println!("  :quit        leave");
    println!("Start a question with :: to send a literal leading colon.");
}
