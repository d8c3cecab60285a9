//! Interactive shell
//!
//! Reads one command per line, turns it into an intent and prints whatever
//! the dispatcher hands back. A failed intent leaves the session as it was.

use crate::command::{ShellCommand, HELP_TEXT};
use crate::terminal::{format_menu, format_table, format_transfer, LinePrompter};
use anyhow::{Context, Result};
use app_core::{context_menu, ActionDispatcher, Intent, Outcome, Session};
use directories::ProjectDirs;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

fn history_path() -> Option<PathBuf> {
    ProjectDirs::from("io", "s3browser", "s3browser").map(|dirs| dirs.data_dir().join("history.txt"))
}

/// Run the shell until the user quits
pub fn run(dispatcher: &ActionDispatcher, session: Session) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to create editor")?;
    let history = history_path();
    if let Some(ref path) = history {
        let _ = editor.load_history(path);
    }

    println!("s3browser v{}", env!("CARGO_PKG_VERSION"));
    println!("Type help for commands, quit to exit.\n");

    let mut session = match dispatcher.refresh(&session) {
        Ok(transition) => {
            show_listing(&transition.session);
            transition.session
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            session
        }
    };

    loop {
        let prompt = format!("{}> ", session.path());
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Help => print!("{}", HELP_TEXT),
            ShellCommand::Pwd => println!("{}", session.path()),
            ShellCommand::Quit => break,
            ShellCommand::Menu(name) => {
                let selected = session.clone().select(&name);
                match selected.selection() {
                    Some(entry) => println!("{}", format_menu(&context_menu(Some(entry)))),
                    None => println!("No such entry: {}", name),
                }
            }
            ShellCommand::Run { intent, target } => {
                session = run_intent(dispatcher, &mut editor, session, intent, target);
            }
        }
    }

    if let Some(ref path) = history {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = editor.save_history(path);
    }

    tracing::info!("Shell closed");
    Ok(())
}

/// Dispatch one intent and return the session to keep
fn run_intent(
    dispatcher: &ActionDispatcher,
    editor: &mut DefaultEditor,
    session: Session,
    intent: Intent,
    target: Option<String>,
) -> Session {
    let current = match target {
        Some(name) => {
            let selected = session.clone().select(&name);
            if selected.selection().is_none() {
                println!("No such entry: {}", name);
                return session;
            }
            selected
        }
        None => session.deselect(),
    };

    let mut prompter = LinePrompter::new(editor);
    match dispatcher.dispatch(&current, intent, &mut prompter) {
        Ok(transition) => {
            match &transition.outcome {
                Outcome::Listed => show_listing(&transition.session),
                Outcome::Transferred(summary) => {
                    println!("{}", format_transfer(summary));
                    show_listing(&transition.session);
                }
                Outcome::Preview(text) => {
                    println!("{}", text);
                }
                Outcome::Unchanged => {}
            }
            transition.session
        }
        Err(e) => {
            tracing::warn!("Intent failed: {}", e);
            eprintln!("Error: {}", e.user_message());
            current
        }
    }
}

fn show_listing(session: &Session) {
    println!("{}", session.path());
    println!("{}", format_table(&session.rows()));
}
