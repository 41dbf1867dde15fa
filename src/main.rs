use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use learnsense::config::Overrides;
use learnsense::{
    find_quiz, load_quiz_from_json, load_tool_result_from_json, newest_first, Config,
    HistoryEntry, HistoryStore, LearnSenseError, Quiz, QuizSnapshot, ToolKind, ToolResult,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// User whose history is read and written
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Directory holding the history store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/learnsense/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take a quiz from a JSON file
    Quiz {
        /// JSON file with the quiz questions
        #[arg(short, long)]
        file: PathBuf,

        /// Also record the quiz in this document's history
        #[arg(long, value_name = "DOCUMENT")]
        save_as: Option<String>,
    },

    /// Append a tool result file to a document's history
    Record {
        #[arg(short, long)]
        document: String,

        /// JSON file of the form {"tool": ..., "data": ...}
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show stored history, for one document or all of them
    History {
        #[arg(short, long)]
        document: Option<String>,

        /// Only show results of this tool (summary, qa, concept, quiz)
        #[arg(short, long)]
        tool: Option<ToolKind>,
    },

    /// Retake a quiz stored in a document's history
    Review {
        #[arg(short, long)]
        document: String,

        /// 1-based history entry; defaults to the latest quiz
        #[arg(short, long)]
        entry: Option<usize>,
    },

    /// Delete a document's history
    Clear {
        #[arg(short, long)]
        document: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let overrides = Overrides {
        user: cli.user.clone(),
        data_dir: cli.data_dir.clone(),
        config: cli.config.clone(),
    };

    let config = match Config::load(overrides) {
        Ok(config) => config,
        Err(e) => {
            report(&LearnSenseError::from(e));
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_file);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to a file because the quiz owns the terminal.
fn init_logging(log_file: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(parent) = log_file.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => {
            eprintln!("Logging disabled: cannot open {}: {}", log_file.display(), e);
        }
    }
}

fn report(error: &LearnSenseError) {
    eprintln!("Error: {}", error);
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

fn run(command: Command, config: &Config) -> Result<(), LearnSenseError> {
    let store = HistoryStore::new(&config.data_dir);
    let user = config.user.as_str();

    match command {
        Command::Quiz { file, save_as } => {
            let questions = load_quiz_from_json(&file)?;
            if let Some(document) = &save_as {
                let result = ToolResult::Quiz {
                    quiz: questions.clone(),
                };
                store.append(user, document, result)?;
                println!("Recorded quiz in history of {}", document);
            }
            let title = save_as.unwrap_or_else(|| file.display().to_string());
            let quiz = Quiz::new(questions, title)?;
            print_outcome(quiz.run()?.as_ref());
        }
        Command::Record { document, file } => {
            let result = load_tool_result_from_json(&file)?;
            let entry = store.append(user, &document, result)?;
            println!(
                "Recorded {} for {} at {}",
                entry.result.title(),
                document,
                entry.id.to_rfc3339()
            );
        }
        Command::History { document, tool } => match document {
            Some(document) => {
                let history = store.get(user, &document)?;
                print_document_history(&document, &history, tool);
            }
            None => {
                let all = store.get_all(user)?;
                if all.is_empty() {
                    println!("No history for {}.", user);
                }
                for doc in all {
                    print_document_history(&doc.document, &doc.history, tool);
                }
            }
        },
        Command::Review { document, entry } => {
            let history = store.get(user, &document)?;
            let Some(questions) = find_quiz(&history, entry) else {
                println!("No matching quiz in the history of {}.", document);
                return Ok(());
            };
            info!(document = %document, questions = questions.len(), "reviewing stored quiz");
            let quiz = Quiz::new(questions.to_vec(), document)?;
            print_outcome(quiz.run()?.as_ref());
        }
        Command::Clear { document } => {
            store.clear(user, &document)?;
            println!("History for {} has been cleared.", document);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &QuizSnapshot) {
    match outcome.score() {
        Some(score) => println!(
            "You scored {} out of {}. {}",
            score,
            outcome.total_questions(),
            outcome.verdict().map(|v| v.message()).unwrap_or_default()
        ),
        None => println!(
            "Quiz closed before submitting ({} of {} answered).",
            outcome.answered_count(),
            outcome.total_questions()
        ),
    }
}

fn print_document_history(document: &str, history: &[HistoryEntry], tool: Option<ToolKind>) {
    let shown = newest_first(history, tool);
    println!("== {} ({} entries)", document, shown.len());
    for (n, entry) in shown {
        let detail = match &entry.result {
            ToolResult::Quiz { quiz } => format!("{} questions", quiz.len()),
            other => preview(other.text().unwrap_or_default()),
        };
        println!(
            "{:3}. {:<11} {}  {}",
            n,
            entry.result.title(),
            entry.id.format("%Y-%m-%d %H:%M"),
            detail
        );
    }
}

const PREVIEW_LENGTH: usize = 60;

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_LENGTH {
        let truncated: String = flat.chars().take(PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        flat
    }
}
