use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use calcpad::calculator::format_result;
use calcpad::config::Config;
use calcpad::storage::default_data_dir;
use calcpad::{ErrorKind, FileStorage, Language, MemoryStorage, Notification, Session, Storage};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "calcpad")]
#[command(author, version, about = "Keypad calculator with persisted history")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding history and preferences
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (default: <config dir>/calcpad/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep history and preferences in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Enable debug logs
    #[arg(long, global = true)]
    tracing: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one expression and record it in history
    Eval {
        /// Expression, e.g. "2*(3+4)" or "sqrt(16)"
        expression: String,
    },
    /// Show or clear the calculation history
    History {
        /// Remove all entries
        #[arg(long)]
        clear: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Front-end text for one language.
struct Strings {
    history: &'static str,
    no_history: &'static str,
    error_invalid: &'static str,
    error_type: &'static str,
}

const ENGLISH: Strings = Strings {
    history: "History",
    no_history: "No history yet",
    error_invalid: "Invalid expression! Please check your input.",
    error_type: "Type error! Expression contains invalid characters or syntax.",
};

const INDONESIAN: Strings = Strings {
    history: "Riwayat",
    no_history: "Belum ada riwayat",
    error_invalid: "Ekspresi tidak valid! Silakan periksa input Anda.",
    error_type: "Kesalahan tipe! Ekspresi mengandung karakter atau sintaks yang tidak valid.",
};

fn strings(language: Language) -> &'static Strings {
    match language {
        Language::English => &ENGLISH,
        Language::Indonesian => &INDONESIAN,
    }
}

fn error_text(language: Language, kind: ErrorKind) -> &'static str {
    let text = strings(language);
    match kind {
        ErrorKind::TypeError => text.error_type,
        ErrorKind::InvalidExpression | ErrorKind::InvalidResult => text.error_invalid,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let (config, config_error) = match Config::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_tracing(config.log_filter.as_deref(), cli.tracing);
    if let Some(e) = config_error {
        warn!("{}. Using defaults.", e);
    }

    let storage: Arc<dyn Storage> = if cli.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        let dir = cli
            .data_dir
            .clone()
            .or(config.data_dir.clone())
            .unwrap_or_else(default_data_dir);
        info!("Using data directory {}", dir.display());
        Arc::new(FileStorage::new(dir))
    };

    let mut session = Session::new(storage);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Some(Commands::Eval { expression }) => run_eval(&mut session, &expression, &mut stdout),
        Some(Commands::History { clear, json }) => {
            if clear {
                session.clear_history();
            }
            if json {
                let json = serde_json::to_string_pretty(session.history())
                    .context("Failed to serialize history")?;
                writeln!(stdout, "{json}")?;
                Ok(())
            } else {
                print_history(&session, &mut stdout)
            }
        }
        None => run_interactive(&mut session, &mut stdout),
    }
}

fn init_tracing(configured: Option<&str>, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or("warn")))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_eval(session: &mut Session, expression: &str, out: &mut impl Write) -> Result<()> {
    session.append(expression);
    for notification in session.compute() {
        if let Notification::Error(kind) = notification {
            anyhow::bail!(error_text(session.preferences().language(), kind));
        }
    }
    writeln!(out, "{}", session.display())?;
    Ok(())
}

/// Line-oriented front end.
///
/// `=` computes, `<` deletes the last token, `:`-prefixed lines are
/// commands, and anything else is typed into the expression.
fn run_interactive(session: &mut Session, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "calcpad: type tokens, '=' to compute, '<' to delete, :clear :history \
         :clear-history :recall N :theme :lang :quit"
    )?;
    writeln!(out, "{}", session.display())?;

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read input")?;
        let input = line.trim();

        let notifications = match input {
            "" => continue,
            ":quit" | ":q" => break,
            "=" => session.compute(),
            "<" => session.backspace(),
            ":clear" => session.clear(),
            ":clear-history" => session.clear_history(),
            ":theme" => session.cycle_theme(),
            ":lang" => session.toggle_language(),
            ":history" => {
                print_history(session, out)?;
                continue;
            }
            _ => {
                if let Some(arg) = input.strip_prefix(":recall") {
                    match arg.trim().parse::<usize>() {
                        Ok(n) if n >= 1 => session.recall(n - 1),
                        _ => {
                            writeln!(out, "usage: :recall N")?;
                            continue;
                        }
                    }
                } else if let Some(tokens) = input.strip_suffix('=') {
                    let mut notifications = session.append(tokens);
                    notifications.extend(session.compute());
                    notifications
                } else {
                    session.append(input)
                }
            }
        };

        render(session, &notifications, out)?;
    }

    Ok(())
}

fn render(session: &Session, notifications: &[Notification], out: &mut impl Write) -> Result<()> {
    let language = session.preferences().language();

    for notification in notifications {
        match notification {
            Notification::DisplayChanged(text) => writeln!(out, "{text}")?,
            Notification::Error(kind) => writeln!(out, "! {}", error_text(language, *kind))?,
            Notification::ErrorCleared => {}
            Notification::HistoryChanged => {
                debug!(entries = session.history().len(), "history changed");
            }
            Notification::ThemeChanged(theme) => writeln!(out, "theme: {}", theme.class_name())?,
            Notification::LanguageChanged(changed) => {
                writeln!(out, "language: {}", changed.code())?
            }
        }
    }

    Ok(())
}

fn print_history(session: &Session, out: &mut impl Write) -> Result<()> {
    let text = strings(session.preferences().language());
    writeln!(out, "{}", text.history)?;

    if session.history().is_empty() {
        writeln!(out, "  {}", text.no_history)?;
        return Ok(());
    }

    for (i, entry) in session.history().iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {} = {}  ({})",
            i + 1,
            entry.expression,
            format_result(entry.result),
            entry.timestamp
        )?;
    }

    Ok(())
}
