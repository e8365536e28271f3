use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use jot::config::{EditorConfig, EnvConfig};
use jot::editor::{self, Editor, HELP_MESSAGE};
use jot::platform::terminal::RawTerminal;
use jot::Console;

fn main() -> ExitCode {
    let env = EnvConfig::from_env();
    if let Some(log_file) = &env.log_file {
        if let Err(err) = init_logging(log_file) {
            eprintln!("jot: logging disabled: {err}");
        }
    }
    let config = EditorConfig::from_env(&env);
    let filename = std::env::args().nth(1);

    match run_session(config, filename) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("jot: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_session(config: EditorConfig, filename: Option<String>) -> anyhow::Result<()> {
    let mut term = RawTerminal::new().context("entering raw mode")?;
    let (rows, cols) = term.size()?;

    let mut editor = Editor::new(config, rows, cols);
    if let Some(name) = &filename {
        // A missing or unreadable file still opens an editable session; the
        // recorded name lets Ctrl-S create it.
        if let Err(err) = editor.open(Path::new(name)) {
            editor.set_status_message(format!("Can't open {name}: {err}"));
        }
    }
    if editor.message().is_none() {
        editor.set_status_message(HELP_MESSAGE);
    }

    editor::run(&mut editor, &mut term)?;
    term.restore().context("restoring terminal state")?;
    Ok(())
}

/// File-only logging, enabled by `JOT_LOG`. Nothing may reach stdout or
/// stderr while the screen is in raw mode.
fn init_logging(path: &str) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
