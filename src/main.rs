// plconsole - interactive console for a logic-programming engine
// Main entry point

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use tracing::{info, warn};

use plconsole::cli::{help_text, InterruptFlag, Session, Startup, StartupOptions, TerminalConsole};
use plconsole::config::{load_config, FAULT_EXIT_CODE};
use plconsole::engine::FactEngine;
use plconsole::history::HistoryFile;
use plconsole::logging::init_logging;

fn main() {
    let options = match StartupOptions::parse(std::env::args().skip(1)) {
        Startup::Help => {
            print!("{}", help_text());
            return;
        }
        Startup::Run(options) => options,
    };

    if let Err(e) = run(options) {
        eprintln!("\nError: {}", e);
        eprintln!("{:?}", e);
        eprintln!("\nPress Enter to exit.");
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
        std::process::exit(FAULT_EXIT_CODE);
    }
}

fn run(options: StartupOptions) -> Result<()> {
    let (config, source) = load_config()?;
    init_logging(config.debug_logging);
    info!(source = %source, theme = config.theme.name(), "Configuration loaded");

    for arg in &options.ignored {
        info!(arg = %arg, "Ignored startup argument");
    }
    let theme = options.theme_or(config.theme);

    let interrupts = InterruptFlag::new();
    let mut console =
        TerminalConsole::new(interrupts.clone()).context("Failed to initialise the terminal")?;

    let mut engine = FactEngine::new().with_prompt(config.prompt.clone());
    if let Some(path) = config.history_path() {
        let file = HistoryFile::new(path, config.history.max_entries);
        match file.load() {
            Ok(entries) => console.preload_history(&entries),
            Err(e) => warn!("Failed to load history from {}: {}", file.path().display(), e),
        }
        engine = engine.with_history_file(file);
    }

    let mut stdout = io::stdout();
    let end = Session::new(&mut engine, &mut console, &mut stdout)
        .with_theme(theme)
        .with_interrupts(interrupts)
        .with_signal_handler(true)
        .run()?;

    info!(?end, "Exiting");
    Ok(())
}
