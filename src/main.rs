use std::io;
use std::time::Duration;

use combat_tracker::config::AppConfig;
use combat_tracker::core::logging;
use combat_tracker::core::session::CombatSession;
use combat_tracker::core::storage::{self, FileStore};
use combat_tracker::tui::app::App;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use miette::{IntoDiagnostic, WrapErr};
use ratatui::{backend::CrosstermBackend, Terminal};

fn main() -> miette::Result<()> {
    let config = AppConfig::load();

    // Initialize logging (file only; stdout belongs to the terminal UI)
    let _log_guard = logging::init_tui(&logging::default_log_dir());
    tracing::info!(version = combat_tracker::VERSION, "combat tracker starting");

    let store = FileStore::new(config.snapshot_path());
    let session = storage::load_stored(&store).unwrap_or_else(|| {
        let mut fresh = CombatSession::new();
        fresh.set_log_open(config.tui.show_log);
        fresh
    });
    tracing::info!(
        path = %store.path().display(),
        combatants = session.encounter().len(),
        round = session.encounter().round(),
        "session loaded"
    );

    let mut app = App::new(session, Box::new(store), &config);

    // Setup terminal
    enable_raw_mode().into_diagnostic()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).into_diagnostic()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).into_diagnostic()?;

    let result = app.run(&mut terminal, Duration::from_millis(config.tui.tick_rate_ms));

    // Restore terminal
    disable_raw_mode().into_diagnostic()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).into_diagnostic()?;
    terminal.show_cursor().into_diagnostic()?;

    tracing::info!("combat tracker exiting");
    result.into_diagnostic().wrap_err("terminal UI failed")
}
