mod ui;

use std::{
    error::Error,
    fs::File,
    io::{self, stdin, BufRead, Write},
    path::PathBuf,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use snag::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    controller::SessionController,
    input::{OrientationPermission, OrientationSample},
    logging,
    persistence::{MemoryPersistence, Persistence, SqlitePersistence},
    runtime::{CrosstermEventSource, Runner, SnagEvent, SnagEventSource},
    session::SessionPhase,
    stats::{ClearConfirmation, StatsStore},
    view::GameView,
    HISTORY_KEY,
};

const TICK_RATE_MS: u64 = 50;
/// Degrees of tilt reported per arrow key press
const TILT_STEP: f64 = 10.0;

/// hold your aim on the targets until they are captured
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal reaction and attention trainer. Targets spawn at random positions; every tilt (arrow key) rechecks them against the aim point, and a target held in range for the full hold time is captured."
)]
pub struct Cli {
    /// length of a session in seconds
    #[clap(short = 's', long)]
    session_secs: Option<u32>,

    /// continuous in-range time needed to capture, in milliseconds
    #[clap(long)]
    hold_ms: Option<u64>,

    /// radius of the capture zone around the aim point
    #[clap(short = 'r', long)]
    radius: Option<f64>,

    /// milliseconds between target spawns
    #[clap(long)]
    spawn_ms: Option<u64>,

    /// logical play area width
    #[clap(long)]
    width: Option<f64>,

    /// logical play area height
    #[clap(long)]
    height: Option<f64>,

    /// seed for reproducible target placement
    #[clap(long)]
    seed: Option<u64>,

    /// persist the merged settings as the new defaults
    #[clap(long)]
    save_config: bool,

    /// keep this run's history in memory only
    #[clap(long)]
    no_save: bool,

    /// run as if orientation access had been refused (targets are never captured)
    #[clap(long)]
    deny_orientation: bool,

    /// print the session history and exit
    #[clap(long)]
    history: bool,

    /// delete the session history (asks for confirmation) and exit
    #[clap(long)]
    clear_history: bool,

    /// write the session history as CSV to the given path and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the stored config
    fn merge_into(&self, mut cfg: Config) -> Config {
        if let Some(v) = self.session_secs {
            cfg.session_secs = v;
        }
        if let Some(v) = self.hold_ms {
            cfg.capture_hold_ms = v;
        }
        if let Some(v) = self.radius {
            cfg.capture_radius = v;
        }
        if let Some(v) = self.spawn_ms {
            cfg.spawn_interval_ms = v;
        }
        if let Some(v) = self.width {
            cfg.viewport_width = v;
        }
        if let Some(v) = self.height {
            cfg.viewport_height = v;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        cfg
    }

    fn wants_headless(&self) -> bool {
        self.history || self.clear_history || self.export_csv.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AppState {
    Start,
    Playing,
    Results,
    History,
    ConfirmClear,
}

pub type History = Box<dyn Persistence>;

pub struct App {
    pub controller: SessionController<History, GameView>,
    pub state: AppState,
    /// Screen to return to when leaving the history
    pub back_to: AppState,
    pub permission: OrientationPermission,
}

impl App {
    pub fn new(config: &Config, backend: History, permission: OrientationPermission) -> Self {
        let mut controller =
            SessionController::new(config.session_config(), StatsStore::open(backend), GameView::new());
        controller.set_permission(permission);
        Self {
            controller,
            state: AppState::Start,
            back_to: AppState::Start,
            permission,
        }
    }

    pub fn view(&self) -> &GameView {
        self.controller.presenter()
    }

    fn start_session(&mut self, now: Duration) {
        self.controller.start(now);
        self.state = AppState::Playing;
    }

    fn show_history(&mut self) {
        self.back_to = self.state;
        self.state = AppState::History;
    }

    /// Promote the finished session to the results screen
    fn sync_phase(&mut self) {
        if self.state == AppState::Playing && self.controller.phase() == SessionPhase::Ended {
            self.state = AppState::Results;
        }
    }

    /// Returns false when the app should quit
    fn on_key(&mut self, key: KeyEvent, now: Duration) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.controller.end(now);
            return false;
        }

        match self.state {
            AppState::Start => match key.code {
                KeyCode::Enter | KeyCode::Char('s') => self.start_session(now),
                KeyCode::Char('h') => self.show_history(),
                KeyCode::Esc | KeyCode::Char('q') => return false,
                _ => {}
            },
            AppState::Playing => {
                let sample = match key.code {
                    KeyCode::Up => Some(OrientationSample::new(-TILT_STEP, 0.0)),
                    KeyCode::Down => Some(OrientationSample::new(TILT_STEP, 0.0)),
                    KeyCode::Left => Some(OrientationSample::new(0.0, -TILT_STEP)),
                    KeyCode::Right => Some(OrientationSample::new(0.0, TILT_STEP)),
                    KeyCode::Char(' ') => Some(OrientationSample::default()),
                    KeyCode::Esc | KeyCode::Char('q') => {
                        // quitting mid-session still records it
                        self.controller.end(now);
                        return false;
                    }
                    _ => None,
                };
                if let Some(sample) = sample {
                    self.controller.on_orientation(sample, now);
                }
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.start_session(now),
                KeyCode::Char('h') => self.show_history(),
                KeyCode::Esc | KeyCode::Char('q') => return false,
                _ => {}
            },
            AppState::History => match key.code {
                KeyCode::Char('c') if !self.view().history.is_empty() => {
                    self.state = AppState::ConfirmClear
                }
                KeyCode::Char('b') | KeyCode::Backspace => self.state = self.back_to,
                KeyCode::Esc | KeyCode::Char('q') => return false,
                _ => {}
            },
            AppState::ConfirmClear => {
                if let KeyCode::Char(c) = key.code {
                    if let Some(confirmation) = ClearConfirmation::from_answer(&c.to_string()) {
                        self.controller.clear_history(confirmation);
                    }
                }
                self.state = AppState::History;
            }
        }

        self.sync_phase();
        true
    }
}

fn open_history(cli: &Cli) -> Result<History, Box<dyn Error>> {
    if cli.no_save {
        return Ok(Box::new(MemoryPersistence::new()));
    }
    let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("snag.db"));
    Ok(Box::new(SqlitePersistence::open(path, HISTORY_KEY)?))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        logging::init_file_logger(&path)?;
    }

    let store = FileConfigStore::new();
    let config = cli.merge_into(store.load());
    if let Err(e) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
    }
    if cli.save_config {
        store.save(&config)?;
    }

    let backend = open_history(&cli)?;

    if cli.wants_headless() {
        return run_headless(&cli, backend);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let permission = if cli.deny_orientation {
        OrientationPermission::Denied
    } else {
        OrientationPermission::Granted
    };
    let mut app = App::new(&config, backend, permission);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: SnagEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            SnagEvent::Tick => {
                app.controller.advance_to(runner.now());
                app.sync_phase();
            }
            SnagEvent::Resize => {}
            SnagEvent::Key(key) => {
                if !app.on_key(key, runner.now()) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn run_headless(cli: &Cli, backend: History) -> Result<(), Box<dyn Error>> {
    let mut stats = StatsStore::open(backend);

    if let Some(path) = &cli.export_csv {
        stats.export_csv(File::create(path)?)?;
        println!("exported {} sessions to {}", stats.len(), path.display());
    }

    if cli.history {
        let mut out = io::stdout().lock();
        ui::history::write_table(&mut out, &stats.recent(stats.len()), &stats.summary())?;
    }

    if cli.clear_history {
        if stats.is_empty() {
            println!("no training history to clear");
            return Ok(());
        }
        print!("Clear all {} recorded sessions? [y/N] ", stats.len());
        io::stdout().flush()?;
        let mut answer = String::new();
        stdin().lock().read_line(&mut answer)?;
        match ClearConfirmation::from_answer(&answer) {
            Some(confirmation) => {
                stats.clear(confirmation);
                println!("history cleared");
            }
            None => println!("history kept"),
        }
    }

    Ok(())
}
