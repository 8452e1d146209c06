pub mod ui;

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
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tartini::{
    catalog::Catalog,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, ExamEvent, FixedTicker, Runner},
    selection::IntervalSelection,
    session::{ExamPhase, ExamSession},
};

/// Slider step for Left/Right, about a third of a cent.
const FINE_STEP: f64 = 0.002;
/// Slider step for Up/Down, three cents.
const COARSE_STEP: f64 = 0.02;

/// just-intonation interval tuning exam
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Tune thirty just-intonation intervals by ear. Each round is scored on accuracy in cents and on response time; hints cost escalating points."
)]
pub struct Cli {
    /// interval ids to draw from, comma separated (see --list-intervals)
    #[clap(short = 's', long, value_delimiter = ',')]
    select: Vec<u32>,

    /// draw from every interval in the catalog
    #[clap(short = 'a', long)]
    all: bool,

    /// seed for reproducible rounds
    #[clap(long)]
    seed: Option<u64>,

    /// display refresh period in milliseconds (50-250)
    #[clap(long)]
    tick_ms: Option<u64>,

    /// config file to read instead of the platform default
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// print the interval catalog and exit
    #[clap(short = 'l', long)]
    list_intervals: bool,
}

impl Cli {
    /// File settings with command-line overrides applied.
    fn merged_config(&self, mut config: Config) -> Config {
        if !self.select.is_empty() {
            config.selected_intervals = self.select.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(ms) = self.tick_ms {
            config.tick_rate_ms = ms;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Selecting,
    Exam,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub session: ExamSession,
    pub selection: IntervalSelection,
    /// Row in the selector list, catalog order.
    pub cursor: usize,
    pub state: AppState,
    pub tick_rate: Duration,
}

impl App {
    pub fn new(cli: &Cli, config: Config) -> Self {
        let session = ExamSession::new(config.session_settings());
        let mut selection = IntervalSelection::from_ids(session.catalog(), &config.selected_intervals);
        if cli.all {
            selection.select_all(session.catalog());
        }

        Self {
            session,
            selection,
            cursor: 0,
            state: AppState::Selecting,
            tick_rate: config.tick_rate(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.session.catalog()
    }

    fn on_event(&mut self, event: ExamEvent) -> Flow {
        match event {
            ExamEvent::Tick => {
                self.on_tick();
                Flow::Continue
            }
            ExamEvent::Resize => Flow::Continue,
            ExamEvent::Key(key) => {
                // Key repeat can outpace the tick; fire due timers first.
                self.on_tick();
                self.handle_key(key)
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        match self.state {
            AppState::Selecting => self.on_selector_key(key),
            AppState::Exam => self.on_exam_key(key),
            AppState::Results => self.on_results_key(key),
        }
        self.sync_state();
        Flow::Continue
    }

    fn on_selector_key(&mut self, key: KeyEvent) {
        let count = self.catalog().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < count {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.catalog().all().get(self.cursor).map(|i| i.id) {
                    self.selection.toggle(id);
                }
            }
            KeyCode::Char('a') => self.selection.select_all(self.session.catalog()),
            KeyCode::Char('n') => self.selection.select_none(),
            KeyCode::Enter => {
                if !self.selection.is_empty() {
                    self.session.start(self.selection.ids());
                    self.state = AppState::Exam;
                }
            }
            _ => {}
        }
    }

    fn on_exam_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('p') | KeyCode::Char(' ') => self.session.play(),
            KeyCode::Left => self.session.nudge_slider(-FINE_STEP),
            KeyCode::Right => self.session.nudge_slider(FINE_STEP),
            KeyCode::Down => self.session.nudge_slider(-COARSE_STEP),
            KeyCode::Up => self.session.nudge_slider(COARSE_STEP),
            KeyCode::Char('h') => {
                self.session.hint();
            }
            KeyCode::Enter | KeyCode::Char('d') => {
                self.session.done();
            }
            KeyCode::Char('n') => self.session.next(),
            KeyCode::Char('x') => self.session.panic_stop(),
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('n') => self.session.next(),
            KeyCode::Char('s') => {
                self.session.teardown();
                self.state = AppState::Selecting;
            }
            _ => {}
        }
    }

    fn on_tick(&mut self) {
        self.session.on_tick();
        self.sync_state();
    }

    fn sync_state(&mut self) {
        self.state = match (self.state, self.session.phase()) {
            (AppState::Selecting, _) => AppState::Selecting,
            (_, ExamPhase::Complete) => AppState::Results,
            (_, ExamPhase::NotStarted) => AppState::Selecting,
            _ => AppState::Exam,
        };
    }
}

fn print_catalog(catalog: &Catalog) {
    for interval in catalog.all() {
        println!(
            "{:>4}  {:>6}  {}",
            interval.id,
            interval.ratio_label(),
            interval.name
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_intervals {
        print_catalog(&Catalog::standard());
        return Ok(());
    }

    if let Some(ref path) = cli.log_file {
        logging::init_file_logging(path)?;
    }

    let store = match cli.config {
        Some(ref path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = cli.merged_config(store.load());

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli, config);
    let outcome = start_tui(&mut terminal, &mut app);
    app.session.teardown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(app.tick_rate));

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        if app.on_event(runner.step_until(app.session.next_wakeup())) == Flow::Quit {
            break;
        }
    }

    Ok(())
}
