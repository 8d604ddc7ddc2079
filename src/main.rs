mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keyrush::{
    config::{Config, ConfigStore, FileConfigStore},
    engine::{Step, TestEngine},
    runtime::{keystroke_from, AppEvent, CrosstermEventSource, FixedTicker, Runner, POLL_INTERVAL},
    session::Mode,
    store::{submit_result, CsvResultLog, ResultsDb, SinkSet},
    Error,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    io::{self, stdin, Stdout},
    time::Instant,
};
use tracing::warn;

/// typing speed test with live wpm, accuracy and consistency
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// test mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// time limit in seconds for time tests (15, 30, 60, 120)
    #[clap(short = 's', long = "time")]
    time_limit_secs: Option<u64>,

    /// number of words for word tests (10, 25, 50, 100)
    #[clap(short = 'w', long = "words")]
    word_count: Option<usize>,

    /// custom text to type; implies custom mode unless a mode is given
    #[clap(short = 'p', long = "text")]
    custom_text: Option<String>,

    /// do not save results
    #[clap(long)]
    no_save: bool,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// CLI flags override the stored preferences
    fn apply(&self, config: &mut Config) {
        if let Some(secs) = self.time_limit_secs {
            config.time_limit_secs = secs;
            config.mode = Mode::Time;
        }
        if let Some(count) = self.word_count {
            config.word_count = count;
            config.mode = Mode::Words;
        }
        if let Some(ref text) = self.custom_text {
            config.custom_text = Some(text.clone());
            config.mode = Mode::Custom;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.no_save {
            config.save_results = false;
        }
    }
}

pub struct App {
    pub engine: TestEngine,
    pub sinks: SinkSet,
    pub notice: Option<String>,
}

impl App {
    pub fn new(engine: TestEngine, sinks: SinkSet) -> Self {
        Self {
            engine,
            sinks,
            notice: None,
        }
    }

    fn on_step(&mut self, step: Step) {
        if let Step::Completed(result) = step {
            if !self.sinks.is_empty() {
                self.notice = submit_result(&mut self.sinks, &result);
            }
        }
    }

    fn restart(&mut self) {
        self.engine.restart();
        self.notice = None;
    }
}

fn build_sinks(save_results: bool) -> SinkSet {
    let mut sinks = SinkSet::new();
    if !save_results {
        return sinks;
    }
    match ResultsDb::new() {
        Ok(db) => sinks.push(Box::new(db)),
        Err(e) => warn!("results database unavailable: {e}"),
    }
    sinks.push(Box::new(CsvResultLog::new()));
    sinks
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = keyrush::logging::init() {
        eprintln!("logging disabled: {e}");
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply(&mut config);

    let test_config = match config.to_test_config() {
        Ok(tc) => tc,
        Err(e) if e.is_config_error() => Cli::command().error(ErrorKind::InvalidValue, e).exit(),
        Err(e) => return Err(e.into()),
    };
    if cli.save_config {
        store.save(&config)?;
    }

    let mut app = App::new(
        TestEngine::new(test_config),
        build_sinks(config.save_results),
    );

    let mut terminal = setup_terminal()?;
    let outcome = start_tui(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    outcome
}

fn setup_terminal() -> keyrush::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().map_err(|e| Error::terminal(format!("raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| Error::terminal(format!("alternate screen: {e}")))?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| Error::terminal(e.to_string()))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> keyrush::Result<()> {
    disable_raw_mode().map_err(|e| Error::terminal(format!("raw mode: {e}")))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| Error::terminal(format!("alternate screen: {e}")))?;
    terminal.show_cursor()?;
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(POLL_INTERVAL));

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();
        let now = Instant::now();

        // ticks owed before this event must land first so a late key can't beat the timer
        let step = app.engine.catch_up(now);
        app.on_step(step);

        match event {
            AppEvent::Key(key) if is_quit(&key) => break,
            AppEvent::Key(key) if key.code == KeyCode::Tab => app.restart(),
            AppEvent::Key(key) => {
                if let Some(keystroke) = keystroke_from(&key) {
                    let step = app.engine.handle_keystroke(keystroke, now);
                    app.on_step(step);
                }
            }
            AppEvent::Resize | AppEvent::Tick => {}
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}
