mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
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
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::Path,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

use typemaster::{
    app_dirs::AppDirs,
    compose::{RawEvent, SpecialKey},
    config::{Config, ConfigStore, FileConfigStore},
    criteria::{Criteria, Mode, CHALLENGES},
    key_tracker::KeyTracker,
    platform::{Platform, Script},
    problem_keys::ProblemKeys,
    round::{Round, RoundConfig},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
};

const DEFAULT_ENGLISH_PROMPT: &str = "The quick brown fox jumps over the lazy dog.";
const DEFAULT_KHMER_PROMPT: &str = "ការរៀនធ្វើឱ្យប្រសើរឡើង។";

/// typing practice with ime-aware input, live scoring, levels and challenges
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// text to type
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// script of the text; remembered for later runs
    #[clap(short = 'l', long, value_enum)]
    script: Option<Script>,

    /// play an adventure level with its thresholds
    #[clap(long, conflicts_with = "challenge")]
    level: Option<u32>,

    /// play a built-in challenge by id
    #[clap(long)]
    challenge: Option<String>,

    /// minimum words per minute to pass
    #[clap(long)]
    min_wpm: Option<u32>,

    /// minimum accuracy percentage to pass; 100 fails on the first error
    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    min_accuracy: Option<u32>,

    /// time limit in seconds
    #[clap(short = 's', long)]
    time_limit: Option<u32>,

    /// override input platform detection
    #[clap(long, value_enum)]
    platform: Option<Platform>,

    /// print the session result as json on exit
    #[clap(long)]
    json: bool,

    /// list the built-in challenges and exit
    #[clap(long)]
    list_challenges: bool,
}

impl Cli {
    fn mode(&self) -> Mode {
        if let Some(level) = self.level {
            Mode::Level { level }
        } else if let Some(id) = &self.challenge {
            Mode::Challenge { id: id.clone() }
        } else if self.min_wpm.is_some() || self.min_accuracy.is_some() || self.time_limit.is_some()
        {
            Mode::Challenge {
                id: "custom".to_string(),
            }
        } else {
            Mode::Practice
        }
    }

    fn criteria(&self, mode: &Mode) -> typemaster::Result<Criteria> {
        let base = match mode {
            Mode::Challenge { id } if id == "custom" => Criteria::none(),
            other => other.default_criteria()?,
        };
        Ok(Criteria {
            min_accuracy: self.min_accuracy.or(base.min_accuracy),
            min_wpm: self.min_wpm.or(base.min_wpm),
            time_limit_secs: self.time_limit.or(base.time_limit_secs),
        })
    }

    fn apply_to(&self, config: &mut Config) {
        if let Some(script) = self.script {
            config.script = script;
        }
        if let Some(platform) = self.platform {
            config.platform = Some(platform);
        }
    }

    fn prompt(&self, script: Script) -> String {
        self.prompt.clone().unwrap_or_else(|| {
            match script {
                Script::English => DEFAULT_ENGLISH_PROMPT,
                Script::Khmer => DEFAULT_KHMER_PROMPT,
            }
            .to_string()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub text: String,
    pub round_config: RoundConfig,
    pub round: Round,
    /// Stand-in for the hidden input element the reconciler diffs against.
    pub surface: String,
    pub problem_keys: ProblemKeys,
    pub keys: KeyTracker,
    pub state: AppState,
}

impl App {
    pub fn new(text: String, mode: Mode, criteria: Criteria, round_config: RoundConfig) -> Self {
        let round = Round::new(&text, mode, criteria, round_config);
        Self {
            text,
            round_config,
            round,
            surface: String::new(),
            problem_keys: ProblemKeys::new(),
            keys: KeyTracker::new(),
            state: AppState::Typing,
        }
    }

    pub fn restart(&mut self) {
        self.round.cancel();
        self.round = Round::new(
            &self.text,
            self.round.mode().clone(),
            *self.round.criteria(),
            self.round_config,
        );
        self.surface.clear();
        self.keys.clear();
        self.state = AppState::Typing;
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.round.on_tick(now);
        if self.round.is_finished() {
            self.state = AppState::Results;
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        self.keys.observe(&key);
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }

        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.round.cancel();
            return Flow::Quit;
        }
        if key.code == KeyCode::Tab {
            self.restart();
            return Flow::Continue;
        }
        if self.state != AppState::Typing {
            return Flow::Continue;
        }

        if let Some(raw) = to_raw(&key, self.keys.shift_active(), &mut self.surface) {
            let step = self.round.handle(raw, now);
            for outcome in &step.outcomes {
                if let Some((expected, correct)) = outcome.key_signal() {
                    self.problem_keys.record(expected, correct);
                }
            }
            if step.clear_surface {
                self.surface.clear();
            }
        }
        if self.round.is_finished() {
            self.state = AppState::Results;
        }
        Flow::Continue
    }
}

/// Map a terminal key onto the raw events a text input element would emit.
/// Terminals deliver committed text only, so there is never a composition.
fn to_raw(key: &KeyEvent, modifier: bool, surface: &mut String) -> Option<RawEvent> {
    let special = |key| Some(RawEvent::Key { key, modifier });
    match key.code {
        KeyCode::Backspace => special(SpecialKey::Backspace),
        KeyCode::Enter => special(SpecialKey::Enter),
        KeyCode::Char(' ') => special(SpecialKey::Space),
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            surface.push(c);
            Some(RawEvent::Input {
                value: surface.clone(),
            })
        }
        _ => None,
    }
}

/// Install the global subscriber writing to `path`.
fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_env("TYPEMASTER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| -> Box<dyn Error> { e })?;
    Ok(())
}

/// The runner wakes for redraws and must not starve the stats schedule.
fn runner_interval(config: &Config) -> Duration {
    Duration::from_millis(config.redraw_ms.max(1)).min(config.round_config().tick_interval)
}

fn print_challenges() {
    for c in CHALLENGES {
        println!(
            "{:<20} {:<18} {:<10} {:<6} {}",
            c.id, c.title, c.kind, c.difficulty, c.description
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_challenges {
        print_challenges();
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    match AppDirs::log_path() {
        Some(path) => {
            if let Err(e) = init_logging(&path) {
                eprintln!("typemaster: logging disabled: {e}");
            }
        }
        None => eprintln!("typemaster: logging disabled: no state directory"),
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply_to(&mut config);
    if let Err(e) = store.save(&config) {
        tracing::warn!(error = %e, "could not save config");
    }

    let mode = cli.mode();
    let criteria = match cli.criteria(&mode) {
        Ok(c) => c,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    };

    let mut app = App::new(
        cli.prompt(config.script),
        mode,
        criteria,
        config.round_config(),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(runner_interval(&config)),
    );
    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome?;

    if cli.json {
        if let Some(result) = app.round.result() {
            println!("{}", serde_json::to_string(result)?);
        }
    }

    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.on_key(key, Instant::now()) == Flow::Quit {
                    break;
                }
            }
        }
    }
    Ok(())
}
