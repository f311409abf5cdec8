use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use eyelab::{
    app::{App, Flow},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging::init_file_logging,
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    submission::{ArchiveSink, HttpSink, LogSink, SubmissionSink},
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::runtime::Handle;
use tracing::{error, info};

/// emotion-to-light study: pick a color, pattern and intensity for each emotion
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// config file to use instead of the per-user one
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// form endpoint receiving the finished session (overrides the config file)
    #[clap(short = 'e', long)]
    endpoint: Option<String>,

    /// never post; only log what would have been sent
    #[clap(long)]
    offline: bool,

    /// tracing filter for the log file, e.g. `debug` or `eyelab=trace`
    #[clap(long, default_value = "info")]
    log_level: String,

    /// milliseconds between timer/animation ticks
    #[clap(long, default_value_t = 100)]
    tick_ms: u64,
}

impl Cli {
    fn load_config(&self) -> Result<Config, Box<dyn Error>> {
        let cfg = match &self.config {
            Some(path) => FileConfigStore::with_path(path).try_load()?,
            None => FileConfigStore::new().load(),
        };
        Ok(cfg.with_endpoint(self.endpoint.clone()))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = match AppDirs::state_dir() {
        Some(dir) => match init_file_logging(&dir, &cli.log_level) {
            Ok(guard) => Some(guard),
            Err(err) => {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::InvalidValue, format!("logging: {err}"))
                    .exit();
            }
        },
        None => None,
    };

    let cfg = cli.load_config()?;
    let catalog = cfg.catalog()?;

    // owns the submission POST; the session never awaits it
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let sink = build_sink(&cli, &cfg, runtime.handle().clone());

    let mut app = App::with_confirmation_code(catalog, sink, cfg.confirmation_code.clone());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(cli.tick_ms.max(1))),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if !app.sequencer.has_submitted() {
        info!(
            session = %app.sequencer.session_id(),
            task = app.sequencer.current_task(),
            "session ended before submission"
        );
    }
    // dropping the runtime cancels a POST that is still running
    app.sequencer
        .sink_mut()
        .flush(Duration::from_secs(cfg.request_timeout_secs));
    drop(runtime);
    result
}

fn build_sink(cli: &Cli, cfg: &Config, handle: Handle) -> Box<dyn SubmissionSink> {
    let offline = || Box::new(LogSink::new(cfg.field_map.clone())) as Box<dyn SubmissionSink>;

    let base = match (&cfg.endpoint, cli.offline) {
        (Some(endpoint), false) => match HttpSink::new(
            endpoint,
            cfg.field_map.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
            handle,
        ) {
            Ok(sink) => {
                info!(endpoint = %sink.endpoint(), "submitting over http");
                Box::new(sink) as Box<dyn SubmissionSink>
            }
            Err(err) => {
                error!(%err, %endpoint, "unusable endpoint, falling back to log-only submission");
                offline()
            }
        },
        _ => {
            info!("log-only submission");
            offline()
        }
    };

    match AppDirs::archive_path() {
        Some(path) if cfg.archive_responses => Box::new(ArchiveSink::new(base, path)),
        _ => base,
    }
}

fn start_tui<B: Backend, K: SubmissionSink, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App<K>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        if app.on_event(runner.step()) == Flow::Quit {
            break;
        }
    }
    Ok(())
}
