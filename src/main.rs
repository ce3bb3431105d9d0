use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use npmcharts::chart::highlight::InputModePreference;
use npmcharts::dashboard::{Dashboard, LoadState};
use npmcharts::export::write_drawings;
use npmcharts::loader::{JsonFileLoader, LoadWorker};
use npmcharts::persistence;
use npmcharts::persistence::config::{load_config, load_config_from, Config};
use npmcharts::tui::app::App;
use npmcharts::tui::event::{poll_event, AppEvent};

/// How long a headless export waits for the loader.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "npmcharts", version, about = "Dual-axis npm download charts")]
struct Cli {
    /// Bundle file or directory of npm downloads/range JSON documents
    #[arg(long)]
    data: Option<PathBuf>,

    /// Preset to show first
    #[arg(long)]
    preset: Option<String>,

    /// Highlight interaction: auto, pointer or touch
    #[arg(long)]
    input_mode: Option<InputModePreference>,

    /// Chart width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Dependency axis compression, in (0, 1]
    #[arg(long)]
    dependencies_scale: Option<f64>,

    /// Render the charts to a .png or .svg file instead of starting the UI
    #[arg(long)]
    export: Option<PathBuf>,

    /// Alternate config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("NPMCHARTS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    // The terminal belongs to the UI, so logs go to a file.
    let writer = persistence::data_dir()
        .and_then(|dir| std::fs::OpenOptions::new().create(true).append(true).open(dir.join("npmcharts.log")).ok())
        .map(|file| BoxMakeWriter::new(Mutex::new(file)))
        .unwrap_or_else(|| BoxMakeWriter::new(io::sink));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}

/// Merge CLI flags over the config file.
fn apply_cli(mut config: Config, cli: &Cli) -> Config {
    if let Some(data) = &cli.data {
        config.data = Some(data.clone());
    }
    if let Some(preset) = &cli.preset {
        config.preset = Some(preset.clone());
    }
    if let Some(mode) = cli.input_mode {
        config.input_mode = mode;
    }
    if let Some(width) = cli.width {
        config.chart.width = width;
    }
    if let Some(scale) = cli.dependencies_scale {
        config.chart.dependencies_scale = scale;
    }
    config
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    };
    let config = apply_cli(config, &cli);

    let data = config
        .data
        .clone()
        .ok_or_else(|| anyhow!("no data source: pass --data or set `data` in the config file"))?;
    let worker = LoadWorker::new(Arc::new(JsonFileLoader::from_path(&data)));
    let dashboard = Dashboard::new(config.presets.clone(), config.preset.as_deref(), config.chart)
        .context("invalid chart configuration")?;
    info!(data = %data.display(), preset = dashboard.selector(), "starting");

    if let Some(path) = &cli.export {
        return export(dashboard, &worker, path);
    }

    // No touch input in a terminal; motion events stand in for hover.
    let input_mode = config.input_mode.resolve(true);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, App::new(dashboard, worker, input_mode));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "terminal UI failed");
        eprintln!("Error: {}", err);
    }

    Ok(())
}

/// Load once, render every chart of the preset, write them out.
fn export(mut dashboard: Dashboard, worker: &LoadWorker, path: &Path) -> anyhow::Result<()> {
    let (tag, names) = dashboard.begin_load();
    worker.request(tag, names);
    let response = worker
        .wait(EXPORT_TIMEOUT)
        .ok_or_else(|| anyhow!("timed out waiting for download data"))?;
    dashboard.complete(response);
    if !matches!(dashboard.state(), LoadState::Ready(_)) {
        bail!("an error occurred while loading data (see npmcharts.log)");
    }

    let drawings = (0..dashboard.charts().len())
        .filter_map(|i| dashboard.drawing(i))
        .collect::<Result<Vec<_>, _>>()?;
    for written in write_drawings(path, &drawings)? {
        println!("{}", written.display());
    }
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> anyhow::Result<()> {
    app.resize(terminal.size()?.width);
    app.start();

    loop {
        app.drain_loads();
        terminal.draw(|frame| app.render(frame))?;

        if let Some(event) = poll_event(Duration::from_millis(50)) {
            match event {
                AppEvent::Key(key) => {
                    app.handle_key(key);
                }
                AppEvent::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                }
                AppEvent::Resize(cols, _) => app.resize(cols),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
