//! A scroll-driven presentation for the terminal.
//!
//! Plays a short intro, then a long page whose sections animate against the
//! scroll position: a pinned title that slides sideways, an eased cursor,
//! letters you can throw around with the mouse and a light/dark toggle.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Frame, Terminal};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState},
};
use crate::config::{AppConfig, FileStore};
use crate::core::theme::ThemeStore;
use crate::ui::{intro_widget::IntroWidget, layout::AppLayout, stage_widget::StageWidget, theme::Theme};

const STAGE_HINT: &str = " j/k scroll · 1-4 sections · drag the letters · t theme · q quit";
const INTRO_HINT: &str = " esc skip · q quit";

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Scroll-driven terminal presentation")]
struct Cli {
    /// Go straight to the page.
    #[arg(long = "no-intro")]
    no_intro: bool,

    /// Frames per second (overrides the config file).
    #[arg(long)]
    fps: Option<u32>,

    /// Config file to read and persist the theme to.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here instead of stderr.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

// ───────────────────────────────────────── setup ─────────────

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let writer = match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("opening log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        // never pollute stdout
        None => BoxMakeWriter::new(io::stderr),
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> (AppConfig, PathBuf) {
    let path = cli.config.clone().unwrap_or_else(config::config_path);
    let mut config = AppConfig::load(&path);
    if !path.exists() {
        if let Err(err) = config.save(&path) {
            tracing::warn!("could not write default config: {err:#}");
        }
    }
    if let Some(fps) = cli.fps {
        config.fps = fps.clamp(config::MIN_FPS, config::MAX_FPS);
    }
    (config, path)
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &AppState) {
    let layout = AppLayout::from_area(frame.area());
    let theme = Theme::for_mode(state.palette_mode.get());

    let hint = match state.active_view {
        ActiveView::Intro => {
            let view = state.intro_view().unwrap_or_default();
            frame.render_widget(
                IntroWidget {
                    label: view.label,
                    opacity: view.opacity,
                    stretch: &view.stretch,
                },
                layout.stage_area,
            );
            INTRO_HINT
        }
        ActiveView::Stage => {
            if let Some(stage) = &state.stage {
                frame.render_widget(
                    StageWidget {
                        table: &state.table,
                        visuals: &stage.visuals,
                        theme,
                        mode: state.palette_mode.get(),
                        clock: state.clock.value(),
                        hovered: state.hovered,
                    },
                    layout.stage_area,
                );
            }
            STAGE_HINT
        }
    };

    let status_text = state.status_message.as_deref().unwrap_or(hint);
    let status = Paragraph::new(status_text).style(theme.status_bar_style());
    frame.render_widget(status, layout.status_area);
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let (config, config_path) = load_config(&cli);
    let frame_interval = Duration::from_secs_f64(config.frame_interval());
    let theme = ThemeStore::load(FileStore::new(config_path));
    let size = terminal::size()?;
    let mut state = AppState::new(config, theme, size, !cli.no_intro)?;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = run(&mut terminal, &mut state, frame_interval).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut AppState,
    frame_interval: Duration,
) -> Result<()> {
    let mut events = spawn_event_reader(frame_interval);
    let mut last_frame = Instant::now();
    terminal.draw(|frame| draw(frame, state))?;

    while let Some(event) = events.recv().await {
        match event {
            AppEvent::Key(k) => handler::handle_key(state, k),
            AppEvent::Mouse(m) => handler::handle_mouse(state, m),
            AppEvent::Resize(w, h) => state.resize(w, h)?,
            AppEvent::Frame => {
                let now = Instant::now();
                let dt = now.duration_since(last_frame).as_secs_f64();
                last_frame = now;
                state.on_frame(dt)?;
                terminal.draw(|frame| draw(frame, state))?;
            }
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}
