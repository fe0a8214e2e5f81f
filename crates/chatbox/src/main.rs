//! A terminal chat widget built on `chatbox` as a library.

#[macro_use]
extern crate tracing;

mod app;
mod tui;
mod ui;

use std::fs::File;
use std::io;
use std::process::ExitCode;
use std::sync::Mutex;

use chatbox::Config;
use owo_colors::OwoColorize;
use tokio::select;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::tui::{EventHandler, Tui};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("{} cannot open log file: {err}", "error:".red().bold());
        return ExitCode::FAILURE;
    }

    info!("talking to {}", config.http_config().endpoint());
    let app = App::new(config.chat_builder().build(), config.identity());

    match run(app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("terminal error: {err}");
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Logs go to a file, the terminal belongs to the UI.
fn init_logging(config: &Config) -> io::Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::options().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run(mut app: App) -> io::Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = event_loop(&mut terminal, &mut events, &mut app).await;
    tui::restore()?;
    result
}

async fn event_loop(
    terminal: &mut Tui,
    events: &mut EventHandler,
    app: &mut App,
) -> io::Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| ui::render(app, frame))?;

        select! {
            event = events.next() => {
                let Some(event) = event else {
                    break;
                };
                app.handle_event(event);
            }
            finished = app.chat_mut().next_finished() => {
                if let Some(finished) = finished {
                    let outcome = app.chat_mut().apply(finished);
                    trace!("applied reply: {outcome:?}");
                }
            }
        }
    }
    Ok(())
}
