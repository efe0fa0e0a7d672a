//! traces-reader - highlight log files with regular expression rules

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use traces_reader::cli::CliArgs;
use traces_reader::config::Settings;
use traces_reader::error::{Error, Result};
use traces_reader::highlight::{load_configurations, Configuration, Engine, Event};
use traces_reader::host::Host;
use traces_reader::logging;
use traces_reader::render;
use traces_reader::watch::FileWatcher;
use traces_reader::workspace::Workspace;

/// Delay used to coalesce bursts of writes to a watched file
const DEBOUNCE_MS: u64 = 200;

fn main() {
    let args = CliArgs::parse();
    logging::init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<()> {
    let settings = args.apply(Settings::load());
    let configurations = read_configurations(settings.configurations.as_deref())?;

    let mut workspace = Workspace::with_root(std::env::current_dir()?);
    for file in &args.files {
        if !file.is_file() {
            return Err(Error::FileNotFound(file.display().to_string()));
        }
        workspace.open_file(file)?;
    }

    let mut engine = Engine::new();
    let visible = workspace.visible_buffers();
    engine.handle(&mut workspace, Event::VisibilityChanged(visible));
    engine.handle(&mut workspace, Event::ConfigChanged(configurations));
    engine.handle(&mut workspace, Event::Tick);

    render::render_workspace(&mut io::stdout(), &workspace, render::terminal_width(), settings.follow)?;

    if settings.follow {
        follow(&mut engine, &mut workspace, &settings, &args.files)?;
    }
    Ok(())
}

/// Load the rule file, or start with no configurations when none is set
fn read_configurations(path: Option<&Path>) -> Result<Vec<Configuration>> {
    let Some(path) = path else {
        tracing::info!("No configuration file given");
        return Ok(Vec::new());
    };
    if !path.is_file() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    load_configurations(path)
}

/// Watch the files and redraw as they change; runs until interrupted
///
/// Thread ids are rediscovered after every batch of log changes, so an id
/// first seen after startup still gets its color.
fn follow(engine: &mut Engine, workspace: &mut Workspace, settings: &Settings, files: &[PathBuf]) -> Result<()> {
    let config_path = settings.configurations.as_ref().and_then(|p| p.canonicalize().ok());

    let mut watched = files.to_vec();
    watched.extend(config_path.iter().cloned());
    let watcher = FileWatcher::new(&watched, Duration::from_millis(DEBOUNCE_MS))?;
    let interval = Duration::from_millis(settings.tick_interval_ms);

    loop {
        let changed = watcher.wait(interval);
        let mut reloaded = false;

        for path in &changed {
            if config_path.as_ref() == Some(path) {
                match load_configurations(path) {
                    Ok(configurations) => {
                        engine.handle(workspace, Event::ConfigChanged(configurations));
                    }
                    Err(e) => tracing::warn!("Keeping previous configurations: {}", e),
                }
                continue;
            }

            let Some(id) = workspace.find_file(path) else {
                continue;
            };
            match workspace.reload(id) {
                Ok(true) => {
                    engine.handle(workspace, Event::ContentChanged(id));
                    reloaded = true;
                }
                Ok(false) => {}
                Err(e) => tracing::warn!("Could not reload {}: {}", path.display(), e),
            }
        }

        if reloaded {
            engine.handle(workspace, Event::Rediscover);
        }

        let report = engine.handle(workspace, Event::Tick);
        if !changed.is_empty() || !report.is_idle() {
            render::render_workspace(&mut io::stdout(), workspace, render::terminal_width(), true)?;
        }
    }
}
