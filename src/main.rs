//! Binary entrypoint for the terminal carousel.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use humantime::format_duration;
use rust_carousel::bootstrap::{self, Mounted};
use rust_carousel::config::Configuration;
use rust_carousel::events::HostEvent;
use rust_carousel::surface::MemorySurface;
use rust_carousel::tasks::driver;
use rust_carousel::terminal::{self, Layout, TerminalGuard, TerminalSurface};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rust-carousel", version, about = "terminal slide carousel")]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Run headless in virtual time for DURATION (e.g. "20s") and print every slide change
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    simulate: Option<Duration>,
    /// Write logs here instead of stderr (stderr shares the screen with the carousels)
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn crate_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

fn init_tracing(verbosity: u8, log_file: Option<&PathBuf>) -> Result<()> {
    // RUST_LOG controls level, default = info; -v raises this crate only
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Some(level) = crate_level(verbosity) {
        filter = filter.add_directive(
            format!("rust_carousel={level}")
                .parse()
                .context("invalid verbosity directive")?,
        );
    }
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        simulate,
        log_file,
        verbose,
    } = Args::parse();
    init_tracing(verbose, log_file.as_ref())?;

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    tracing::debug!(
        "Loaded configuration from {}:\n{:#?}",
        config.display(),
        cfg
    );

    if let Some(duration) = simulate {
        run_simulation(&cfg, duration);
        return Ok(());
    }

    run_terminal(&cfg).await
}

async fn run_terminal(cfg: &Configuration) -> Result<()> {
    let guard = TerminalGuard::enter()?;
    let (width, _) = crossterm::terminal::size().context("failed to query terminal size")?;

    let mut bands = Layout::new(width);
    let mounted = bootstrap::mount_all(cfg, |container| {
        let captions = container.slides.clone()?;
        let band = bands.push(captions.len());
        let surface =
            TerminalSurface::new(io::stdout(), band, bands.width(), &container.name, captions);
        Some(if container.counter {
            surface.with_label()
        } else {
            surface
        })
    });
    if mounted.is_empty() {
        drop(guard);
        warn!("no carousels mounted; nothing to show");
        return Ok(());
    }
    let layout = Layout::from_bands(
        width,
        mounted.iter().map(|m| m.navigator.surface().band()),
    );

    let (input_tx, input_rx) = mpsc::channel::<HostEvent>(64); // Terminal -> Driver
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let reader = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || terminal::read_input(layout, input_tx, cancel)
    });

    let result = driver::run(mounted, input_rx, cancel.clone())
        .await
        .context("carousel driver failed");
    cancel.cancel();
    if let Err(err) = reader.await {
        warn!("input reader join error: {err}");
    }
    drop(guard);

    let surfaces = result?;
    info!(carousels = surfaces.len(), "carousels torn down");
    Ok(())
}

fn run_simulation(cfg: &Configuration, duration: Duration) {
    let mut mounted = bootstrap::mount_all(cfg, |container| {
        let slides = container.slides.as_ref()?;
        let surface = MemorySurface::new(slides.len());
        Some(if container.counter {
            surface.with_label()
        } else {
            surface
        })
    });

    println!(
        "# carousel simulation\n# carousels: {}\n# duration: {}\n",
        mounted.len(),
        format_duration(duration)
    );
    if mounted.is_empty() {
        println!("(no carousels mounted)");
        return;
    }

    for m in &mounted {
        println!("  {:>8}: {}", "0s", describe(cfg, m));
    }

    loop {
        let next = mounted
            .iter()
            .filter_map(|m| m.navigator.next_deadline())
            .min();
        let Some(at) = next.filter(|at| *at <= duration) else {
            break;
        };
        for m in mounted.iter_mut() {
            if !m.navigator.advance_to(at).is_empty() {
                println!("  {:>8}: {}", format_duration(at).to_string(), describe(cfg, m));
            }
        }
    }

    for m in mounted {
        m.navigator.destroy();
    }
}

fn describe(cfg: &Configuration, mounted: &Mounted<MemorySurface>) -> String {
    let nav = &mounted.navigator;
    let index = nav.current_index();
    let caption = cfg
        .containers
        .iter()
        .find(|c| c.name == mounted.name)
        .and_then(|c| c.slides.as_ref())
        .and_then(|slides| slides.get(index))
        .map(String::as_str)
        .unwrap_or("");
    let position = nav
        .surface()
        .label_text()
        .unwrap_or_else(|| format!("{}/{}", index + 1, nav.slide_count()));
    format!("{} [{}] {}", mounted.name, position, caption)
}
