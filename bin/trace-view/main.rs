mod loader;
mod session;

use clap::Parser;
use env_logger::Env;
use log::{error, info, LevelFilter};
use rusty_trace::{load_config_or_default, AppConfig, SignalView};
use crossbeam_channel::Receiver;
use std::path::PathBuf;

/// Signal trace viewer for long one-dimensional recordings
#[derive(Parser, Debug)]
#[command(name = "trace-view")]
#[command(about = "Overview, zoom and table browsing of large signal arrays", long_about = None)]
struct Args {
    /// Signal files (.txt, .csv, .i16, .f64), one series per file
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Show z-score normalized values
    #[arg(short, long)]
    normalized: bool,

    /// Zoom to a sample index range
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"], allow_negative_numbers = true)]
    zoom: Option<Vec<String>>,

    /// Zoom to an overview pixel span
    #[arg(long, num_args = 2, value_names = ["A", "B"], allow_negative_numbers = true)]
    zoom_px: Option<Vec<i32>>,

    /// Hide a series (repeatable)
    #[arg(long, value_name = "ID")]
    hide: Vec<String>,

    /// Print the raw values of a series as a table
    #[arg(short, long, value_name = "ID")]
    table: Option<String>,

    /// Table page to print
    #[arg(short, long, default_value_t = 0)]
    page: usize,

    /// Table rows per page
    #[arg(long)]
    rows: Option<usize>,

    /// Table columns per page
    #[arg(long)]
    cols: Option<usize>,

    /// Print the detail frame as JSON instead of plotting it
    #[arg(long)]
    json: bool,

    /// Read further commands from stdin
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config_or_default(args.config.as_deref());

    let log_level = args
        .log_level
        .clone()
        .unwrap_or(config.console.verbosity.clone());
    initialize_logging(&log_level)?;
    log_startup_info(&config, &args);

    let mut data = Vec::with_capacity(args.files.len());
    for path in &args.files {
        data.push(loader::load_file(path, &config.data)?);
    }

    let mut view = SignalView::new(&config)?;
    let (tx, events) = crossbeam_channel::unbounded();
    view.subscribe(tx);
    view.load_series(data)?;

    if let Err(e) = apply_args(&mut view, &args) {
        error!("{}", e);
        session::print_events(&events);
        return Err(e.into());
    }

    if args.interactive {
        session::print_events(&events);
        session::print_detail(&view);
        let shutdown = setup_shutdown_handler()?;
        session::run(&mut view, &events, &shutdown)?;
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view.detail())?);
    } else {
        session::print_events(&events);
        session::print_detail(&view);
    }

    if let Some(page) = view.current_page() {
        session::print_page(&view, &page)?;
    }

    Ok(())
}

/// Apply the one-shot view settings given on the command line
fn apply_args(view: &mut SignalView, args: &Args) -> rusty_trace::Result<()> {
    for id in &args.hide {
        view.set_visibility(id, false)?;
    }
    view.set_view_mode(args.normalized);

    if let Some([from, to]) = args.zoom.as_deref() {
        let (from, to) = rusty_trace::utils::parse_zoom_bounds(from, to)?;
        view.commit_zoom_values(from as f64, to as f64)?;
    }
    if let Some(&[a, b]) = args.zoom_px.as_deref() {
        view.commit_zoom_pixels(a, b)?;
    }

    if let Some(id) = &args.table {
        let viewport = view.viewport();
        let rows = args.rows.unwrap_or(viewport.rows);
        let cols = args.cols.unwrap_or(viewport.cols);
        session::check_viewport(rows, cols)?;
        view.configure_viewport(rows, cols)?;
        view.open_table(id)?;
        view.seek_page(args.page)?;
    }
    Ok(())
}

fn log_startup_info(config: &AppConfig, args: &Args) {
    info!("=== Rusty Trace Viewer ===");
    if let Some(path) = &args.config {
        info!("Configuration: {}", path.display());
    }
    info!(
        "Overview: {} bins on {}x{} px, detail: {} bins",
        config.view.overview_bins,
        config.view.overview_width,
        config.view.overview_height,
        config.view.detail_bins
    );
    if config.data.in_pa {
        info!(
            "Calibrating int16 input to pA (offset {}, scale {})",
            config.data.calibration_offset, config.data.calibration_scale
        );
    }
}

fn setup_shutdown_handler() -> Result<Receiver<()>, ctrlc::Error> {
    let (shutdown_tx, shutdown) = crossbeam_channel::bounded(1);

    ctrlc::set_handler(move || {
        info!("Ctrl+C received - ending session...");
        let _ = shutdown_tx.try_send(());
    })?;

    Ok(shutdown)
}

/// Initialize logging with configurable level
fn initialize_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => {
            eprintln!("Warning: Invalid log level '{}', using 'info'", log_level);
            LevelFilter::Info
        }
    };

    env_logger::Builder::from_env(Env::default())
        .filter_level(level)
        .format_timestamp_millis()
        .init();

    Ok(())
}
