use rusty_trace::plotting::{plot_frame, zoom_ruler};
use rusty_trace::utils::render_table;
use rusty_trace::{AppConfig, SignalView, ViewEvent};
use std::error::Error;

/// Walk through overview, zoom and table paging on synthetic traces
///
/// Usage: cargo run --example zoom_walkthrough [samples]
/// Example: cargo run --example zoom_walkthrough 2000000
fn main() -> Result<(), Box<dyn Error>> {
    let samples: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000_000);

    println!("Zoom Walkthrough");
    println!("================");
    println!("Samples in longest trace: {}", samples);
    println!();

    // a slow wave with rare single-sample spikes, plus a shorter noisy trace
    let wave: Vec<f64> = (0..samples)
        .map(|i| {
            let t = i as f64 / samples as f64;
            let spike = if i % 9973 == 0 { 50.0 } else { 0.0 };
            (t * 40.0).sin() * 80.0 + 100.0 + spike
        })
        .collect();
    let short: Vec<f64> = (0..samples / 3)
        .map(|i| ((i * 7919) % 211) as f64 / 10.0 + 60.0)
        .collect();

    let mut view = SignalView::new(&AppConfig::default())?;
    let (tx, events) = crossbeam_channel::unbounded();
    view.subscribe(tx);
    view.load_series(vec![("wave", wave), ("short", short)])?;

    println!("Full range");
    println!("{}", zoom_ruler(view.zoom(), 60));
    if let Some(frame) = view.detail() {
        plot_frame(frame, &view.y_axis_label(), Some(100), Some(30))?;
    }

    // a click in the overview zooms to a 2 pixel wide window
    view.commit_zoom_pixels(120, 120)?;
    println!("\nClick at pixel 120");
    println!("{}", zoom_ruler(view.zoom(), 60));
    if let Some(frame) = view.detail() {
        plot_frame(frame, &view.y_axis_label(), Some(100), Some(30))?;
    }

    // zoom past the end of the short trace, it drops out of the detail view
    let end = samples as f64;
    view.commit_zoom_values(end * 0.8, end)?;
    println!("\nLast fifth, normalized");
    view.set_view_mode(true);
    if let Some(frame) = view.detail() {
        plot_frame(frame, &view.y_axis_label(), Some(100), Some(30))?;
    }

    view.open_table("short")?;
    view.configure_viewport_pixels(600, 200)?;
    let page = view.step_page(3)?;
    let cells = view.page_cells(&page)?;
    println!("\nTable of 'short', page {}", page.index);
    print!("{}", render_table(&page, &cells, view.decimals(), 10));

    println!("\nEvents");
    for event in events.try_iter() {
        match event {
            ViewEvent::Status(message) => println!("  status: {}", message),
            other => println!("  {:?}", other),
        }
    }

    Ok(())
}
