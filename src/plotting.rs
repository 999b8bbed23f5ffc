use textplots::{Chart, Plot, Shape};

use crate::aggregate::AggregationResult;
use crate::detail::DetailFrame;
use crate::error::{Result, TraceError};
use crate::types::ZoomWindow;

// textplots refuses smaller canvases
const MIN_WIDTH: usize = 32;
const MIN_HEIGHT: usize = 3;

/// Determine the best scale and unit for a given maximum value
fn determine_scale(max_value: f64) -> (f64, &'static str) {
    // a flat zero trace has no magnitude to scale
    if max_value == 0.0 || max_value >= 1.0 {
        (1.0, "")
    } else if max_value >= 1e-3 {
        (1e3, "m")
    } else if max_value >= 1e-6 {
        (1e6, "μ")
    } else if max_value >= 1e-9 {
        (1e9, "n")
    } else {
        (1e12, "p")
    }
}

/// Plot one aggregated series against its absolute data indices
///
/// Bins holding NaN are left out. A series with such gaps is drawn as points
/// only, so no line bridges the missing stretch.
///
/// # Examples
/// ```
/// use rusty_trace::aggregate::aggregate;
/// use rusty_trace::plotting::plot_series;
///
/// let data: Vec<f64> = (0..500).map(|i| (i as f64 / 20.0).sin() * 1e-12).collect();
/// let result = aggregate(&data, 100).unwrap();
/// plot_series(&result, Some("Current Signal"), None, None).unwrap();
/// ```
pub fn plot_series(
    result: &AggregationResult,
    title: Option<&str>,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<()> {
    let Some((min_value, max_value)) = result.value_range() else {
        return Err(TraceError::EmptyInput(
            "cannot plot a series without finite values".to_string(),
        ));
    };

    let width = width.unwrap_or(140).max(MIN_WIDTH);
    let height = height.unwrap_or(60).max(MIN_HEIGHT);
    let max_abs = max_value.abs().max(min_value.abs());

    let (value_scale, value_unit) = determine_scale(max_abs);

    let frame: Vec<(f32, f32)> = result
        .points()
        .filter(|(_, y)| !y.is_nan())
        .map(|(x, y)| (x as f32, (y * value_scale) as f32))
        .collect();

    let x_min = frame.first().map(|p| p.0).unwrap_or(0.0);
    let x_max = frame.last().map(|p| p.0).unwrap_or(0.0).max(x_min + 1.0);

    if let Some(title) = title {
        println!("{}", title);
    } else {
        println!("Data Plot");
    }
    println!("X-axis: Sample Index | Y-axis: {}units", value_unit);
    println!(
        "Range: {} points x {} samples | Values: {:.3} to {:.3} {}units",
        result.len(),
        result.bin_size,
        min_value * value_scale,
        max_value * value_scale,
        value_unit
    );
    println!("{}", "─".repeat(width));

    let shape = if result.has_gaps() {
        Shape::Points(&frame)
    } else {
        Shape::Lines(&frame)
    };
    Chart::new(width as u32, height as u32, x_min, x_max)
        .lineplot(&shape)
        .nice();

    println!("Sample Index →");

    Ok(())
}

/// Plot every series of a detail frame, one chart each, in display order
pub fn plot_frame(
    frame: &DetailFrame,
    y_label: &str,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<()> {
    println!(
        "{} | samples {}..{}",
        y_label, frame.start_index, frame.end_index
    );
    println!("{}", frame.fidelity_notice());

    for (id, result) in &frame.series {
        if let Err(e) = plot_series(result, Some(id.as_str()), width, height) {
            log::warn!("Not plotting '{}': {}", id, e);
        }
    }
    for gap in &frame.gaps {
        println!("{}: {}", gap.id, gap.reason);
    }
    Ok(())
}

/// One-line picture of where the zoom sits within the full range, e.g.
/// `[----#####-----------]`
pub fn zoom_ruler(zoom: ZoomWindow, width: usize) -> String {
    let width = width.max(1);
    let start = (zoom.start_ratio() * width as f64).floor() as usize;
    let end = ((zoom.end_ratio() * width as f64).ceil() as usize)
        .max(start + 1)
        .min(width);
    let start = start.min(end.saturating_sub(1));

    let mut ruler = String::with_capacity(width + 2);
    ruler.push('[');
    for i in 0..width {
        ruler.push(if (start..end).contains(&i) { '#' } else { '-' });
    }
    ruler.push(']');
    ruler
}
