use ndarray::Array2;

use crate::error::{Result, TraceError};
use crate::paginator::{Cell, Page};

pub const MESSAGE_INVALID_ZOOM_INPUT: &str = "Invalid input - only full numbers are allowed.";

/// Parse the two fields of the numeric zoom entry.
///
/// Both must hold a whole number; surrounding whitespace is ignored. The
/// values are returned as typed, ordering and clamping happen on commit.
///
/// # Example
/// ```
/// use rusty_trace::utils::parse_zoom_bounds;
///
/// assert_eq!(parse_zoom_bounds(" 100", "2500 ").unwrap(), (100, 2500));
/// assert!(parse_zoom_bounds("1.5", "20").is_err());
/// ```
pub fn parse_zoom_bounds(from: &str, to: &str) -> Result<(i64, i64)> {
    let parse = |field: &str| {
        field
            .trim()
            .parse::<i64>()
            .map_err(|_| TraceError::InvalidInput(MESSAGE_INVALID_ZOOM_INPUT.to_string()))
    };
    Ok((parse(from)?, parse(to)?))
}

/// Render one table page as fixed-width text with row labels.
///
/// Missing cells print as blanks.
pub fn render_table(page: &Page, cells: &Array2<Cell>, decimals: usize, cell_width: usize) -> String {
    let labels = page.row_labels();
    let label_width = labels
        .last()
        .map(|l| l.to_string().len())
        .unwrap_or(1);

    let mut out = String::new();
    for (label, row) in labels.iter().zip(cells.rows()) {
        out.push_str(&format!("{label:>label_width$} |"));
        for cell in row {
            out.push_str(&format!(" {:>cell_width$}", cell.format(decimals)));
        }
        // drop the padding of trailing missing cells
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginator::Paginator;

    #[test]
    fn test_parse_whole_numbers() {
        assert_eq!(parse_zoom_bounds("0", "1000").unwrap(), (0, 1000));
        assert_eq!(parse_zoom_bounds("900", "-5").unwrap(), (900, -5));
    }

    #[test]
    fn test_parse_rejects_non_integers() {
        for (from, to) in [("1.5", "3"), ("", "3"), ("10", "abc"), ("1e3", "2")] {
            match parse_zoom_bounds(from, to) {
                Err(TraceError::InvalidInput(msg)) => assert_eq!(msg, MESSAGE_INVALID_ZOOM_INPUT),
                other => panic!("expected InvalidInput for ({from:?}, {to:?}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_render_table() {
        let values = [1.0, 2.5, -3.25, 4.0, 5.0];
        let paginator = Paginator::new(values.len(), 2, 3).unwrap();
        let page = paginator.get_page(0).unwrap();
        let cells = page.cells(&values).unwrap();

        let text = render_table(&page, &cells, 2, 6);
        assert_eq!(
            text,
            "0 |   1.00   2.50  -3.25\n3 |   4.00   5.00\n"
        );
    }
}
