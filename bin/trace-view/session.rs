use crossbeam_channel::{select, Receiver};
use log::{debug, info};
use rusty_trace::utils::{parse_zoom_bounds, render_table};
use rusty_trace::{plotting, Page, SignalView, TraceError, ViewEvent};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::thread;

/// Largest row or column count a printed table may have
pub const MAX_VIEWPORT_CELLS: usize = 1000;

const HELP: &str = "\
Commands:
  zoom FROM TO     zoom to a sample index range
  px A B           zoom to an overview pixel span
  reset            show the full range
  hover PX         sample index under an overview pixel
  hide ID | show ID
  norm | raw       switch between normalized and raw values
  table ID         browse the raw values of a series
  viewport R C     table rows and columns per page
  page N | next | prev
  plot             redraw the detail view
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Zoom(String, String),
    Pixels(i32, i32),
    Reset,
    Hover(i32),
    Hide(String),
    Show(String),
    Normalized(bool),
    Table(String),
    Viewport(usize, usize),
    Page(usize),
    Next,
    Prev,
    Plot,
    Help,
    Quit,
}

fn argument<'a>(parts: &[&'a str], i: usize) -> Result<&'a str, String> {
    parts
        .get(i)
        .copied()
        .ok_or_else(|| format!("'{}' needs more arguments, see 'help'", parts[0]))
}

fn number<T: FromStr>(parts: &[&str], i: usize) -> Result<T, String> {
    let field = argument(parts, i)?;
    field
        .parse::<T>()
        .map_err(|_| format!("'{}' is not a valid number for '{}'", field, parts[0]))
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let arg = |i: usize| argument(&parts, i).map(str::to_string);

    let Some(&name) = parts.first() else {
        return Err("empty command".to_string());
    };

    let command = match name {
        "zoom" => Command::Zoom(arg(1)?, arg(2)?),
        "px" => Command::Pixels(number(&parts, 1)?, number(&parts, 2)?),
        "reset" => Command::Reset,
        "hover" => Command::Hover(number(&parts, 1)?),
        "hide" => Command::Hide(arg(1)?),
        "show" => Command::Show(arg(1)?),
        "norm" => Command::Normalized(true),
        "raw" => Command::Normalized(false),
        "table" => Command::Table(arg(1)?),
        "viewport" => Command::Viewport(number(&parts, 1)?, number(&parts, 2)?),
        "page" => Command::Page(number(&parts, 1)?),
        "next" => Command::Next,
        "prev" => Command::Prev,
        "plot" => Command::Plot,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}', see 'help'", other)),
    };
    Ok(command)
}

/// Reject tables too large to print
pub fn check_viewport(rows: usize, cols: usize) -> Result<(), TraceError> {
    if rows > MAX_VIEWPORT_CELLS || cols > MAX_VIEWPORT_CELLS {
        return Err(TraceError::InvalidViewport { rows, cols });
    }
    Ok(())
}

/// Apply one command. Returns false when the session should end.
pub fn execute(view: &mut SignalView, command: Command) -> Result<bool, TraceError> {
    match command {
        Command::Zoom(from, to) => {
            let (from, to) = parse_zoom_bounds(&from, &to)?;
            view.commit_zoom_values(from as f64, to as f64)?;
            print_detail(view);
        }
        Command::Pixels(a, b) => {
            view.commit_zoom_pixels(a, b)?;
            print_detail(view);
        }
        Command::Reset => {
            view.reset_zoom();
            print_detail(view);
        }
        Command::Hover(px) => match view.hover_index(px) {
            Some(index) => println!("pixel {} -> sample {}", px, index),
            None => println!("no data loaded"),
        },
        Command::Hide(id) => view.set_visibility(&id, false)?,
        Command::Show(id) => view.set_visibility(&id, true)?,
        Command::Normalized(normalized) => {
            view.set_view_mode(normalized);
            print_detail(view);
        }
        Command::Table(id) => {
            let page = view.open_table(&id)?;
            print_page(view, &page)?;
        }
        Command::Viewport(rows, cols) => {
            check_viewport(rows, cols)?;
            view.configure_viewport(rows, cols)?;
            if let Some(page) = view.current_page() {
                print_page(view, &page)?;
            }
        }
        Command::Page(index) => {
            let page = view.seek_page(index)?;
            print_page(view, &page)?;
        }
        Command::Next => {
            let page = view.step_page(1)?;
            print_page(view, &page)?;
        }
        Command::Prev => {
            let page = view.step_page(-1)?;
            print_page(view, &page)?;
        }
        Command::Plot => print_detail(view),
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Read commands from stdin until `quit`, end of input or a shutdown signal
pub fn run(
    view: &mut SignalView,
    events: &Receiver<ViewEvent>,
    shutdown: &Receiver<()>,
) -> io::Result<()> {
    info!("Interactive session started, type 'help' for commands");
    let lines = spawn_stdin_reader();
    drive(view, events, &lines, shutdown)?;
    info!("Session ended");
    Ok(())
}

/// Forward stdin lines to a channel so the session can wait on them and on
/// shutdown at the same time
fn spawn_stdin_reader() -> Receiver<io::Result<String>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn drive(
    view: &mut SignalView,
    events: &Receiver<ViewEvent>,
    lines: &Receiver<io::Result<String>>,
    shutdown: &Receiver<()>,
) -> io::Result<()> {
    loop {
        print!("trace> ");
        io::stdout().flush()?;

        select! {
            recv(shutdown) -> _ => {
                println!();
                return Ok(());
            }
            recv(lines) -> line => {
                let Ok(line) = line else {
                    // stdin closed
                    return Ok(());
                };
                if !handle_line(view, &line?) {
                    return Ok(());
                }
                print_events(events);
            }
        }
    }
}

/// Parse and apply one input line. Returns false when the session should end.
fn handle_line(view: &mut SignalView, line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    match parse_command(line) {
        Ok(command) => {
            debug!("Command: {:?}", command);
            execute(view, command).unwrap_or_else(|e| {
                println!("{}", e);
                true
            })
        }
        Err(message) => {
            println!("{}", message);
            true
        }
    }
}

/// Print status notifications collected since the last call
pub fn print_events(events: &Receiver<ViewEvent>) {
    for event in events.try_iter() {
        match event {
            ViewEvent::Status(message) => println!("{}", message),
            ViewEvent::SeriesSkipped { id, reason } => println!("Skipped {}: {}", id, reason),
            ViewEvent::ZoomChanged(zoom) => debug!(
                "Zoom now {:.4}..{:.4}",
                zoom.start_ratio(),
                zoom.end_ratio()
            ),
            ViewEvent::DetailRendered { bin_size } => debug!("Detail bin size {}", bin_size),
            ViewEvent::PageChanged(page) => debug!(
                "Page {} ({}..{})",
                page.index, page.start_index, page.end_index
            ),
        }
    }
}

pub fn print_detail(view: &SignalView) {
    println!(
        "{}",
        plotting::zoom_ruler(view.zoom(), view.overview().width().min(100) as usize)
    );
    if let Some(frame) = view.detail() {
        if let Err(e) = plotting::plot_frame(frame, &view.y_axis_label(), None, None) {
            println!("{}", e);
        }
    }
}

pub fn print_page(view: &SignalView, page: &Page) -> Result<(), TraceError> {
    let cells = view.page_cells(page)?;
    let page_count = view
        .table()
        .map(|t| t.paginator().page_count())
        .unwrap_or(1);
    if let Some(table) = view.table() {
        println!(
            "{} | page {}/{} | samples {}..{}",
            table.id(),
            page.index + 1,
            page_count,
            page.start_index,
            page.end_index
        );
    }
    print!("{}", render_table(page, &cells, view.decimals(), 12));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_trace::AppConfig;

    fn loaded_view() -> SignalView {
        let mut view = SignalView::new(&AppConfig::default()).unwrap();
        view.load_series(vec![("a", (0..1000).map(|i| i as f64).collect::<Vec<_>>())])
            .unwrap();
        view
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("zoom 10 200").unwrap(),
            Command::Zoom("10".to_string(), "200".to_string())
        );
        assert_eq!(parse_command("  px 5 -3 ").unwrap(), Command::Pixels(5, -3));
        assert_eq!(parse_command("viewport 4 8").unwrap(), Command::Viewport(4, 8));
        assert_eq!(parse_command("norm").unwrap(), Command::Normalized(true));
        assert_eq!(parse_command("q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("zoom 10").is_err());
        assert!(parse_command("page x").is_err());
        assert!(parse_command("fly").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_numbers() {
        assert!(parse_command("px 4294967346 0").is_err());
        assert!(parse_command("hover -2147483649").is_err());
        assert!(parse_command("viewport -1 4").is_err());
        assert!(parse_command("page -3").is_err());
        assert_eq!(
            parse_command("px -2147483648 2147483647").unwrap(),
            Command::Pixels(i32::MIN, i32::MAX)
        );
    }

    #[test]
    fn test_oversized_viewport_is_an_error() {
        let mut view = loaded_view();
        execute(&mut view, Command::Table("a".into())).unwrap();

        let command = parse_command("viewport 9999999999 9999999999").unwrap();
        assert!(matches!(
            execute(&mut view, command),
            Err(TraceError::InvalidViewport { .. })
        ));
        assert!(execute(&mut view, Command::Viewport(MAX_VIEWPORT_CELLS + 1, 1)).is_err());
        assert_eq!(view.current_page().unwrap().bin_size(), 100);

        // extreme pixels clamp instead of failing
        assert!(execute(&mut view, Command::Pixels(i32::MIN, i32::MAX)).unwrap());
        assert!(view.zoom().is_full());
    }

    #[test]
    fn test_shutdown_ends_waiting_session() {
        let mut view = loaded_view();
        let (_events_tx, events) = crossbeam_channel::unbounded();
        let (_lines_tx, lines) = crossbeam_channel::unbounded::<io::Result<String>>();
        let (shutdown_tx, shutdown) = crossbeam_channel::bounded(1);

        // no input line ever arrives, only the signal
        shutdown_tx.send(()).unwrap();
        assert!(drive(&mut view, &events, &lines, &shutdown).is_ok());
    }

    #[test]
    fn test_session_runs_lines_until_quit() {
        let mut view = loaded_view();
        let (_events_tx, events) = crossbeam_channel::unbounded();
        let (lines_tx, lines) = crossbeam_channel::unbounded();
        let (_shutdown_tx, shutdown) = crossbeam_channel::bounded::<()>(1);

        for line in ["zoom 100 200", "", "bogus", "quit", "reset"] {
            lines_tx.send(Ok(line.to_string())).unwrap();
        }
        drive(&mut view, &events, &lines, &shutdown).unwrap();

        // the line after quit is never applied
        assert_eq!(view.detail().unwrap().start_index, 100);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_session_ends_when_input_closes() {
        let mut view = loaded_view();
        let (_events_tx, events) = crossbeam_channel::unbounded();
        let (lines_tx, lines) = crossbeam_channel::unbounded();
        let (_shutdown_tx, shutdown) = crossbeam_channel::bounded::<()>(1);

        lines_tx.send(Ok("hide a".to_string())).unwrap();
        drop(lines_tx);
        drive(&mut view, &events, &lines, &shutdown).unwrap();
        assert!(!view.visibility().is_visible("a"));
    }

    #[test]
    fn test_execute_zoom_and_paging() {
        let mut view = SignalView::new(&AppConfig::default()).unwrap();
        view.load_series(vec![("a", (0..1000).map(|i| i as f64).collect::<Vec<_>>())])
            .unwrap();

        assert!(execute(&mut view, Command::Zoom("250".into(), "500".into())).unwrap());
        assert_eq!(view.detail().unwrap().start_index, 250);

        assert!(matches!(
            execute(&mut view, Command::Zoom("2.5".into(), "500".into())),
            Err(TraceError::InvalidInput(_))
        ));

        execute(&mut view, Command::Table("a".into())).unwrap();
        execute(&mut view, Command::Viewport(5, 10)).unwrap();
        execute(&mut view, Command::Next).unwrap();
        assert_eq!(view.current_page().unwrap().start_index, 50);

        assert!(!execute(&mut view, Command::Quit).unwrap());
    }
}
