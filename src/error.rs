use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Empty input: {0}")]
    EmptyInput(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Unknown series: {0}")]
    UnknownSeries(String),
    #[error("Page index {index} out of range (page count {count})")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Invalid viewport: {rows} rows x {cols} columns")]
    InvalidViewport { rows: usize, cols: usize },
    #[error("{0}")]
    InvalidInput(String),
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, TraceError>;
