use thiserror::Error;

#[derive(Error, Debug)]
pub enum MortgageError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MortgageError>;
