use thiserror::Error;

/// Everything the engine can report. Stagnation (coarsening or refinement
/// making no progress) is not an error; the driver just moves on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("out of memory allocating {what}")]
    OutOfMemory { what: &'static str },

    #[error("invalid input: {what} at index {index}")]
    InvalidInput { what: &'static str, index: usize },

    #[error("internal invariant violated: {what}")]
    InvariantViolation { what: &'static str },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error in {file} at line {line}: {what}")]
    Parse {
        file: String,
        line: usize,
        what: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
