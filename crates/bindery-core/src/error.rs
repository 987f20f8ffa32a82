use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Illegal run phase transition: {from} -> {to}")]
    Phase { from: &'static str, to: &'static str },

    #[error("Import cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}
