use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task source error: {0}")]
    TaskSource(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("orchestrator error: {0}")]
    Orchestrator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
