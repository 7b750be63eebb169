use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while computing what an environment exposes
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("failed to determine the working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("failed to mount configuration directory {}: {source}", path.display())]
    Mount {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dotenv file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}
