use thiserror::Error;

/// Profiler setup failures
#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("invalid profiler url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported profiler sink scheme '{0}', only file:// sinks are supported")]
    UnsupportedScheme(String),

    #[error("profiler sink '{0}' does not name a local directory")]
    InvalidSink(String),
}
