use crate::container::ServiceError;
use crate::env::EnvironmentError;
use crate::profiler::ProfilerError;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// Failures aborting an application run before any command is invoked
#[derive(Error, Debug)]
pub enum LaunchpadError {
    #[error("[E{code:04}] Environment error: {0}", code = environment_code(.0))]
    Environment(#[from] EnvironmentError),

    #[error("[E{code:04}] Profiler error: {0}", code = profiler_code(.0))]
    Profiler(#[from] ProfilerError),

    #[error("[E{code:04}] Service error: {0}", code = service_code(.0))]
    Service(#[from] ServiceError),

    #[error("[E{code:04}] Failed to resolve commands: {source}", code = ErrorCode::COMMAND_FACTORY_FAILED)]
    Factory {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl LaunchpadError {
    /// Wrap an error returned by a command factory
    ///
    /// Service resolution failures keep their own variant.
    pub fn factory(error: anyhow::Error) -> Self {
        match error.downcast::<ServiceError>() {
            Ok(service) => Self::Service(service),
            Err(error) => Self::Factory {
                source: error.into(),
            },
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Environment(e) => environment_code(e),
            Self::Profiler(e) => profiler_code(e),
            Self::Service(e) => service_code(e),
            Self::Factory { .. } => ErrorCode::COMMAND_FACTORY_FAILED,
        }
    }

    /// Get the exit code for this error
    ///
    /// Configuration problems map to `EX_CONFIG`, the rest to `EX_SOFTWARE`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Environment(_) | Self::Profiler(_) => 78,
            Self::Service(_) | Self::Factory { .. } => 70,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Environment(e) => format!("Configuration problem: {e}"),
            Self::Profiler(e) => format!(
                "Profiler problem: {e} (unset {} to run without profiling)",
                crate::profiler::ACTIVATION_VARIABLE
            ),
            Self::Service(e) => format!("Service problem: {e}"),
            Self::Factory { source } => format!("Commands could not be created: {source}"),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        message
    }
}

/// Type alias for Results using LaunchpadError
pub type Result<T> = std::result::Result<T, LaunchpadError>;

fn environment_code(error: &EnvironmentError) -> u16 {
    match error {
        EnvironmentError::WorkingDirectory(_) => ErrorCode::CONFIG_WORKING_DIRECTORY,
        EnvironmentError::Mount { .. } => ErrorCode::CONFIG_DOTENV_MOUNT,
        EnvironmentError::Read { .. } => ErrorCode::CONFIG_DOTENV_READ,
        EnvironmentError::Parse { .. } => ErrorCode::CONFIG_DOTENV_PARSE,
    }
}

fn profiler_code(error: &ProfilerError) -> u16 {
    match error {
        ProfilerError::InvalidUrl { .. } => ErrorCode::PROFILER_INVALID_URL,
        ProfilerError::UnsupportedScheme(_) => ErrorCode::PROFILER_UNSUPPORTED_SCHEME,
        ProfilerError::InvalidSink(_) => ErrorCode::PROFILER_INVALID_SINK,
    }
}

fn service_code(error: &ServiceError) -> u16 {
    match error {
        ServiceError::NotFound(_) => ErrorCode::SERVICE_NOT_FOUND,
        ServiceError::TypeMismatch { .. } => ErrorCode::SERVICE_TYPE_MISMATCH,
        ServiceError::Circular(_) => ErrorCode::SERVICE_CIRCULAR_DEPENDENCY,
        ServiceError::Factory { .. } => ErrorCode::SERVICE_FACTORY_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_environment_errors_are_configuration_problems() {
        let err = LaunchpadError::from(EnvironmentError::Read {
            path: PathBuf::from("/app/.env"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });

        assert_eq!(err.code(), ErrorCode::CONFIG_DOTENV_READ);
        assert_eq!(err.exit_code(), 78);
        assert!(err.to_string().starts_with("[E1003]"));
        assert!(err.user_message().contains("/app/.env"));
        assert!(err.developer_message().contains("caused by: denied"));
    }

    #[test]
    fn test_profiler_errors() {
        let err = LaunchpadError::from(ProfilerError::UnsupportedScheme("https".to_string()));

        assert_eq!(err.code(), ErrorCode::PROFILER_UNSUPPORTED_SCHEME);
        assert!(err.to_string().contains("[E2002]"));
        assert!(err.user_message().contains("PROFILER"));
    }

    #[test]
    fn test_factory_errors_keep_service_failures() {
        let service = LaunchpadError::factory(ServiceError::NotFound("db".to_string()).into());
        assert!(matches!(service, LaunchpadError::Service(ServiceError::NotFound(_))));
        assert_eq!(service.exit_code(), 70);

        let other = LaunchpadError::factory(anyhow::anyhow!("no database"));
        assert_eq!(other.code(), ErrorCode::COMMAND_FACTORY_FAILED);
        assert!(other.to_string().contains("no database"));
    }
}
