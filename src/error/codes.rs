/// Error code registry for launchpad
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Profiler errors
/// - 3000-3999: Service container errors
/// - 4000-4999: Command resolution errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_WORKING_DIRECTORY: u16 = 1001;
    pub const CONFIG_DOTENV_MOUNT: u16 = 1002;
    pub const CONFIG_DOTENV_READ: u16 = 1003;
    pub const CONFIG_DOTENV_PARSE: u16 = 1004;

    // Profiler errors (2000-2999)
    pub const PROFILER_GENERIC: u16 = 2000;
    pub const PROFILER_INVALID_URL: u16 = 2001;
    pub const PROFILER_UNSUPPORTED_SCHEME: u16 = 2002;
    pub const PROFILER_INVALID_SINK: u16 = 2003;

    // Service container errors (3000-3999)
    pub const SERVICE_GENERIC: u16 = 3000;
    pub const SERVICE_NOT_FOUND: u16 = 3001;
    pub const SERVICE_TYPE_MISMATCH: u16 = 3002;
    pub const SERVICE_CIRCULAR_DEPENDENCY: u16 = 3003;
    pub const SERVICE_FACTORY_FAILED: u16 = 3004;

    // Command resolution errors (4000-4999)
    pub const COMMAND_GENERIC: u16 = 4000;
    pub const COMMAND_FACTORY_FAILED: u16 = 4001;
}

/// Get a human-readable description of an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic configuration error",
        1001 => "Working directory unavailable",
        1002 => "Configuration directory cannot be mounted",
        1003 => "Dotenv file cannot be read",
        1004 => "Malformed dotenv file",

        2000 => "Generic profiler error",
        2001 => "Invalid profiler URL",
        2002 => "Unsupported profiler sink",
        2003 => "Profiler sink is not a local directory",

        3000 => "Generic service error",
        3001 => "Service not found",
        3002 => "Service has an unexpected type",
        3003 => "Circular service dependency",
        3004 => "Service factory failed",

        4000 => "Generic command error",
        4001 => "Command factory failed",

        _ => "Unknown error code",
    }
}
