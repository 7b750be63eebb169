//! Operating system abstraction layer
//!
//! Commands and the application pipeline reach the filesystem and the process only
//! through [`OperatingSystem`]. The trait is small on purpose so decorators can wrap
//! it transparently:
//! - [`TracedOperatingSystem`] records every call, keeping the most recent ones for inspection
//! - [`ResilientOperatingSystem`] retries transient failures
//! - the profiler's own wrapper attributes calls to the running command
//!
//! Real ([`LocalOperatingSystem`]) and in-memory ([`MockOperatingSystem`]) backends
//! are provided.

mod mock;
mod real;
mod resilient;
mod retry;
mod traced;
mod traits;

pub use mock::{MockAdapter, MockFilesystem, MockOperatingSystem, MockStatus};
pub use real::{LocalAdapter, LocalFilesystem, LocalOperatingSystem, LocalStatus};
pub use resilient::ResilientOperatingSystem;
pub use retry::{is_transient, RetryPolicy};
pub use traced::{Activity, ActivityKind, Room, TracedOperatingSystem, DEFAULT_ACTIVITY_CAPACITY};
pub use traits::{Adapter, File, Filesystem, OperatingSystem, OperatingSystemHandle, Status};
