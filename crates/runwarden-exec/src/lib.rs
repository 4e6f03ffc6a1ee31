//! Process-backed resource cleanup.
//!
//! [`CommandCleaner`] tears down a run's namespace, pods and volumes by
//! running an external program (typically the GC image entrypoint or a
//! `kubectl` wrapper) with the run's coordinates as arguments.

mod error;
pub use error::{ExecError, ExecResult};

pub mod proc;
pub use proc::{CommandCleaner, CommandConfig};

mod util;

pub mod prelude {
    pub use crate::error::{ExecError, ExecResult};
    pub use crate::proc::{CommandCleaner, CommandConfig};
}
