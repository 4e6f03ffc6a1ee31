//! Static policy for the workflow controller.
//!
//! The policy document is read once from an externally managed configuration
//! object, validated, defaulted and frozen into a [`ConfigSnapshot`]. Dependents
//! receive the snapshot as an `Arc` and never see it change; a reload produces a
//! new snapshot that is published through [`ConfigHandle::swap`].

mod constants;
pub use constants::*;

mod document;
pub use document::ConfigDocument;

mod error;
pub use error::ConfigError;

mod schema;
pub use schema::{
    ControllerConfig, DindSettings, ExecutionContext, GcConfig, LimitsConfig, LoggingConfig,
    ResourceRequirements, WorkerDomain, WorkersNumber,
};

mod snapshot;
pub use snapshot::{Capabilities, ConfigSnapshot, ConfigWarning, Validation};

mod store;
pub use store::ConfigStore;

mod handle;
pub use handle::ConfigHandle;

mod pull_policy;
pub use pull_policy::{ImagePullPolicy, image_pull_policy, image_pull_policy_from};
