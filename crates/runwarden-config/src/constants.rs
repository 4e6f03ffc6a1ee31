/// Environment variable switching the controller into development mode.
///
/// In development mode, resolver and coordinator containers always re-pull their images.
pub const DEV_MODE_ENV: &str = "DEVELOP_MODE";

/// Key of the policy payload inside the configuration object.
pub const CONFIG_FILE_KEY: &str = "workflow-controller.json";

/// Image keys in the `images` map.
pub const COORDINATOR_IMAGE: &str = "coordinator";
pub const GC_IMAGE: &str = "gc";
pub const DIND_IMAGE: &str = "dind";
pub const TOOLBOX_IMAGE: &str = "toolbox";

pub(crate) const DEFAULT_WORKERS: u32 = 1;
pub(crate) const DEFAULT_GC_BACKOFF_BASE_SECONDS: u64 = 5;
pub(crate) const DEFAULT_GC_BACKOFF_MAX_SECONDS: u64 = 300;
