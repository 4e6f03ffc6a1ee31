use std::{env, fmt};

use serde::{Deserialize, Serialize};

use crate::constants::DEV_MODE_ENV;

/// Image pull policy for resolver and coordinator containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImagePullPolicy {
    Always,
    IfNotPresent,
}

impl fmt::Display for ImagePullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImagePullPolicy::Always => f.write_str("Always"),
            ImagePullPolicy::IfNotPresent => f.write_str("IfNotPresent"),
        }
    }
}

/// Pull policy derived from the process environment (`DEVELOP_MODE`).
pub fn image_pull_policy() -> ImagePullPolicy {
    image_pull_policy_from(env::var(DEV_MODE_ENV).ok().as_deref())
}

/// Pull policy for a given value of the development-mode flag.
pub fn image_pull_policy_from(dev_mode: Option<&str>) -> ImagePullPolicy {
    match dev_mode {
        Some("true") => ImagePullPolicy::Always,
        _ => ImagePullPolicy::IfNotPresent,
    }
}
