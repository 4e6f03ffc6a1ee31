use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Identifier of a single WorkflowRun.
///
/// Ordering is lexicographic; retention uses it to break creation-time ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

/// Identifier of a Workflow (the reusable pipeline definition).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(RunId);
string_id!(WorkflowId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ids_order_lexicographically() {
        let mut ids = vec![RunId::from("run-b"), RunId::from("run-a"), RunId::from("run-c")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "run-a");
        assert_eq!(ids[2].as_str(), "run-c");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&WorkflowId::from("build")).unwrap();
        assert_eq!(json, r#""build""#);
    }
}
