use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable string identifier of a registered layer (e.g. `"choropleth-mg"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        LayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        LayerId::new(value)
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        LayerId(value)
    }
}
