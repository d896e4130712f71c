//! Environment kinds.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnvironmentError;

/// Language flavour of a development environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Python virtual environment.
    Python,
    /// Node.js project.
    Node,
    /// C++ project built with `CMake`.
    Cpp,
    /// Plain directory with a `bin/`.
    Generic,
}

impl Kind {
    /// Every kind, in menu order.
    pub const ALL: [Self; 4] = [Self::Python, Self::Node, Self::Cpp, Self::Generic];

    /// Lowercase name as stored on disk and accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Node => "node",
            Self::Cpp => "cpp",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Self::Python),
            "node" | "nodejs" | "js" => Ok(Self::Node),
            "cpp" | "c++" => Ok(Self::Cpp),
            "generic" => Ok(Self::Generic),
            _ => Err(EnvironmentError::UnknownKind(s.to_string())),
        }
    }
}
