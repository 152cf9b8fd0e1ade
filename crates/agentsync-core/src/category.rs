//! Artifact categories
//!
//! Each tree exposes the same closed set of category subdirectories. A
//! category is either file-based (one file per artifact) or a directory
//! category, whose artifacts are whole subdirectories synchronized
//! atomically.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The closed set of synchronizable categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Agent definitions, one markdown file per agent
    Agents,
    /// Slash-command definitions
    Commands,
    /// Hook scripts
    Hooks,
    /// Prompt files; environment-specific, so excluded by default
    Prompts,
    /// Skills; each artifact is a whole subdirectory
    Skills,
}

impl Category {
    /// All categories, in enumeration order
    pub const ALL: [Category; 5] = [
        Category::Agents,
        Category::Commands,
        Category::Hooks,
        Category::Prompts,
        Category::Skills,
    ];

    /// Subdirectory name under a tree root
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::Commands => "commands",
            Self::Hooks => "hooks",
            Self::Prompts => "prompts",
            Self::Skills => "skills",
        }
    }

    /// Whether artifacts in this category are whole subdirectories
    /// synchronized as one unit rather than individual files
    pub fn is_directory_category(self) -> bool {
        matches!(self, Self::Skills)
    }

    /// Parse a category name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for unrecognized names; the caller is
    /// expected to abort the whole call before any I/O happens.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "agents" => Ok(Self::Agents),
            "commands" => Ok(Self::Commands),
            "hooks" => Ok(Self::Hooks),
            "prompts" => Ok(Self::Prompts),
            "skills" => Ok(Self::Skills),
            other => Err(Error::validation(format!(
                "Unknown category '{other}'; valid categories: agents, commands, hooks, prompts, skills"
            ))),
        }
    }

    /// The default category set: everything except prompts, which are
    /// typically environment-specific and must be requested explicitly.
    pub fn default_set() -> Vec<Category> {
        Self::ALL
            .into_iter()
            .filter(|c| *c != Self::Prompts)
            .collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
