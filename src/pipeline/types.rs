//! Core types for pipeline domain
//!
//! This module contains fundamental types shared by the provisioning
//! pipeline and the teardown sweep.

#![allow(clippy::must_use_candidate)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a remote fetches content from upstream
///
/// Opaque to the pipeline: it is threaded through the context and rendered
/// into the remote's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Fetch content the first time a client asks for it
    OnDemand,
    /// Stream content to clients without saving it
    Streamed,
    /// Download everything during sync
    Immediate,
}

impl Policy {
    /// All policies in declaration order
    pub const ALL: [Self; 3] = [Self::OnDemand, Self::Streamed, Self::Immediate];

    /// Returns the name the tool and the config file use for this policy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnDemand => "on_demand",
            Self::Streamed => "streamed",
            Self::Immediate => "immediate",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| format!("unknown policy '{s}'"))
    }
}

/// Resource types removed by teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Served base path bound to a publication
    Distribution,
    /// Published snapshot of a repository version
    Publication,
    /// Versioned content container
    Repository,
    /// Upstream feed a repository syncs from
    Remote,
}

impl ResourceKind {
    /// Destroy order: every kind comes before the kinds it references
    pub const TEARDOWN_ORDER: [Self; 4] = [
        Self::Distribution,
        Self::Publication,
        Self::Repository,
        Self::Remote,
    ];

    /// Sub-command name used by the tool
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Publication => "publication",
            Self::Repository => "repository",
            Self::Remote => "remote",
        }
    }

    /// Field of a list entry that identifies the resource
    pub fn identifier_field(&self) -> &'static str {
        match self {
            Self::Publication => "pulp_href",
            Self::Distribution | Self::Repository | Self::Remote => "name",
        }
    }

    /// Flag the destroy sub-command takes the identifier with
    pub fn destroy_flag(&self) -> &'static str {
        match self {
            Self::Publication => "--href",
            Self::Distribution | Self::Repository | Self::Remote => "--name",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for types that can be validated
#[allow(clippy::missing_errors_doc)]
pub trait Validate {
    /// Type of validation error
    type Error;

    /// Validates this type
    fn validate(&self) -> std::result::Result<(), Self::Error>;
}
