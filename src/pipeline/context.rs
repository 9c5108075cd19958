//! Context threaded between pipeline steps
//!
//! A [`Context`] starts with the fields the caller provides and grows as
//! steps write their results. Reads go through typed accessors that name the
//! reading step, so a missing or mistyped field reports where it was needed.

use super::errors::PipelineError;
use super::types::Policy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Keys a context can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    /// Name shared by the repository, remote and distribution
    Name,
    /// Download policy of the remote
    Policy,
    /// Package names the remote includes
    Packages,
    /// Href of the publication created by the pipeline
    PublicationHref,
}

impl ContextKey {
    /// Returns the key as written in logs and errors
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Policy => "policy",
            Self::Packages => "packages",
            Self::PublicationHref => "publication_href",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value stored in the context
///
/// Serialized with the variant as the tag so a policy never reads back as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextValue {
    /// Plain text
    Text(String),
    /// A download policy
    Policy(Policy),
    /// A list of strings
    List(Vec<String>),
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Policy> for ContextValue {
    fn from(value: Policy) -> Self {
        Self::Policy(value)
    }
}

impl From<Vec<String>> for ContextValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Fields accumulated over one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    fields: BTreeMap<ContextKey, ContextValue>,
}

impl Context {
    /// Creates an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the initial context of a provisioning run
    #[must_use]
    pub fn provisioning(name: impl Into<String>, policy: Policy, packages: Vec<String>) -> Self {
        Self::new()
            .with(ContextKey::Name, name.into())
            .with(ContextKey::Policy, policy)
            .with(ContextKey::Packages, packages)
    }

    /// Sets a field, replacing any previous value
    #[must_use]
    pub fn with(mut self, key: ContextKey, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a field in place
    pub fn insert(&mut self, key: ContextKey, value: impl Into<ContextValue>) {
        self.fields.insert(key, value.into());
    }

    /// Returns the raw value of a field
    #[must_use]
    pub fn get(&self, key: ContextKey) -> Option<&ContextValue> {
        self.fields.get(&key)
    }

    /// Returns true if the field has been set
    #[must_use]
    pub fn contains(&self, key: ContextKey) -> bool {
        self.fields.contains_key(&key)
    }

    /// Keys currently set, in key order
    pub fn keys(&self) -> impl Iterator<Item = ContextKey> + '_ {
        self.fields.keys().copied()
    }

    /// Number of fields set
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads a text field on behalf of `step`
    ///
    /// # Errors
    ///
    /// `MissingContextField` if unset, `ContextFieldType` if not text.
    pub fn text(&self, step: &str, key: ContextKey) -> Result<&str, PipelineError> {
        match self.require(step, key)? {
            ContextValue::Text(value) => Ok(value),
            _ => Err(type_error(step, key, "text")),
        }
    }

    /// Reads a policy field on behalf of `step`
    ///
    /// # Errors
    ///
    /// `MissingContextField` if unset, `ContextFieldType` if not a policy.
    pub fn policy(&self, step: &str, key: ContextKey) -> Result<Policy, PipelineError> {
        match self.require(step, key)? {
            ContextValue::Policy(policy) => Ok(*policy),
            _ => Err(type_error(step, key, "a policy")),
        }
    }

    /// Reads a list field on behalf of `step`
    ///
    /// # Errors
    ///
    /// `MissingContextField` if unset, `ContextFieldType` if not a list.
    pub fn list(&self, step: &str, key: ContextKey) -> Result<&[String], PipelineError> {
        match self.require(step, key)? {
            ContextValue::List(values) => Ok(values),
            _ => Err(type_error(step, key, "a list")),
        }
    }

    fn require(&self, step: &str, key: ContextKey) -> Result<&ContextValue, PipelineError> {
        self.fields
            .get(&key)
            .ok_or_else(|| PipelineError::MissingContextField {
                step: step.to_string(),
                field: key,
            })
    }
}

fn type_error(step: &str, key: ContextKey, expected: &'static str) -> PipelineError {
    PipelineError::ContextFieldType {
        step: step.to_string(),
        field: key,
        expected,
    }
}
