//! Pulp CLI command lines
//!
//! Builds the shell command lines handed to the runner and interprets the
//! text the tool prints back. Every interpolated argument is shell-quoted.

use crate::pipeline::{PipelineError, Policy, ResourceKind};
use serde::{Deserialize, Serialize};
use shell_words::quote;

/// Settings for the `pulp` command line tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulpCli {
    /// Tool binary, resolved through `PATH`
    pub binary: String,
    /// Content plugin sub-command
    pub plugin: String,
    /// Upstream index remotes fetch from
    pub remote_url: String,
    /// Page size requested from list commands
    pub list_limit: Option<u32>,
    /// Command that removes unreferenced content and artifacts
    pub orphan_cleanup: String,
}

impl Default for PulpCli {
    fn default() -> Self {
        Self {
            binary: "pulp".to_string(),
            plugin: "python".to_string(),
            remote_url: "https://pypi.org/".to_string(),
            list_limit: Some(1000),
            orphan_cleanup: "pulp orphans delete".to_string(),
        }
    }
}

impl PulpCli {
    fn plugin_command(&self, kind: ResourceKind, action: &str) -> String {
        format!(
            "{} {} {} {action}",
            quote(&self.binary),
            quote(&self.plugin),
            kind.as_str()
        )
    }

    /// `repository create`
    #[must_use]
    pub fn create_repository(&self, name: &str) -> String {
        format!(
            "{} --name {}",
            self.plugin_command(ResourceKind::Repository, "create"),
            quote(name)
        )
    }

    /// `remote create` with the package set as a JSON includes list
    #[must_use]
    pub fn create_remote(&self, name: &str, packages: &[String], policy: Policy) -> String {
        let includes = serde_json::Value::from(packages.to_vec()).to_string();
        format!(
            "{} --name {} --url {} --includes {} --policy {}",
            self.plugin_command(ResourceKind::Remote, "create"),
            quote(name),
            quote(&self.remote_url),
            quote(&includes),
            policy
        )
    }

    /// `repository sync` against the remote of the same name
    #[must_use]
    pub fn sync_repository(&self, name: &str) -> String {
        format!(
            "{} --name {} --remote {}",
            self.plugin_command(ResourceKind::Repository, "sync"),
            quote(name),
            quote(name)
        )
    }

    /// `publication create` for the repository's latest version
    #[must_use]
    pub fn create_publication(&self, repository: &str) -> String {
        format!(
            "{} --repository {}",
            self.plugin_command(ResourceKind::Publication, "create"),
            quote(repository)
        )
    }

    /// `distribution create` serving `publication_href` under `name`
    #[must_use]
    pub fn create_distribution(&self, name: &str, publication_href: &str) -> String {
        format!(
            "{} --name {} --base-path {} --publication {}",
            self.plugin_command(ResourceKind::Distribution, "create"),
            quote(name),
            quote(name),
            quote(publication_href)
        )
    }

    /// `list` for a resource kind
    #[must_use]
    pub fn list(&self, kind: ResourceKind) -> String {
        let command = self.plugin_command(kind, "list");
        match self.list_limit {
            Some(limit) => format!("{command} --limit {limit}"),
            None => command,
        }
    }

    /// `destroy` for one resource
    #[must_use]
    pub fn destroy(&self, kind: ResourceKind, identifier: &str) -> String {
        format!(
            "{} {} {}",
            self.plugin_command(kind, "destroy"),
            kind.destroy_flag(),
            quote(identifier)
        )
    }

    /// `show` for a named resource
    #[must_use]
    pub fn show(&self, kind: ResourceKind, name: &str) -> String {
        format!("{} --name {}", self.plugin_command(kind, "show"), quote(name))
    }
}

/// Extracts resource identifiers from the output of `command`
///
/// A JSON array yields the `field` of every object that has it as a string.
/// Text that is not JSON is read as one identifier per non-blank line.
///
/// # Errors
///
/// `UnexpectedOutput` for any JSON value other than an array, such as a
/// paginated or error object.
pub fn parse_identifiers(
    command: &str,
    output: &str,
    field: &str,
) -> Result<Vec<String>, PipelineError> {
    match serde_json::from_str::<serde_json::Value>(output) {
        Ok(serde_json::Value::Array(entries)) => Ok(entries
            .iter()
            .filter_map(|entry| entry.get(field).and_then(serde_json::Value::as_str))
            .map(str::to_string)
            .collect()),
        Ok(_) => Err(PipelineError::UnexpectedOutput {
            command: command.to_string(),
            output: output.to_string(),
        }),
        Err(_) => Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
    }
}

/// Extracts `pulp_href` from a create command's output
///
/// Falls back to the trimmed text for tools that print the bare href.
/// Returns `None` when nothing usable was printed.
#[must_use]
pub fn parse_href(output: &str) -> Option<String> {
    let href = match serde_json::from_str::<serde_json::Value>(output) {
        Ok(value @ serde_json::Value::Object(_)) => value
            .get("pulp_href")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)?,
        Ok(serde_json::Value::String(href)) => href,
        _ => output.trim().to_string(),
    };
    (!href.is_empty()).then_some(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_remote_quotes_includes() {
        let cli = PulpCli::default();
        let command = cli.create_remote(
            "pypi_immediate",
            &["ctc".to_string(), "plac".to_string()],
            Policy::Immediate,
        );

        assert!(command.starts_with("pulp python remote create --name pypi_immediate --url "));
        assert!(command.contains("pypi.org"));
        assert!(command.ends_with(" --includes '[\"ctc\",\"plac\"]' --policy immediate"));
    }

    #[test]
    fn test_create_distribution_uses_name_as_base_path() {
        let cli = PulpCli::default();
        let command = cli.create_distribution("pypi_streamed", "/pulp/api/v3/publications/python/pypi/1/");

        assert_eq!(
            command,
            "pulp python distribution create --name pypi_streamed --base-path pypi_streamed \
             --publication /pulp/api/v3/publications/python/pypi/1/"
        );
    }

    #[test]
    fn test_sync_uses_remote_of_same_name() {
        let cli = PulpCli::default();
        assert_eq!(
            cli.sync_repository("pypi_on_demand"),
            "pulp python repository sync --name pypi_on_demand --remote pypi_on_demand"
        );
    }

    #[test]
    fn test_list_appends_limit() {
        let mut cli = PulpCli::default();
        assert_eq!(
            cli.list(ResourceKind::Remote),
            "pulp python remote list --limit 1000"
        );

        cli.list_limit = None;
        assert_eq!(cli.list(ResourceKind::Remote), "pulp python remote list");
    }

    #[test]
    fn test_destroy_flag_per_kind() {
        let cli = PulpCli::default();

        assert_eq!(
            cli.destroy(ResourceKind::Publication, "/pulp/api/v3/publications/python/pypi/1/"),
            "pulp python publication destroy --href /pulp/api/v3/publications/python/pypi/1/"
        );
        assert_eq!(
            cli.destroy(ResourceKind::Distribution, "pypi_immediate"),
            "pulp python distribution destroy --name pypi_immediate"
        );
    }

    #[test]
    fn test_names_with_spaces_are_quoted() {
        let cli = PulpCli::default();
        assert_eq!(
            cli.create_repository("odd name"),
            "pulp python repository create --name 'odd name'"
        );
    }

    #[test]
    fn test_parse_identifiers_from_json() {
        let output = r#"[{"name": "a", "pulp_href": "/x/1/"}, {"name": "b"}, {"other": 1}]"#;

        assert_eq!(parse_identifiers("list", output, "name").unwrap(), vec!["a", "b"]);
        assert_eq!(
            parse_identifiers("list", output, "pulp_href").unwrap(),
            vec!["/x/1/"]
        );
    }

    #[test]
    fn test_parse_identifiers_from_lines() {
        assert_eq!(
            parse_identifiers("list", "a\n\n  b  \n", "name").unwrap(),
            vec!["a", "b"]
        );
        assert!(parse_identifiers("list", "", "name").unwrap().is_empty());
        assert!(parse_identifiers("list", "[]", "name").unwrap().is_empty());
    }

    #[test]
    fn test_parse_identifiers_rejects_json_object() {
        let output = "{\n  \"count\": 0,\n  \"results\": []\n}\n";

        let err = parse_identifiers("pulp python remote list", output, "name").unwrap_err();

        assert_eq!(
            err,
            PipelineError::UnexpectedOutput {
                command: "pulp python remote list".to_string(),
                output: output.to_string(),
            }
        );
    }

    #[test]
    fn test_parse_href() {
        assert_eq!(
            parse_href(r#"{"pulp_href": "/pulp/api/v3/publications/1/"}"#).as_deref(),
            Some("/pulp/api/v3/publications/1/")
        );
        assert_eq!(
            parse_href("/pulp/api/v3/publications/2/\n").as_deref(),
            Some("/pulp/api/v3/publications/2/")
        );
        assert_eq!(parse_href("\n"), None);
        assert_eq!(parse_href(r#"{"name": "x"}"#), None);
    }
}
