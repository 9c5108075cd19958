//! Tests for pipeline types
//!
//! Covers the policy and resource kind enums and the error messages
//! operators see.

use super::*;

#[test]
fn test_policy_display() {
    assert_eq!(Policy::OnDemand.to_string(), "on_demand");
    assert_eq!(Policy::Streamed.to_string(), "streamed");
    assert_eq!(Policy::Immediate.to_string(), "immediate");
}

#[test]
fn test_policy_from_str() {
    for policy in Policy::ALL {
        assert_eq!(policy.as_str().parse::<Policy>().unwrap(), policy);
    }
    assert!("lazy".parse::<Policy>().is_err());
}

#[test]
fn test_policy_serialize() {
    let json = serde_json::to_string(&Policy::OnDemand).unwrap();
    assert_eq!(json, r#""on_demand""#);
}

#[test]
fn test_policy_deserialize() {
    let policy: Policy = serde_json::from_str(r#""streamed""#).unwrap();
    assert_eq!(policy, Policy::Streamed);
}

#[test]
fn test_policy_order_is_declaration_order() {
    let mut policies = vec![Policy::Immediate, Policy::OnDemand, Policy::Streamed];
    policies.sort();
    assert_eq!(policies, Policy::ALL.to_vec());
}

#[test]
fn test_teardown_order_children_first() {
    assert_eq!(
        ResourceKind::TEARDOWN_ORDER,
        [
            ResourceKind::Distribution,
            ResourceKind::Publication,
            ResourceKind::Repository,
            ResourceKind::Remote,
        ]
    );
}

#[test]
fn test_resource_kind_identifiers() {
    assert_eq!(ResourceKind::Publication.identifier_field(), "pulp_href");
    assert_eq!(ResourceKind::Publication.destroy_flag(), "--href");
    for kind in [
        ResourceKind::Distribution,
        ResourceKind::Repository,
        ResourceKind::Remote,
    ] {
        assert_eq!(kind.identifier_field(), "name");
        assert_eq!(kind.destroy_flag(), "--name");
    }
}

#[test]
fn test_validation_error_empty_name() {
    let err = ValidationError::EmptyName;
    assert!(err.to_string().contains("empty"));
}

#[test]
fn test_validation_error_invalid_name_chars() {
    let err = ValidationError::InvalidNameChars {
        name: "my repo".to_string(),
    };
    assert!(err.to_string().contains("Invalid characters"));
    assert!(err.to_string().contains("my repo"));
}

#[test]
fn test_validation_error_empty_pipeline() {
    let err = ValidationError::EmptyPipeline;
    assert!(err.to_string().contains("at least one step"));
}

#[test]
fn test_pipeline_error_from_validation() {
    let pipeline_err = PipelineError::from(ValidationError::EmptyPipeline);
    assert!(matches!(pipeline_err, PipelineError::Validation(_)));
}

#[test]
fn test_pipeline_error_command_failed() {
    let err = PipelineError::CommandFailed {
        command: "pulp python remote list".to_string(),
        code: 1,
        stdout: String::new(),
        stderr: "connection refused".to_string(),
    };
    assert!(err.to_string().contains("pulp python remote list"));
    assert!(err.to_string().contains("exit code 1"));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn test_pipeline_error_teardown_partial_failure() {
    let err = PipelineError::TeardownPartialFailure {
        failures: vec![
            DestroyFailure {
                kind: ResourceKind::Repository,
                identifier: "pypi_immediate".to_string(),
                message: "in use".to_string(),
            },
            DestroyFailure {
                kind: ResourceKind::Remote,
                identifier: "pypi_streamed".to_string(),
                message: "not found".to_string(),
            },
        ],
    };
    let message = err.to_string();
    assert!(message.contains("2 failed"));
    assert!(message.contains("repository 'pypi_immediate' (in use)"));
    assert!(message.contains("; remote 'pypi_streamed'"));
}

#[test]
fn test_pipeline_error_from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "bash not found");
    let pipeline_err = PipelineError::from(io_err);
    assert!(matches!(pipeline_err, PipelineError::Io(_)));
}
