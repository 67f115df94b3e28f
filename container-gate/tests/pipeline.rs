use std::path::{Path, PathBuf};

use anyhow::Result;
use container_gate::config::{self, Format};
use container_gate::policy::{PolicyEngine, Severity, ValidatorKind};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn failing_container_reports_every_violation_in_order() -> Result<()> {
    let policy = config::load_policy(fixture("strict_policy.yaml"))?;
    let container = config::load_container(fixture("failing_inspect.json"))?;

    let report = PolicyEngine::new().execute(&policy, &container);
    assert!(!report.is_passing());
    assert_eq!(
        report.failed().collect::<Vec<_>>(),
        [
            ValidatorKind::Labels,
            ValidatorKind::EnvKeys,
            ValidatorKind::Volumes,
            ValidatorKind::PortRange,
            ValidatorKind::Size,
        ]
    );

    let severities: Vec<_> = report.messages().iter().map(|m| m.severity()).collect();
    assert_eq!(
        severities,
        [
            Severity::Error,
            Severity::Error,
            Severity::Error,
            Severity::Error,
            Severity::Error,
            Severity::Warning,
        ]
    );
    assert!(report.messages()[0].text().contains("com.swipely.iam-docker.iam-profile"));
    assert!(report.messages()[1].text().contains("IAM_ROLE"));
    assert!(report.messages()[3].text().contains("80/tcp"));
    Ok(())
}

#[test]
fn passing_container_satisfies_strict_policy() -> Result<()> {
    let policy = config::load_policy(fixture("strict_policy.yaml"))?;
    let container = config::load_container(fixture("passing_inspect.json"))?;

    let report = PolicyEngine::new().execute(&policy, &container);
    assert!(report.is_passing());
    assert!(report.messages().is_empty());
    Ok(())
}

#[test]
fn contradictory_size_limits_fail_any_container() -> Result<()> {
    let policy = config::parse_policy(r#"{"size":{"max":10,"warning":"11"}}"#, Format::Json)?;
    let container = config::parse_container(r#"{"Size":0}"#)?;

    let report = PolicyEngine::new().execute(&policy, &container);
    assert!(!report.is_passing());
    assert_eq!(report.failed().collect::<Vec<_>>(), [ValidatorKind::Size]);
    assert_eq!(report.errors().count(), 1);
    Ok(())
}
