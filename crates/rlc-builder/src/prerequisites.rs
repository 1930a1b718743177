use rlc_core::model::ServiceModel;
use serde::Serialize;

/// Advisory checks run before declarative emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

pub fn validate_prerequisites(model: &ServiceModel) -> PrerequisiteReport {
    let mut issues = Vec::new();

    if model.paths.is_empty() {
        issues.push("model has no paths defined".to_string());
    }
    if model
        .options
        .title
        .as_deref()
        .is_none_or(|title| title.trim().is_empty())
    {
        issues.push("model has no title; the client will be named `Client`".to_string());
    }
    for (template, path) in &model.paths {
        if path.operations.is_empty() {
            issues.push(format!("path `{template}` defines no operations"));
        }
    }

    PrerequisiteReport {
        is_valid: issues.is_empty(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlc_core::model;

    #[test]
    fn test_empty_model() {
        let report = validate_prerequisites(&ServiceModel::new(""));
        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues[0].contains("no paths"));
        assert!(report.issues[1].contains("no title"));
    }

    #[test]
    fn test_path_without_operations() {
        let model = model::from_yaml(
            r#"
options: { title: Widgets }
paths:
  /empty:
    name: Empty
"#,
        )
        .unwrap();
        let report = validate_prerequisites(&model);
        assert_eq!(report.issues, vec!["path `/empty` defines no operations"]);
    }

    #[test]
    fn test_valid_model() {
        let model = model::from_yaml(include_str!("../tests/fixtures/widgets.yaml")).unwrap();
        let report = validate_prerequisites(&model);
        assert!(report.is_valid, "{:?}", report.issues);
    }
}
