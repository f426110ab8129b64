use std::path::Path;

use serde::Serialize;

use crate::analysis::BatchSummary;
use crate::error::EstimatorError;
use crate::models::{TreeEstimate, TreeRecord};

/// Read tree records from a JSON array.
pub fn read_trees_json(path: impl AsRef<Path>) -> Result<Vec<TreeRecord>, EstimatorError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    read_trees_json_from_str(&content)
}

pub fn read_trees_json_from_str(content: &str) -> Result<Vec<TreeRecord>, EstimatorError> {
    Ok(serde_json::from_str(content)?)
}

#[derive(Serialize)]
struct BatchReport<'a> {
    summary: BatchSummary,
    trees: &'a [TreeEstimate],
}

/// Estimates plus their summary as one JSON document.
pub fn estimates_to_json_string(
    estimates: &[TreeEstimate],
    pretty: bool,
) -> Result<String, EstimatorError> {
    let report = BatchReport {
        summary: BatchSummary::from_estimates(estimates),
        trees: estimates,
    };
    let content = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(content)
}

pub fn write_estimates_json(
    estimates: &[TreeEstimate],
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), EstimatorError> {
    std::fs::write(path.as_ref(), estimates_to_json_string(estimates, pretty)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_trees_json_defaults() {
        let trees = read_trees_json_from_str(
            r#"[{"tree_id": 1, "species_cd": 746, "dbh": 7.0},
                {"tree_id": 2, "species_cd": 131, "region": "S33", "dbh": 10.0, "height": 70.0}]"#,
        )
        .unwrap();
        assert_eq!(trees.len(), 2);
        assert!(trees[0].region.is_none());
        assert_eq!(trees[1].height, Some(70.0));
    }

    #[test]
    fn test_read_trees_json_invalid() {
        assert!(matches!(
            read_trees_json_from_str("{not json"),
            Err(EstimatorError::Json(_))
        ));
    }

    #[test]
    fn test_report_contains_summary() {
        let est = TreeEstimate {
            tree_id: 1,
            total_ag_lbs: Some(12.5),
            ..Default::default()
        };
        let text = estimates_to_json_string(&[est], false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"]["trees"], 1);
        assert_eq!(value["summary"]["total_ag_lbs"], 12.5);
        assert_eq!(value["trees"][0]["tree_id"], 1);
    }

    #[test]
    fn test_write_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_estimates_json(&[TreeEstimate::default()], &path, true).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"summary\""));
    }
}
