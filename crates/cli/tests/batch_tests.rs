//! Integration tests for batch documents read from disk.

use std::io::Write;

use tempfile::NamedTempFile;
use valence_cli::batch::{load_batch, load_pipeline_config, run_batch};

fn write_json(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ---------------------------------------------------------------------------
// Test: end to end
// ---------------------------------------------------------------------------

#[test]
fn dated_batch_with_annotation_round_trips_to_rows() {
    let input = write_json(
        r#"{
            "metrics": [{
                "name": "Daily signups",
                "url": "https://example.com/signups",
                "index": ["2050-01-01", "2050-01-02", "2050-01-03"],
                "values": [120, 131, 125],
                "annotations": [null, "", "Promo email sent"]
            }]
        }"#,
    );

    let batch = load_batch(input.path()).unwrap();
    let output = run_batch(batch, None).unwrap();
    assert_eq!(output.results.len(), 1);

    let json = serde_json::to_value(&output).unwrap();
    let metric = &json["results"][0];
    assert_eq!(metric["name"], "Daily signups");
    assert_eq!(metric["url"], "https://example.com/signups");
    assert_eq!(metric["rows"].as_array().unwrap().len(), 3);
    assert_eq!(metric["rows"][0]["Period"], "2050-01-01");
    assert_eq!(metric["current"]["Valence Label"], "Annotation");
    assert_eq!(metric["current"]["Valence Description"], "Promo email sent");
    assert_eq!(metric["current"]["Is Override?"], true);
}

#[test]
fn document_pipeline_section_is_used() {
    let input = write_json(
        r#"{
            "pipeline": {
                "metric_checks": [{"check": "realistic_range", "lower_bound": 0, "upper_bound": 100}]
            },
            "metrics": [{"name": "Error rate", "values": [10, 20, 250]}]
        }"#,
    );

    let output = run_batch(load_batch(input.path()).unwrap(), None).unwrap();
    let current = output.results[0].current.as_ref().unwrap();
    assert_eq!(current.valence_label, "Above Realistic Range");
    assert_eq!(current.priority_score, 1);
}

#[test]
fn separate_pipeline_config_file_overrides_document() {
    let input = write_json(
        r#"{
            "pipeline": {"metric_checks": []},
            "metrics": [{"name": "Revenue", "values": [10, 12, 8], "target": [10, 10, 10]}]
        }"#,
    );
    let pipeline = write_json(
        r#"{"metric_checks": [{"check": "compare_to_baseline", "baseline": "target"}]}"#,
    );

    let config = load_pipeline_config(pipeline.path()).unwrap();
    let output = run_batch(load_batch(input.path()).unwrap(), Some(config)).unwrap();
    let scores: Vec<f64> = output.results[0].rows.iter().map(|r| r.valence_score).collect();
    assert_eq!(scores, vec![0.0, 1.0, -1.0]);
}

// ---------------------------------------------------------------------------
// Test: failures
// ---------------------------------------------------------------------------

#[test]
fn missing_required_input_names_the_metric() {
    let input = write_json(
        r#"{
            "pipeline": {"metric_checks": [{"check": "compare_to_baseline", "baseline": "forecast"}]},
            "metrics": [{"name": "Revenue", "values": [1, 2]}]
        }"#,
    );
    let err = run_batch(load_batch(input.path()).unwrap(), None).unwrap_err();
    assert!(err.to_string().contains("Revenue"));
}

#[test]
fn malformed_document_is_rejected() {
    let input = write_json(r#"{"metrics": [{"values": [1, 2]}]}"#);
    assert!(load_batch(input.path()).is_err());
}

#[test]
fn unreadable_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_batch(&dir.path().join("absent.json")).is_err());
}
