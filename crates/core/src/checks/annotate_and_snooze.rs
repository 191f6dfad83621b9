//! Manual annotation override.
//!
//! Any period with a non-empty annotation gets an override score of +1
//! carrying the annotation as its description, so a human note always wins
//! the combined verdict. Only the empty string means "no annotation";
//! those periods are neutral and never override.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::AnnotationSeries;
use crate::valence_labels::LABEL_NORMAL;
use crate::valence_score::{ValenceScore, DEFAULT_PRIORITY_SCORE};
use crate::valence_score_series::ValenceScoreSeries;

pub const METRIC_CHECK_LABEL: &str = "Annotate And Snooze Metric Check";
pub const LABEL_ANNOTATION: &str = "Annotation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateAndSnoozeMetricCheck {
    /// Only decides between two annotations on the same period.
    pub priority_score: u32,
}

impl Default for AnnotateAndSnoozeMetricCheck {
    fn default() -> Self {
        Self {
            priority_score: DEFAULT_PRIORITY_SCORE,
        }
    }
}

impl AnnotateAndSnoozeMetricCheck {
    pub fn apply(&self, annotations: &AnnotationSeries) -> Result<ValenceScoreSeries, CoreError> {
        let scores = annotations
            .values()
            .iter()
            .map(|annotation| {
                let score = if annotation.is_empty() {
                    ValenceScore::new(0.0, LABEL_NORMAL, "")
                } else {
                    ValenceScore::new(1.0, LABEL_ANNOTATION, annotation).with_override(true)
                };
                score
                    .with_priority(self.priority_score)
                    .with_metric_check_label(METRIC_CHECK_LABEL)
            })
            .collect();

        Ok(ValenceScoreSeries::from_parts(annotations.index(), scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ordinal_index;

    fn annotations(values: &[&str]) -> AnnotationSeries {
        AnnotationSeries::new(
            ordinal_index(values.len()),
            values.iter().map(|v| v.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn non_empty_annotation_overrides() {
        let result = AnnotateAndSnoozeMetricCheck::default()
            .apply(&annotations(&["", "Known outage", ""]))
            .unwrap();
        let annotated = &result.scores()[1];
        assert!(annotated.is_override());
        assert_eq!(annotated.valence_score(), 1.0);
        assert_eq!(annotated.valence_label(), LABEL_ANNOTATION);
        assert_eq!(annotated.valence_description(), "Known outage");
        assert_eq!(annotated.metric_check_label(), METRIC_CHECK_LABEL);
    }

    #[test]
    fn empty_annotation_is_neutral() {
        let result = AnnotateAndSnoozeMetricCheck::default()
            .apply(&annotations(&["", ""]))
            .unwrap();
        for score in result.scores() {
            assert!(!score.is_override());
            assert_eq!(score.valence_score(), 0.0);
            assert_eq!(score.valence_label(), LABEL_NORMAL);
            assert_eq!(score.valence_description(), "");
        }
    }

    #[test]
    fn whitespace_annotation_still_overrides() {
        let result = AnnotateAndSnoozeMetricCheck::default()
            .apply(&annotations(&[" ", "\t"]))
            .unwrap();
        for (score, note) in result.scores().iter().zip([" ", "\t"]) {
            assert!(score.is_override());
            assert_eq!(score.valence_score(), 1.0);
            assert_eq!(score.valence_label(), LABEL_ANNOTATION);
            assert_eq!(score.valence_description(), note);
        }
    }

    #[test]
    fn output_keeps_annotation_index() {
        let input = annotations(&["a", "b", "c"]);
        let result = AnnotateAndSnoozeMetricCheck::default().apply(&input).unwrap();
        assert_eq!(result.index(), input.index());
    }
}
