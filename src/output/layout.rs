//! Flat key-value rendering of course records

use crate::audit::{CourseAuditRecord, CourseMetrics};
use crate::config::{Config, ProviderConfig};

const FIXED_HEADERS: [&str; 12] = [
    "Course ID",
    "Course Name",
    "Number of Students",
    "Classic Quizzes",
    "% Students Answering Quizzes",
    "New Quizzes",
    "% Students Answering New Quizzes",
    "Other Assignments",
    "% Students Submitting Other Assignments",
    "Discussions",
    "% Students Replying in Discussions",
    "Module Pages",
];

/// Column order and error conventions shared by every sink
#[derive(Debug, Clone)]
pub struct RecordLayout {
    provider_labels: Vec<String>,
    error_course_name: String,
    error_marker: String,
}

impl RecordLayout {
    pub fn new(
        providers: &[ProviderConfig],
        error_course_name: impl Into<String>,
        error_marker: impl Into<String>,
    ) -> Self {
        Self {
            provider_labels: providers.iter().map(|p| p.label.clone()).collect(),
            error_course_name: error_course_name.into(),
            error_marker: error_marker.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.providers,
            config.audit.error_course_name.as_str(),
            config.audit.error_marker.as_str(),
        )
    }

    /// Column headers, fixed columns first, then two per provider
    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
        for label in &self.provider_labels {
            headers.push(format!("Pages with {}", label));
            headers.push(format!("{} Embeds", label));
        }
        headers
    }

    /// Cell values in header order
    pub fn values(&self, record: &CourseAuditRecord) -> Vec<String> {
        match record.metrics() {
            Some(metrics) => self.metric_values(record, metrics),
            None => {
                let mut values = vec![
                    record.course_id.to_string(),
                    self.error_course_name.clone(),
                ];
                values.resize(self.column_count(), self.error_marker.clone());
                values
            }
        }
    }

    /// The record as ordered (header, value) pairs
    pub fn row(&self, record: &CourseAuditRecord) -> Vec<(String, String)> {
        self.headers()
            .into_iter()
            .zip(self.values(record))
            .collect()
    }

    pub fn column_count(&self) -> usize {
        FIXED_HEADERS.len() + 2 * self.provider_labels.len()
    }

    fn metric_values(&self, record: &CourseAuditRecord, metrics: &CourseMetrics) -> Vec<String> {
        let mut values = vec![
            record.course_id.to_string(),
            record.course_name.clone(),
            metrics.students.to_string(),
            metrics.classic_quizzes.items.to_string(),
            metrics.classic_quiz_participation().to_string(),
            metrics.new_quizzes.items.to_string(),
            metrics.new_quiz_participation().to_string(),
            metrics.other_assignments.items.to_string(),
            metrics.other_assignment_participation().to_string(),
            metrics.discussions.items.to_string(),
            metrics.discussion_participation().to_string(),
            metrics.module_pages.to_string(),
        ];

        // Providers missing from the metrics render as zero
        for index in 0..self.provider_labels.len() {
            let count = metrics.embeds.get(index).copied().unwrap_or_default();
            values.push(count.pages.to_string());
            values.push(count.embeds.to_string());
        }

        values
    }
}
