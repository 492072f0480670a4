//! Course auditor - main audit orchestration logic
//!
//! This module drives the API client through every resource of a course,
//! strictly one request at a time, and folds the results into one
//! [`CourseAuditRecord`] per course. Each step owns its tally and hands it
//! back; nothing is shared between steps or between courses.

use crate::api::models::{Assignment, Submission};
use crate::api::CanvasApi;
use crate::audit::classify::{partition_published, AssignmentClass};
use crate::audit::participation::{CategoryTally, StudentSet};
use crate::audit::record::{CourseAuditRecord, CourseMetrics};
use crate::config::{AuditConfig, Config, ProviderConfig};
use crate::embed::{scan_page, EmbedCount};
use crate::Result;

/// Page and embed counts for the module pages of a course
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTally {
    pub pages: usize,
    /// One entry per provider, in configuration order
    pub embeds: Vec<EmbedCount>,
}

impl PageTally {
    fn new(providers: usize) -> Self {
        Self {
            pages: 0,
            embeds: vec![EmbedCount::default(); providers],
        }
    }

    /// Adds one page's per-provider match counts
    fn record_page(&mut self, matches: &[usize]) {
        for (count, found) in self.embeds.iter_mut().zip(matches) {
            count.record_page(*found);
        }
    }
}

/// Audits courses sequentially against one LMS
pub struct CourseAuditor {
    api: CanvasApi,
    settings: AuditConfig,
    providers: Vec<ProviderConfig>,
}

impl CourseAuditor {
    pub fn new(api: CanvasApi, settings: AuditConfig, providers: Vec<ProviderConfig>) -> Self {
        Self {
            api,
            settings,
            providers,
        }
    }

    /// Creates an auditor with the client, pacing and rules from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = CanvasApi::from_config(config)?;
        Ok(Self::new(
            api,
            config.audit.clone(),
            config.providers.clone(),
        ))
    }

    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    /// Audits every course in order and returns one record per course
    ///
    /// A failing course yields an error record; the run always continues with
    /// the next course.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use course_audit::audit::CourseAuditor;
    /// use course_audit::config::load_config;
    /// use std::path::Path;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("audit.toml"))?;
    /// let auditor = CourseAuditor::from_config(&config)?;
    /// let records = auditor.run(&config.audit.course_ids).await;
    /// println!("{} records", records.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, course_ids: &[u64]) -> Vec<CourseAuditRecord> {
        let mut records = Vec::with_capacity(course_ids.len());

        for (index, course_id) in course_ids.iter().enumerate() {
            tracing::info!(
                "=== [{}/{}] Auditing course {} ===",
                index + 1,
                course_ids.len(),
                course_id
            );
            let record = self.audit_course(*course_id).await;
            tracing::debug!("Course {} {}", course_id, record.state());
            records.push(record);
        }

        records
    }

    /// Audits a single course
    ///
    /// This method:
    /// 1. Resolves the course name (placeholder on failure)
    /// 2. Collects students, quizzes, assignments, discussions and pages
    /// 3. Converts any error from step 2 into an error record
    pub async fn audit_course(&self, course_id: u64) -> CourseAuditRecord {
        let course_name = self.course_name(course_id).await;

        match self.collect_metrics(course_id, &course_name).await {
            Ok(metrics) => {
                tracing::info!(
                    "Done: \"{}\" - classic quizzes: {}%, new quizzes: {}%, other assignments: {}%, discussions: {}%",
                    course_name,
                    metrics.classic_quiz_participation(),
                    metrics.new_quiz_participation(),
                    metrics.other_assignment_participation(),
                    metrics.discussion_participation()
                );
                CourseAuditRecord::succeeded(course_id, course_name, metrics)
            }
            Err(e) => {
                tracing::error!("Error processing course {}: {}", course_id, e);
                CourseAuditRecord::failed(course_id, course_name, e.to_string())
            }
        }
    }

    /// Course name, or the configured placeholder if it cannot be read
    async fn course_name(&self, course_id: u64) -> String {
        match self.api.course(course_id).await {
            Ok(Some(course)) => course
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| self.settings.placeholder_course_name.clone()),
            Ok(None) => {
                tracing::warn!("Course {} metadata unavailable", course_id);
                self.settings.placeholder_course_name.clone()
            }
            Err(e) => {
                tracing::warn!("Course {} metadata failed: {}", course_id, e);
                self.settings.placeholder_course_name.clone()
            }
        }
    }

    async fn collect_metrics(&self, course_id: u64, course_name: &str) -> Result<CourseMetrics> {
        let enrollments = self.api.active_students(course_id).await?;
        let students = StudentSet::from_enrollments(&enrollments);
        tracing::info!(
            "[{}] Found {} unique active students",
            course_name,
            students.len()
        );

        let classic_quizzes = self
            .classic_quiz_tally(course_id, course_name, &students)
            .await?;

        let assignments = self.api.assignments(course_id).await?;
        let (new_quizzes, other_assignments) =
            partition_published(assignments, &self.settings.new_quiz_domains);
        tracing::info!(
            "[{}] Found {} published New Quizzes and {} other published assignments",
            course_name,
            new_quizzes.len(),
            other_assignments.len()
        );

        let new_quizzes = self
            .assignment_tally(
                course_id,
                course_name,
                &students,
                &new_quizzes,
                AssignmentClass::NewQuiz,
            )
            .await?;
        let other_assignments = self
            .assignment_tally(
                course_id,
                course_name,
                &students,
                &other_assignments,
                AssignmentClass::OtherAssignment,
            )
            .await?;

        let discussions = self
            .discussion_tally(course_id, course_name, &students)
            .await?;

        let pages = self.page_tally(course_id, course_name).await?;

        Ok(CourseMetrics {
            students: students.len(),
            classic_quizzes,
            new_quizzes,
            other_assignments,
            discussions,
            module_pages: pages.pages,
            embeds: pages.embeds,
        })
    }

    /// Published classic quizzes and their raw student submission count
    async fn classic_quiz_tally(
        &self,
        course_id: u64,
        course_name: &str,
        students: &StudentSet,
    ) -> Result<CategoryTally> {
        let quizzes = self.api.published_quizzes(course_id).await?;
        tracing::info!(
            "[{}] Found {} published classic quizzes",
            course_name,
            quizzes.len()
        );

        let mut tally = CategoryTally::default();
        for (index, quiz) in quizzes.iter().enumerate() {
            tracing::info!(
                "[{}] Fetching submissions for classic quiz \"{}\" ({} of {})",
                course_name,
                quiz.title.as_deref().unwrap_or_default(),
                index + 1,
                quizzes.len()
            );
            let submissions = self.api.quiz_submissions(course_id, quiz.id).await?;
            tally.add_item(count_submissions(
                students,
                &submissions,
                AssignmentClass::ClassicQuiz,
            ));
        }

        Ok(tally)
    }

    /// Distinct submitting students across one group of assignments
    async fn assignment_tally(
        &self,
        course_id: u64,
        course_name: &str,
        students: &StudentSet,
        assignments: &[Assignment],
        class: AssignmentClass,
    ) -> Result<CategoryTally> {
        let mut tally = CategoryTally::default();

        for (index, assignment) in assignments.iter().enumerate() {
            tracing::info!(
                "[{}] Fetching submissions for {} \"{}\" ({} of {})",
                course_name,
                class,
                assignment.name.as_deref().unwrap_or_default(),
                index + 1,
                assignments.len()
            );
            let submissions = self
                .api
                .assignment_submissions(course_id, assignment.id)
                .await?;
            tally.add_item(count_submissions(students, &submissions, class));
        }

        Ok(tally)
    }

    /// Distinct replying students across published, unlocked discussions
    async fn discussion_tally(
        &self,
        course_id: u64,
        course_name: &str,
        students: &StudentSet,
    ) -> Result<CategoryTally> {
        let topics = self.api.published_discussions(course_id).await?;
        tracing::info!(
            "[{}] Found {} published discussions",
            course_name,
            topics.len()
        );

        let mut tally = CategoryTally::default();
        for (index, topic) in topics.iter().enumerate() {
            tracing::info!(
                "[{}] Fetching entries for discussion \"{}\" ({} of {})",
                course_name,
                topic.title.as_deref().unwrap_or_default(),
                index + 1,
                topics.len()
            );
            let entries = self.api.discussion_entries(course_id, topic.id).await?;
            tally.add_item(students.count_distinct(entries.iter().map(|e| e.user_id)));
        }

        Ok(tally)
    }

    /// Module pages and provider embeds found in their bodies
    ///
    /// A page whose body cannot be fetched still counts as a page.
    async fn page_tally(&self, course_id: u64, course_name: &str) -> Result<PageTally> {
        let provider_ids: Vec<&str> = self.providers.iter().map(|p| p.id.as_str()).collect();
        let mut tally = PageTally::new(provider_ids.len());

        let modules = self.api.modules(course_id).await?;
        for module in &modules {
            let items = self.api.module_items(course_id, module.id).await?;
            let pages: Vec<_> = items.iter().filter(|item| item.is_page()).collect();

            for (index, item) in pages.iter().enumerate() {
                tracing::info!(
                    "[{}] Module \"{}\": Processing page \"{}\" ({} of {})",
                    course_name,
                    module.name.as_deref().unwrap_or_default(),
                    item.title.as_deref().unwrap_or_default(),
                    index + 1,
                    pages.len()
                );
                tally.pages += 1;

                match item.page_url.as_deref() {
                    Some(page_url) => match self.api.page_body(course_id, page_url).await {
                        Ok(Some(body)) if !body.is_empty() => {
                            tally.record_page(&scan_page(&body, &provider_ids));
                        }
                        Ok(_) => {
                            tracing::debug!("Page {} has no readable content", page_url);
                        }
                        Err(e) => {
                            tracing::warn!("Skipping page {}: {}", page_url, e);
                        }
                    },
                    None => tracing::debug!("Module item {} has no page_url", item.id),
                }

                self.api.pager().pause().await;
            }
        }

        Ok(tally)
    }
}

/// Applies the per-class counting rule to one item's submissions
fn count_submissions(
    students: &StudentSet,
    submissions: &[Submission],
    class: AssignmentClass,
) -> usize {
    let ids = submissions.iter().map(|s| s.user_id);
    if class.dedups_students() {
        students.count_distinct(ids)
    } else {
        students.count_records(ids)
    }
}
