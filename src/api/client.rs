//! LMS REST API client
//!
//! This module handles:
//! - Building the HTTP client with a descriptive user agent
//! - Constructing endpoint URLs under `/api/v1`
//! - Typed accessors for every collection the audit reads

use crate::api::models::{
    Assignment, Course, DiscussionEntry, DiscussionTopic, Enrollment, Module, ModuleItem, Quiz,
    Submission, WikiPage,
};
use crate::api::pager::{Extract, ThrottledPager};
use crate::config::{Config, UserAgentConfig};
use crate::{Result, UrlError};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use course_audit::api::build_http_client;
/// use course_audit::config::UserAgentConfig;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent: `Name/Version` or `Name/Version (+contact)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    match &config.contact_email {
        Some(email) => format!("{}/{} (+{})", config.name, config.version, email),
        None => format!("{}/{}", config.name, config.version),
    }
}

/// Typed access to the course resources the audit needs
#[derive(Debug, Clone)]
pub struct CanvasApi {
    pager: ThrottledPager,
    base: Url,
    per_page: u32,
}

impl CanvasApi {
    /// Creates a client for the LMS rooted at `base_url`
    pub fn new(base_url: &str, per_page: u32, pager: ThrottledPager) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(UrlError::Malformed(format!("{} cannot be a base URL", base_url)).into());
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            pager,
            base,
            per_page,
        })
    }

    /// Builds the client, pager and credentials from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.pager.timeout())?;
        let pager = ThrottledPager::new(client, config.access_token(), config.pager.clone());
        Self::new(&config.canvas.base_url, config.canvas.per_page, pager)
    }

    pub fn pager(&self) -> &ThrottledPager {
        &self.pager
    }

    /// Course metadata; `None` when the course cannot be read
    pub async fn course(&self, course_id: u64) -> Result<Option<Course>> {
        let url = self.endpoint(&["courses", course_id.to_string().as_str()], false)?;
        self.pager.fetch_one(url).await
    }

    /// Active student enrollments
    pub async fn active_students(&self, course_id: u64) -> Result<Vec<Enrollment>> {
        let mut url = self.course_endpoint(course_id, &["enrollments"])?;
        url.query_pairs_mut()
            .append_pair("type[]", "StudentEnrollment")
            .append_pair("state[]", "active");
        self.pager.fetch_all(url, Extract::Array).await
    }

    /// Published classic quizzes
    pub async fn published_quizzes(&self, course_id: u64) -> Result<Vec<Quiz>> {
        let url = self.course_endpoint(course_id, &["quizzes"])?;
        let quizzes: Vec<Quiz> = self.pager.fetch_all(url, Extract::Array).await?;
        Ok(quizzes.into_iter().filter(|q| q.published).collect())
    }

    /// Submissions to a classic quiz
    pub async fn quiz_submissions(&self, course_id: u64, quiz_id: u64) -> Result<Vec<Submission>> {
        let url = self.course_endpoint(
            course_id,
            &["quizzes", quiz_id.to_string().as_str(), "submissions"],
        )?;
        self.pager
            .fetch_all(url, Extract::Field("quiz_submissions"))
            .await
    }

    /// Every assignment, published or not
    pub async fn assignments(&self, course_id: u64) -> Result<Vec<Assignment>> {
        let url = self.course_endpoint(course_id, &["assignments"])?;
        self.pager.fetch_all(url, Extract::Array).await
    }

    /// Submissions to an assignment
    pub async fn assignment_submissions(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Vec<Submission>> {
        let url = self.course_endpoint(
            course_id,
            &["assignments", assignment_id.to_string().as_str(), "submissions"],
        )?;
        self.pager.fetch_all(url, Extract::Array).await
    }

    /// Published, unlocked discussion topics
    pub async fn published_discussions(&self, course_id: u64) -> Result<Vec<DiscussionTopic>> {
        let url = self.course_endpoint(course_id, &["discussion_topics"])?;
        let topics: Vec<DiscussionTopic> = self.pager.fetch_all(url, Extract::Array).await?;
        Ok(topics
            .into_iter()
            .filter(|t| t.published && !t.locked)
            .collect())
    }

    /// Replies to a discussion topic
    pub async fn discussion_entries(
        &self,
        course_id: u64,
        topic_id: u64,
    ) -> Result<Vec<DiscussionEntry>> {
        let url = self.course_endpoint(
            course_id,
            &["discussion_topics", topic_id.to_string().as_str(), "entries"],
        )?;
        self.pager.fetch_all(url, Extract::Array).await
    }

    pub async fn modules(&self, course_id: u64) -> Result<Vec<Module>> {
        let url = self.course_endpoint(course_id, &["modules"])?;
        self.pager.fetch_all(url, Extract::Array).await
    }

    pub async fn module_items(&self, course_id: u64, module_id: u64) -> Result<Vec<ModuleItem>> {
        let url = self.course_endpoint(
            course_id,
            &["modules", module_id.to_string().as_str(), "items"],
        )?;
        self.pager.fetch_all(url, Extract::Array).await
    }

    /// HTML body of a wiki page; `None` when the page cannot be read
    pub async fn page_body(&self, course_id: u64, page_url: &str) -> Result<Option<String>> {
        let id = course_id.to_string();
        let url = self.endpoint(&["courses", id.as_str(), "pages", page_url], false)?;
        let page: Option<WikiPage> = self.pager.fetch_one(url).await?;
        Ok(page.map(|p| p.body.unwrap_or_default()))
    }

    /// The course-level requests an audit starts from, in audit order
    ///
    /// Per-item requests (submissions, entries, module items, pages) depend
    /// on the responses and are not included.
    pub fn seed_urls(&self, course_id: u64) -> Result<Vec<Url>> {
        let id = course_id.to_string();
        let mut urls = vec![self.endpoint(&["courses", id.as_str()], false)?];
        for collection in [
            "enrollments",
            "quizzes",
            "assignments",
            "discussion_topics",
            "modules",
        ] {
            urls.push(self.course_endpoint(course_id, &[collection])?);
        }
        Ok(urls)
    }

    /// A paginated endpoint below `/courses/:id`
    fn course_endpoint(&self, course_id: u64, segments: &[&str]) -> Result<Url> {
        let id = course_id.to_string();
        let mut path = vec!["courses", id.as_str()];
        path.extend_from_slice(segments);
        self.endpoint(&path, true)
    }

    /// Builds `{base}/api/v1/{segments}`, optionally with `per_page`
    fn endpoint(&self, segments: &[&str], paginated: bool) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| UrlError::Malformed(self.base.to_string()))?;
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }

        if paginated {
            url.query_pairs_mut()
                .append_pair("per_page", &self.per_page.to_string());
        }

        Ok(url)
    }
}
