//! JSON resource shapes returned by the LMS REST API
//!
//! Only the fields the audit reads are declared; everything else in a
//! payload is ignored.

use serde::Deserialize;

/// Course metadata (`GET /courses/:id`)
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A student enrollment record
#[derive(Debug, Clone, Deserialize)]
pub struct Enrollment {
    pub user_id: u64,
}

/// A classic quiz
#[derive(Debug, Clone, Deserialize)]
pub struct Quiz {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// A quiz or assignment submission
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub user_id: Option<u64>,
}

/// An assignment, possibly backed by an external tool
#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub submission_types: Vec<String>,
    #[serde(default)]
    pub external_tool_url: Option<String>,
}

/// A discussion topic
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionTopic {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub locked: bool,
}

/// A top-level reply to a discussion topic
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionEntry {
    #[serde(default)]
    pub user_id: Option<u64>,
}

/// A course module
#[derive(Debug, Clone, Deserialize)]
pub struct Module {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// An item inside a module
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub page_url: Option<String>,
}

impl ModuleItem {
    /// Returns true for items that point at a wiki page
    pub fn is_page(&self) -> bool {
        self.kind == "Page"
    }
}

/// A wiki page with its HTML body
#[derive(Debug, Clone, Deserialize)]
pub struct WikiPage {
    #[serde(default)]
    pub body: Option<String>,
}
