//! Assignment classification
//!
//! Every published assignment is either a New Quiz (an external tool launch
//! on a configured quiz LTI domain) or an ordinary assignment. Classic
//! quizzes come from their own endpoint and carry their own class.

use crate::api::models::Assignment;
use std::fmt;

/// Submission type that marks an external tool assignment
const EXTERNAL_TOOL: &str = "external_tool";

/// Mutually exclusive category of a gradable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentClass {
    /// A quiz from the platform's original quiz engine
    ClassicQuiz,
    /// An assignment launched through the New Quizzes LTI tool
    NewQuiz,
    /// Any other published assignment
    OtherAssignment,
}

impl AssignmentClass {
    /// Returns true if a student counts at most once per item
    ///
    /// Classic quizzes count every submission record the API returns.
    pub fn dedups_students(&self) -> bool {
        !matches!(self, Self::ClassicQuiz)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ClassicQuiz => "classic quiz",
            Self::NewQuiz => "New Quiz",
            Self::OtherAssignment => "assignment",
        }
    }
}

impl fmt::Display for AssignmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies one assignment record
///
/// An assignment is a New Quiz iff its submission types include
/// `external_tool` and its tool URL contains one of `new_quiz_domains`.
pub fn classify_assignment(assignment: &Assignment, new_quiz_domains: &[String]) -> AssignmentClass {
    let is_tool = assignment
        .submission_types
        .iter()
        .any(|t| t == EXTERNAL_TOOL);

    let on_quiz_domain = assignment
        .external_tool_url
        .as_deref()
        .map(|url| new_quiz_domains.iter().any(|domain| url.contains(domain.as_str())))
        .unwrap_or(false);

    if is_tool && on_quiz_domain {
        AssignmentClass::NewQuiz
    } else {
        AssignmentClass::OtherAssignment
    }
}

/// Splits published assignments into New Quizzes and other assignments
///
/// Unpublished assignments are dropped. Order within each group follows the
/// input.
pub fn partition_published(
    assignments: Vec<Assignment>,
    new_quiz_domains: &[String],
) -> (Vec<Assignment>, Vec<Assignment>) {
    assignments
        .into_iter()
        .filter(|a| a.published)
        .partition(|a| classify_assignment(a, new_quiz_domains) == AssignmentClass::NewQuiz)
}
