//! Student membership and participation arithmetic

use crate::api::models::Enrollment;
use std::collections::HashSet;
use std::fmt;

/// De-duplicated ids of a course's active students
#[derive(Debug, Clone, Default)]
pub struct StudentSet {
    ids: HashSet<u64>,
}

impl StudentSet {
    pub fn from_enrollments(enrollments: &[Enrollment]) -> Self {
        enrollments.iter().map(|e| e.user_id).collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Counts records by enrolled students, one per record
    pub fn count_records<I>(&self, user_ids: I) -> usize
    where
        I: IntoIterator<Item = Option<u64>>,
    {
        user_ids
            .into_iter()
            .flatten()
            .filter(|id| self.contains(*id))
            .count()
    }

    /// Counts distinct enrolled students among the records
    pub fn count_distinct<I>(&self, user_ids: I) -> usize
    where
        I: IntoIterator<Item = Option<u64>>,
    {
        user_ids
            .into_iter()
            .flatten()
            .filter(|id| self.contains(*id))
            .collect::<HashSet<_>>()
            .len()
    }
}

impl FromIterator<u64> for StudentSet {
    fn from_iter<T: IntoIterator<Item = u64>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Items of one category and the student responses they collected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTally {
    pub items: usize,
    pub matching: usize,
}

impl CategoryTally {
    /// Adds one item with its matching response count
    pub fn add_item(&mut self, matching: usize) {
        self.items += 1;
        self.matching += matching;
    }

    pub fn participation(&self, students: usize) -> Participation {
        Participation::compute(self.matching, students, self.items)
    }
}

/// Share of possible student responses actually made
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Participation {
    /// No items or no students
    NotApplicable,
    /// Percentage rounded to one decimal place
    Percent(f64),
}

impl Participation {
    /// `matching / (students × items) × 100`, rounded to one decimal
    pub fn compute(matching: usize, students: usize, items: usize) -> Self {
        if students == 0 || items == 0 {
            return Self::NotApplicable;
        }
        let possible = students as f64 * items as f64;
        Self::Percent(round1(matching as f64 / possible * 100.0))
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::NotApplicable => None,
            Self::Percent(p) => Some(*p),
        }
    }
}

impl fmt::Display for Participation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplicable => f.write_str("N/A"),
            Self::Percent(p) => write!(f, "{:.1}", p),
        }
    }
}

/// Rounds to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
