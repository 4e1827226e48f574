//! The search state snapshot and the reducer that evolves it.
//!
//! # Design
//! `SearchState` is plain data. It changes only through `SearchState::apply`,
//! which folds one `Action` into it. The three tracked fetch operations move
//! through pending, then exactly one of fulfilled or rejected. Each pending
//! action carries a `Generation`; an outcome is applied only while its
//! generation is the one in flight for that operation, so a slow response to
//! an older dispatch cannot overwrite a newer one and a dispatch settles at
//! most once.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::types::{Course, CourseKeyed, FceRecord, SearchPage};

/// Monotonic id stamped on every dispatch of a tracked operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The asynchronous operations whose lifecycle is tracked in the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SearchCourses,
    CourseInfos,
    FceInfos,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SearchCourses => "search_courses",
            Operation::CourseInfos => "course_infos",
            Operation::FceInfos => "fce_infos",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Pending(Operation, Generation),
    SearchFulfilled(Generation, SearchPage),
    CourseInfosFulfilled(Generation, Vec<Course>),
    /// `None` when the lookup short-circuited without a request.
    FceInfosFulfilled(Generation, Option<Vec<FceRecord>>),
    Rejected(Operation, Generation, String),
    Clear,
    SetExactResultsActive(bool),
    Bookmark(Course),
    Unbookmark(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InFlight {
    search_courses: Option<Generation>,
    course_infos: Option<Generation>,
    fce_infos: Option<Generation>,
}

impl InFlight {
    fn slot(&mut self, op: Operation) -> &mut Option<Generation> {
        match op {
            Operation::SearchCourses => &mut self.search_courses,
            Operation::CourseInfos => &mut self.course_infos,
            Operation::FceInfos => &mut self.fce_infos,
        }
    }

    /// Consume the in-flight marker if `generation` is the one outstanding.
    fn settle(&mut self, op: Operation, generation: Generation) -> bool {
        let slot = self.slot(op);
        if *slot == Some(generation) {
            *slot = None;
            true
        } else {
            false
        }
    }
}

/// Everything the search UI renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub total_docs: u64,
    pub total_pages: u64,
    pub page: u64,
    pub results: Vec<Course>,
    pub exact_results: Vec<Course>,
    pub bookmarked_results: Vec<Course>,
    pub fces: BTreeMap<String, Vec<FceRecord>>,
    pub fces_loading: bool,
    pub courses_loading: bool,
    pub exact_results_active: bool,
    pub exact_results_loading: bool,
    pub courses_error: Option<String>,
    pub exact_results_error: Option<String>,
    pub fces_error: Option<String>,
    #[serde(skip)]
    in_flight: InFlight,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            total_docs: 0,
            total_pages: 0,
            page: 1,
            results: Vec::new(),
            exact_results: Vec::new(),
            bookmarked_results: Vec::new(),
            fces: BTreeMap::new(),
            fces_loading: false,
            courses_loading: false,
            exact_results_active: false,
            exact_results_loading: false,
            courses_error: None,
            exact_results_error: None,
            fces_error: None,
            in_flight: InFlight::default(),
        }
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self, op: Operation) -> bool {
        match op {
            Operation::SearchCourses => self.courses_loading,
            Operation::CourseInfos => self.exact_results_loading,
            Operation::FceInfos => self.fces_loading,
        }
    }

    pub fn error(&self, op: Operation) -> Option<&str> {
        match op {
            Operation::SearchCourses => self.courses_error.as_deref(),
            Operation::CourseInfos => self.exact_results_error.as_deref(),
            Operation::FceInfos => self.fces_error.as_deref(),
        }
    }

    pub fn is_bookmarked(&self, course_id: &str) -> bool {
        self.bookmarked_results
            .iter()
            .any(|c| c.course_id() == course_id)
    }

    /// Fold `action` into the state. Returns `false` when the action was
    /// discarded as stale or already settled.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Pending(op, generation) => {
                *self.in_flight.slot(op) = Some(generation);
                self.set_loading(op, true);
                *self.error_slot(op) = None;
            }
            Action::SearchFulfilled(generation, page) => {
                if !self.in_flight.settle(Operation::SearchCourses, generation) {
                    return false;
                }
                self.total_docs = page.total_docs;
                self.total_pages = page.total_pages;
                self.page = page.page;
                self.results = page.docs;
                self.courses_loading = false;
            }
            Action::CourseInfosFulfilled(generation, courses) => {
                if !self.in_flight.settle(Operation::CourseInfos, generation) {
                    return false;
                }
                self.exact_results = courses;
                self.exact_results_loading = false;
            }
            Action::FceInfosFulfilled(generation, fces) => {
                if !self.in_flight.settle(Operation::FceInfos, generation) {
                    return false;
                }
                self.fces_loading = false;
                if let Some(fces) = fces {
                    group_fces(&mut self.fces, fces);
                }
            }
            Action::Rejected(op, generation, error) => {
                if !self.in_flight.settle(op, generation) {
                    return false;
                }
                self.set_loading(op, false);
                *self.error_slot(op) = Some(error);
            }
            Action::Clear => {
                self.fces.clear();
                self.results.clear();
                self.bookmarked_results.clear();
            }
            Action::SetExactResultsActive(active) => {
                self.exact_results_active = active;
            }
            Action::Bookmark(course) => {
                if self.is_bookmarked(course.course_id()) {
                    return false;
                }
                self.bookmarked_results.push(course);
            }
            Action::Unbookmark(course_id) => {
                let before = self.bookmarked_results.len();
                self.bookmarked_results.retain(|c| c.course_id() != course_id);
                return self.bookmarked_results.len() != before;
            }
        }
        true
    }

    fn set_loading(&mut self, op: Operation, loading: bool) {
        match op {
            Operation::SearchCourses => self.courses_loading = loading,
            Operation::CourseInfos => self.exact_results_loading = loading,
            Operation::FceInfos => self.fces_loading = loading,
        }
    }

    fn error_slot(&mut self, op: Operation) -> &mut Option<String> {
        match op {
            Operation::SearchCourses => &mut self.courses_error,
            Operation::CourseInfos => &mut self.exact_results_error,
            Operation::FceInfos => &mut self.fces_error,
        }
    }
}

/// Group `payload` by course id into `fces`.
///
/// Every id present in the payload has its previous sequence replaced by the
/// payload's records for it, in payload order. Ids absent from the payload
/// keep what they had. An empty payload changes nothing.
pub fn group_fces(fces: &mut BTreeMap<String, Vec<FceRecord>>, payload: Vec<FceRecord>) {
    if payload.is_empty() {
        return;
    }
    let ids: BTreeSet<String> = payload.iter().map(|f| f.course_id().to_string()).collect();
    for id in ids {
        fces.insert(id, Vec::new());
    }
    for fce in payload {
        fces.entry(fce.course_id.clone()).or_default().push(fce);
    }
}
