//! Query-parameter construction for the catalog endpoints.
//!
//! # Design
//! Each builder returns an ordered `Query` of key/value pairs. Multi-valued
//! keys (`courseID`, `department`) appear once per value in caller order, so
//! the list is kept as pairs rather than a map. Builders that can short-circuit
//! return `None` instead of a query; that is an input guard, not an error.

use url::form_urlencoded;

use crate::session::Session;

/// Ordered, possibly multi-valued query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping any existing pair with the same key.
    pub fn append(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// All values recorded for `key`, in insertion order.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` rendering, without the leading `?`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Parameters for a paged keyword/department search.
pub fn search_query(page: u64, session: &Session) -> Query {
    let mut query = Query::new();
    query
        .append("page", page.to_string())
        .append("schedulesAvailable", "true");

    if !session.filter.search.is_empty() {
        query.append("keywords", session.filter.search.clone());
    }
    for department in &session.filter.departments {
        query.append("department", department.clone());
    }
    query
}

/// Parameters for an exact-id batch lookup. `None` when `ids` is empty.
pub fn course_infos_query(ids: &[String], session: &Session) -> Option<Query> {
    if ids.is_empty() {
        return None;
    }
    let mut query = Query::new();
    for id in ids {
        query.append("courseID", id.clone());
    }
    query.append("schedulesAvailable", "true");
    if session.logged_in {
        query.append("fces", "true");
    }
    Some(query)
}

/// Parameters for a single-course lookup. `None` when `course_id` is empty.
pub fn course_info_query(course_id: &str, schedules: bool) -> Option<Query> {
    if course_id.is_empty() {
        return None;
    }
    let mut query = Query::new();
    query.append("schedules", schedules.to_string());
    Some(query)
}

/// Parameters for an FCE batch lookup.
///
/// FCEs are only served to authenticated users, so this is `None` for an
/// empty id list and for sessions without a usable token.
pub fn fce_infos_query(ids: &[String], session: &Session) -> Option<Query> {
    if ids.is_empty() || session.bearer().is_none() {
        return None;
    }
    let mut query = Query::new();
    for id in ids {
        query.append("courseID", id.clone());
    }
    Some(query)
}
