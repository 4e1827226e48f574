//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `CatalogClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. Builders whose inputs trip an input guard return
//! `Ok(None)`: no request should be sent and the operation completes empty.
//! Caller-supplied course ids are canonicalized before they reach the wire.

use std::collections::HashMap;

use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::id::standardize_id;
use crate::query::{self, Query};
use crate::session::Session;
use crate::types::{Course, CourseKeyed, FceRecord, SearchPage, TokenBody};

pub const COURSES_PATH: &str = "/api/courses";
pub const SEARCH_PATH: &str = "/api/courses/search/";
pub const COURSE_PATH: &str = "/api/course";
pub const FCES_PATH: &str = "/api/fces";

/// Synchronous, stateless client for the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Paged search. Logged-in sessions POST their token, others GET.
    pub fn build_search_courses(&self, page: u64, session: &Session) -> Result<HttpRequest, ApiError> {
        let query = query::search_query(page, session);
        self.build_maybe_authenticated(SEARCH_PATH, &query, session)
    }

    /// Exact-id batch lookup, or `None` when `ids` is empty.
    pub fn build_course_infos(
        &self,
        ids: &[String],
        session: &Session,
    ) -> Result<Option<HttpRequest>, ApiError> {
        let ids = canonical_ids(ids);
        match query::course_infos_query(&ids, session) {
            Some(query) => self.build_maybe_authenticated(COURSES_PATH, &query, session).map(Some),
            None => Ok(None),
        }
    }

    /// Single-course lookup, or `None` when `course_id` is empty.
    ///
    /// The id is percent-encoded as a single path segment, so reserved
    /// characters in it cannot alter the path or the query.
    pub fn build_course_info(
        &self,
        course_id: &str,
        schedules: bool,
    ) -> Result<Option<HttpRequest>, ApiError> {
        let Some(query) = query::course_info_query(course_id, schedules) else {
            return Ok(None);
        };
        let base = format!("{}{COURSE_PATH}", self.base_url);
        let mut url =
            Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{base}: cannot carry a path")))?
            .push(&standardize_id(course_id));
        url.set_query(Some(&query.encode()));
        Ok(Some(HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }))
    }

    /// FCE batch lookup, or `None` when `ids` is empty or the session holds no
    /// token.
    pub fn build_fce_infos(
        &self,
        ids: &[String],
        session: &Session,
    ) -> Result<Option<HttpRequest>, ApiError> {
        let ids = canonical_ids(ids);
        let Some(query) = query::fce_infos_query(&ids, session) else {
            return Ok(None);
        };
        // fce_infos_query already checked for a bearer token.
        let token = session.bearer().unwrap_or_default();
        self.post_token(FCES_PATH, &query, token).map(Some)
    }

    pub fn parse_search_courses(&self, response: HttpResponse) -> Result<SearchPage, ApiError> {
        check_status(&response)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Decode an exact-id batch response.
    ///
    /// With `requested_order`, courses are re-sorted to follow it; courses whose
    /// id was not requested go last, keeping their response order.
    pub fn parse_course_infos(
        &self,
        response: HttpResponse,
        requested_order: Option<&[String]>,
    ) -> Result<Vec<Course>, ApiError> {
        check_status(&response)?;
        let mut courses: Vec<Course> = serde_json::from_str(&response.body)?;
        if let Some(order) = requested_order {
            sort_by_requested(&mut courses, &canonical_ids(order));
        }
        Ok(courses)
    }

    /// Decode a single-course response as raw JSON.
    pub fn parse_course_info(&self, response: HttpResponse) -> Result<serde_json::Value, ApiError> {
        check_status(&response)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    pub fn parse_fce_infos(&self, response: HttpResponse) -> Result<Vec<FceRecord>, ApiError> {
        check_status(&response)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    fn url(&self, path: &str, query: &Query) -> String {
        if query.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{}", self.base_url, query.encode())
        }
    }

    fn get(&self, path: &str, query: &Query) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path, query),
            headers: Vec::new(),
            body: None,
        }
    }

    fn post_token(&self, path: &str, query: &Query, token: &str) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&TokenBody {
            token: token.to_string(),
        })
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path, query),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    fn build_maybe_authenticated(
        &self,
        path: &str,
        query: &Query,
        session: &Session,
    ) -> Result<HttpRequest, ApiError> {
        if session.logged_in {
            self.post_token(path, query, &session.token)
        } else {
            Ok(self.get(path, query))
        }
    }
}

fn canonical_ids(ids: &[String]) -> Vec<String> {
    ids.iter().map(|id| standardize_id(id)).collect()
}

/// Stable sort by first position in `order`; unknown ids rank last.
pub(crate) fn sort_by_requested<T: CourseKeyed>(items: &mut [T], order: &[String]) {
    let mut rank: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    for (position, id) in order.iter().enumerate() {
        rank.entry(id.as_str()).or_insert(position);
    }
    items.sort_by_key(|item| rank.get(item.course_id()).copied().unwrap_or(usize::MAX));
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Filter;

    fn client() -> CatalogClient {
        CatalogClient::new("http://localhost:3000")
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn course_ids(courses: &[Course]) -> Vec<&str> {
        courses.iter().map(|c| c.course_id()).collect()
    }

    #[test]
    fn anonymous_search_is_a_get_without_body() {
        let req = client().build_search_courses(2, &Session::anonymous()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/api/courses/search/?page=2&schedulesAvailable=true"
        );
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn authenticated_search_posts_token() {
        let session = Session::authenticated("abc").with_filter(Filter {
            search: "systems".to_string(),
            departments: ids(&["CS"]),
        });
        let req = client().build_search_courses(1, &session).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "http://localhost:3000/api/courses/search/?page=1&schedulesAvailable=true&keywords=systems&department=CS"
        );
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "token": "abc" }));
    }

    #[test]
    fn course_infos_canonicalizes_ids() {
        let req = client()
            .build_course_infos(&ids(&["15122", "21-127"]), &Session::anonymous())
            .unwrap()
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/api/courses?courseID=15-122&courseID=21-127&schedulesAvailable=true"
        );
    }

    #[test]
    fn course_infos_empty_ids_builds_nothing() {
        let req = client().build_course_infos(&[], &Session::authenticated("t")).unwrap();
        assert!(req.is_none());
    }

    #[test]
    fn course_info_builds_path_from_id() {
        let req = client().build_course_info("15122", true).unwrap().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/course/15-122?schedules=true");
        assert!(client().build_course_info("", true).unwrap().is_none());
    }

    #[test]
    fn course_info_encodes_reserved_characters_in_id() {
        let req = client().build_course_info("15-122?x#y", true).unwrap().unwrap();
        let url = Url::parse(&req.url).unwrap();
        assert_eq!(url.query(), Some("schedules=true"));
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/api/course/15-122%3Fx%23y");

        let req = client().build_course_info("a/b%c", false).unwrap().unwrap();
        let url = Url::parse(&req.url).unwrap();
        assert_eq!(url.path(), "/api/course/a%2Fb%25c");
        assert_eq!(url.query(), Some("schedules=false"));
    }

    #[test]
    fn course_info_rejects_unusable_base_url() {
        let err = CatalogClient::new("not a url")
            .build_course_info("15-122", true)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn fce_infos_only_for_authenticated_sessions() {
        let wanted = ids(&["15-122"]);
        assert!(client().build_fce_infos(&wanted, &Session::anonymous()).unwrap().is_none());

        let req = client()
            .build_fce_infos(&wanted, &Session::authenticated("tok"))
            .unwrap()
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/fces?courseID=15-122");
        assert_eq!(req.body.as_deref(), Some(r#"{"token":"tok"}"#));
    }

    #[test]
    fn parse_course_infos_follows_requested_order() {
        let response = HttpResponse::ok(
            r#"[{"courseID":"15-122"},{"courseID":"15-213"},{"courseID":"21-127"}]"#,
        );
        let order = ids(&["21-127", "15-122", "15-213"]);
        let courses = client().parse_course_infos(response, Some(&order)).unwrap();
        assert_eq!(course_ids(&courses), vec!["21-127", "15-122", "15-213"]);
    }

    #[test]
    fn parse_course_infos_puts_unrequested_ids_last() {
        let response = HttpResponse::ok(
            r#"[{"courseID":"99-001"},{"courseID":"15-213"},{"courseID":"98-002"},{"courseID":"15-122"}]"#,
        );
        let order = ids(&["15122", "15-213"]);
        let courses = client().parse_course_infos(response, Some(&order)).unwrap();
        assert_eq!(course_ids(&courses), vec!["15-122", "15-213", "99-001", "98-002"]);
    }

    #[test]
    fn parse_course_infos_without_order_keeps_response_order() {
        let response = HttpResponse::ok(r#"[{"courseID":"b"},{"courseID":"a"}]"#);
        let courses = client().parse_course_infos(response, None).unwrap();
        assert_eq!(course_ids(&courses), vec!["b", "a"]);
    }

    #[test]
    fn parse_course_info_not_found() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        let err = client().parse_course_info(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_search_wrong_status() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "internal error".to_string(),
        };
        let err = client().parse_search_courses(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_fce_infos_bad_json() {
        let err = client().parse_fce_infos(HttpResponse::ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CatalogClient::new("http://localhost:3000/");
        let req = client.build_course_info("15-122", false).unwrap().unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/course/15-122?schedules=false");
    }
}
