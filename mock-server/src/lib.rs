use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Maximum docs per search page.
pub const MAX_LIMIT: usize = 10;
pub const DEFAULT_TOKEN: &str = "secret";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub semester: String,
    pub sections: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CourseDoc {
    #[serde(rename = "courseID")]
    pub course_id: String,
    pub name: String,
    pub department: String,
    pub units: String,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FceDoc {
    #[serde(rename = "courseID")]
    pub course_id: String,
    pub semester: String,
    pub instructor: String,
    #[serde(rename = "hrsPerWeek")]
    pub hrs_per_week: f64,
}

#[derive(Deserialize)]
pub struct TokenBody {
    pub token: String,
}

#[derive(Deserialize)]
pub struct CourseParams {
    #[serde(default)]
    pub schedules: bool,
}

/// In-memory catalog served by the mock backend.
#[derive(Debug)]
pub struct Backend {
    pub courses: Vec<CourseDoc>,
    pub fces: Vec<FceDoc>,
    pub token: String,
}

pub type Shared = Arc<Backend>;

impl Backend {
    pub fn new(courses: Vec<CourseDoc>, fces: Vec<FceDoc>, token: impl Into<String>) -> Self {
        Self {
            courses,
            fces,
            token: token.into(),
        }
    }

    /// A small catalog spanning three departments and two search pages.
    pub fn seeded(token: impl Into<String>) -> Self {
        let offered = |semester: &str| {
            vec![Schedule {
                semester: semester.to_string(),
                sections: vec!["A".to_string(), "B".to_string()],
            }]
        };
        let course =
            |id: &str, name: &str, department: &str, schedules: Vec<Schedule>| CourseDoc {
                course_id: id.to_string(),
                name: name.to_string(),
                department: department.to_string(),
                units: "12.0".to_string(),
                schedules,
            };
        let courses = vec![
            course(
                "15-112",
                "Fundamentals of Programming and Computer Science",
                "Computer Science",
                offered("F24"),
            ),
            course(
                "15-122",
                "Principles of Imperative Computation",
                "Computer Science",
                offered("F24"),
            ),
            course(
                "15-150",
                "Principles of Functional Programming",
                "Computer Science",
                offered("S25"),
            ),
            course(
                "15-210",
                "Parallel and Sequential Data Structures and Algorithms",
                "Computer Science",
                offered("S25"),
            ),
            course(
                "15-213",
                "Introduction to Computer Systems",
                "Computer Science",
                offered("F24"),
            ),
            course(
                "15-251",
                "Great Ideas in Theoretical Computer Science",
                "Computer Science",
                offered("S25"),
            ),
            course(
                "15-281",
                "Artificial Intelligence: Representation and Problem Solving",
                "Computer Science",
                offered("F24"),
            ),
            course("15-319", "Cloud Computing", "Computer Science", Vec::new()),
            course(
                "15-410",
                "Operating System Design and Implementation",
                "Computer Science",
                offered("S25"),
            ),
            course("15-445", "Database Systems", "Computer Science", offered("F24")),
            course("15-451", "Algorithm Design and Analysis", "Computer Science", offered("F24")),
            course("21-127", "Concepts of Mathematics", "Mathematical Sciences", offered("F24")),
            course(
                "21-241",
                "Matrices and Linear Transformations",
                "Mathematical Sciences",
                offered("S25"),
            ),
            course(
                "21-259",
                "Calculus in Three Dimensions",
                "Mathematical Sciences",
                offered("F24"),
            ),
            course("76-101", "Interpretation and Argument", "English", offered("F24")),
        ];
        let fce = |id: &str, semester: &str, instructor: &str, hrs: f64| FceDoc {
            course_id: id.to_string(),
            semester: semester.to_string(),
            instructor: instructor.to_string(),
            hrs_per_week: hrs,
        };
        let fces = vec![
            fce("15-122", "F23", "Cervesato", 11.5),
            fce("15-213", "F23", "Bryant", 13.0),
            fce("15-122", "S24", "Kaynar", 10.25),
            fce("21-127", "F23", "Mackey", 8.5),
            fce("15-213", "S24", "O'Hallaron", 12.5),
            fce("15-122", "F24", "Cervesato", 11.0),
        ];
        Self::new(courses, fces, token)
    }

    fn authorized(&self, token: &str) -> bool {
        !token.is_empty() && token == self.token
    }

    fn find(&self, course_id: &str) -> Option<&CourseDoc> {
        self.courses.iter().find(|c| c.course_id == course_id)
    }

    fn fces_for(&self, course_id: &str) -> Vec<&FceDoc> {
        self.fces.iter().filter(|f| f.course_id == course_id).collect()
    }
}

pub fn app() -> Router {
    app_with(Backend::seeded(DEFAULT_TOKEN))
}

pub fn app_with(backend: Backend) -> Router {
    let shared: Shared = Arc::new(backend);
    Router::new()
        .route("/api/courses", get(get_courses).post(post_courses))
        .route("/api/courses/search/", get(get_search).post(post_search))
        .route("/api/course/{course_id}", get(get_course))
        .route("/api/fces", post(post_fces))
        .with_state(shared)
}

pub async fn run(listener: TcpListener, backend: Backend) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(backend)).await
}

type Params = Vec<(String, String)>;

fn values<'a>(params: &'a Params, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    params.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn flag(params: &Params, key: &str) -> bool {
    values(params, key).any(|v| v == "true")
}

async fn get_courses(State(db): State<Shared>, Query(params): Query<Params>) -> Json<Vec<Value>> {
    Json(lookup_courses(&db, &params, false))
}

async fn post_courses(
    State(db): State<Shared>,
    Query(params): Query<Params>,
    Json(body): Json<TokenBody>,
) -> Json<Vec<Value>> {
    let with_fces = flag(&params, "fces") && db.authorized(&body.token);
    Json(lookup_courses(&db, &params, with_fces))
}

/// Matching courses in catalog order, regardless of the requested order.
fn lookup_courses(db: &Backend, params: &Params, with_fces: bool) -> Vec<Value> {
    let wanted: Vec<&str> = values(params, "courseID").collect();
    tracing::debug!(?wanted, with_fces, "exact lookup");
    db.courses
        .iter()
        .filter(|c| wanted.contains(&c.course_id.as_str()))
        .map(|c| {
            let mut doc = json!(c);
            if with_fces {
                doc["fces"] = json!(db.fces_for(&c.course_id));
            }
            doc
        })
        .collect()
}

async fn get_search(State(db): State<Shared>, Query(params): Query<Params>) -> Json<Value> {
    Json(search(&db, &params))
}

async fn post_search(
    State(db): State<Shared>,
    Query(params): Query<Params>,
    Json(_body): Json<TokenBody>,
) -> Json<Value> {
    Json(search(&db, &params))
}

fn search(db: &Backend, params: &Params) -> Value {
    let page = values(params, "page")
        .next()
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    let keywords = values(params, "keywords").next().map(str::to_lowercase);
    let departments: Vec<&str> = values(params, "department").collect();
    let scheduled_only = flag(params, "schedulesAvailable");

    let matches: Vec<&CourseDoc> = db
        .courses
        .iter()
        .filter(|c| !scheduled_only || !c.schedules.is_empty())
        .filter(|c| departments.is_empty() || departments.contains(&c.department.as_str()))
        .filter(|c| match &keywords {
            Some(k) => c.course_id.to_lowercase().contains(k) || c.name.to_lowercase().contains(k),
            None => true,
        })
        .collect();

    let total_docs = matches.len();
    let total_pages = total_docs.div_ceil(MAX_LIMIT);
    let docs: Vec<&CourseDoc> = matches
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(MAX_LIMIT))
        .take(MAX_LIMIT)
        .collect();
    tracing::debug!(page, total_docs, "search");

    json!({
        "totalDocs": total_docs,
        "totalPages": total_pages,
        "page": page,
        "docs": docs,
    })
}

async fn get_course(
    State(db): State<Shared>,
    Path(course_id): Path<String>,
    Query(params): Query<CourseParams>,
) -> Result<Json<Value>, StatusCode> {
    let course = db.find(&course_id).ok_or(StatusCode::NOT_FOUND)?;
    let mut doc = json!(course);
    if !params.schedules {
        if let Some(obj) = doc.as_object_mut() {
            obj.remove("schedules");
        }
    }
    Ok(Json(doc))
}

async fn post_fces(
    State(db): State<Shared>,
    Query(params): Query<Params>,
    Json(body): Json<TokenBody>,
) -> Result<Json<Vec<FceDoc>>, StatusCode> {
    if !db.authorized(&body.token) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let wanted: Vec<&str> = values(&params, "courseID").collect();
    let fces = db
        .fces
        .iter()
        .filter(|f| wanted.contains(&f.course_id.as_str()))
        .cloned()
        .collect();
    Ok(Json(fces))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(raw: &[(&str, &str)]) -> Params {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn course_serializes_with_backend_keys() {
        let backend = Backend::seeded(DEFAULT_TOKEN);
        let json = serde_json::to_value(backend.find("15-122").unwrap()).unwrap();
        assert_eq!(json["courseID"], "15-122");
        assert_eq!(json["department"], "Computer Science");
        assert!(json["schedules"].is_array());
    }

    #[test]
    fn search_paginates_by_max_limit() {
        let backend = Backend::seeded(DEFAULT_TOKEN);
        let first = search(&backend, &params(&[("page", "1")]));
        assert_eq!(first["totalDocs"], 15);
        assert_eq!(first["totalPages"], 2);
        assert_eq!(first["docs"].as_array().unwrap().len(), MAX_LIMIT);

        let second = search(&backend, &params(&[("page", "2")]));
        assert_eq!(second["docs"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn search_filters_by_schedules_keywords_and_department() {
        let backend = Backend::seeded(DEFAULT_TOKEN);
        let scheduled = search(&backend, &params(&[("page", "1"), ("schedulesAvailable", "true")]));
        assert_eq!(scheduled["totalDocs"], 14);

        let found = search(
            &backend,
            &params(&[("keywords", "PRINCIPLES"), ("department", "Computer Science")]),
        );
        assert_eq!(found["totalDocs"], 2);

        let math = search(
            &backend,
            &params(&[("department", "Mathematical Sciences"), ("department", "English")]),
        );
        assert_eq!(math["totalDocs"], 4);
    }

    #[test]
    fn lookup_returns_catalog_order_and_gates_fces() {
        let backend = Backend::seeded(DEFAULT_TOKEN);
        let wanted = params(&[("courseID", "21-127"), ("courseID", "15-122")]);
        let docs = lookup_courses(&backend, &wanted, false);
        assert_eq!(docs[0]["courseID"], "15-122");
        assert_eq!(docs[1]["courseID"], "21-127");
        assert!(docs[0].get("fces").is_none());

        let docs = lookup_courses(&backend, &wanted, true);
        assert_eq!(docs[0]["fces"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn empty_token_is_never_authorized() {
        let backend = Backend::seeded("");
        assert!(!backend.authorized(""));
    }
}
