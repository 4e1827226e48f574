//! Domain DTOs for the catalog API.
//!
//! # Design
//! The backend owns the course and FCE schemas. Only `courseID` is modeled;
//! every other field is kept verbatim in a flattened JSON map so records pass
//! through unchanged when the backend adds or renames fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Anything keyed by a course id.
pub trait CourseKeyed {
    fn course_id(&self) -> &str;
}

/// A course record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    #[serde(rename = "courseID")]
    pub course_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A faculty course evaluation record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FceRecord {
    #[serde(rename = "courseID")]
    pub course_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Course {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            fields: Map::new(),
        }
    }

    /// Look up a pass-through field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl FceRecord {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            fields: Map::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl CourseKeyed for Course {
    fn course_id(&self) -> &str {
        &self.course_id
    }
}

impl CourseKeyed for FceRecord {
    fn course_id(&self) -> &str {
        &self.course_id
    }
}

/// One page of paged-search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub total_docs: u64,
    pub total_pages: u64,
    pub page: u64,
    pub docs: Vec<Course>,
}

/// JSON body sent on authenticated requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBody {
    pub token: String,
}
