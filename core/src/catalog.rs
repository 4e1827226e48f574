//! Fetch operations wired to the store.
//!
//! # Design
//! `Catalog` is the only place where building, executing and parsing meet. A
//! tracked operation dispatches `Pending` before any I/O, performs at most one
//! transport call, then dispatches exactly one of the fulfilled or rejected
//! actions with the same generation. Errors are still returned to the caller
//! after being recorded in the state. Nothing is retried.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::client::CatalogClient;
use crate::error::ApiError;
use crate::session::Session;
use crate::state::{Action, Generation, Operation};
use crate::store::SearchStore;
use crate::transport::Transport;
use crate::types::{Course, FceRecord, SearchPage};

pub struct Catalog<T> {
    client: CatalogClient,
    transport: T,
    store: Arc<SearchStore>,
}

impl<T: Transport> Catalog<T> {
    pub fn new(client: CatalogClient, transport: T) -> Self {
        Self::with_store(client, transport, Arc::new(SearchStore::new()))
    }

    pub fn with_store(client: CatalogClient, transport: T, store: Arc<SearchStore>) -> Self {
        Self {
            client,
            transport,
            store,
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<SearchStore> {
        &self.store
    }

    /// Fetch one page of search results for the session's filter.
    pub async fn fetch_course_infos_by_page(
        &self,
        page: u64,
        session: &Session,
    ) -> Result<SearchPage, ApiError> {
        let op = Operation::SearchCourses;
        let generation = self.begin(op);
        debug!(%op, %generation, page, logged_in = session.logged_in, "dispatching");

        let result: Result<SearchPage, ApiError> = async {
            let request = self.client.build_search_courses(page, session)?;
            let response = self.transport.execute(request).await?;
            self.client.parse_search_courses(response)
        }
        .await;

        match result {
            Ok(found) => {
                self.settle(Action::SearchFulfilled(generation, found.clone()), op, generation);
                Ok(found)
            }
            Err(err) => Err(self.reject(op, generation, err)),
        }
    }

    /// Fetch specific courses by id.
    ///
    /// An empty id list resolves to an empty result without a request. For
    /// logged-in sessions the result follows the requested id order.
    pub async fn fetch_course_infos(
        &self,
        ids: &[String],
        session: &Session,
    ) -> Result<Vec<Course>, ApiError> {
        let op = Operation::CourseInfos;
        let generation = self.begin(op);
        debug!(%op, %generation, ?ids, "dispatching");

        let result: Result<Vec<Course>, ApiError> = async {
            let Some(request) = self.client.build_course_infos(ids, session)? else {
                debug!(%op, %generation, "no ids requested, skipping request");
                return Ok(Vec::new());
            };
            let response = self.transport.execute(request).await?;
            let order = session.logged_in.then_some(ids);
            self.client.parse_course_infos(response, order)
        }
        .await;

        match result {
            Ok(courses) => {
                self.settle(Action::CourseInfosFulfilled(generation, courses.clone()), op, generation);
                Ok(courses)
            }
            Err(err) => Err(self.reject(op, generation, err)),
        }
    }

    /// Fetch a single course. Not tracked in the store.
    ///
    /// Returns `Ok(None)` without a request when `course_id` is empty.
    pub async fn fetch_course_info(
        &self,
        course_id: &str,
        schedules: bool,
    ) -> Result<Option<serde_json::Value>, ApiError> {
        let Some(request) = self.client.build_course_info(course_id, schedules)? else {
            return Ok(None);
        };
        debug!(course_id, schedules, "fetching course");
        let response = self.transport.execute(request).await?;
        self.client.parse_course_info(response).map(Some)
    }

    /// Fetch FCE records and group them into the store.
    ///
    /// Resolves to `Ok(None)` without a request when `ids` is empty or the
    /// session has no token.
    pub async fn fetch_fce_infos(
        &self,
        ids: &[String],
        session: &Session,
    ) -> Result<Option<Vec<FceRecord>>, ApiError> {
        let op = Operation::FceInfos;
        let generation = self.begin(op);
        debug!(%op, %generation, ?ids, "dispatching");

        let result: Result<Option<Vec<FceRecord>>, ApiError> = async {
            let Some(request) = self.client.build_fce_infos(ids, session)? else {
                debug!(%op, %generation, "no ids or no token, skipping request");
                return Ok(None);
            };
            let response = self.transport.execute(request).await?;
            self.client.parse_fce_infos(response).map(Some)
        }
        .await;

        match result {
            Ok(fces) => {
                self.settle(Action::FceInfosFulfilled(generation, fces.clone()), op, generation);
                Ok(fces)
            }
            Err(err) => Err(self.reject(op, generation, err)),
        }
    }

    pub fn clear(&self) {
        self.store.dispatch(Action::Clear);
    }

    pub fn set_exact_results_active(&self, active: bool) {
        self.store.dispatch(Action::SetExactResultsActive(active));
    }

    pub fn bookmark(&self, course: Course) -> bool {
        self.store.dispatch(Action::Bookmark(course))
    }

    pub fn unbookmark(&self, course_id: &str) -> bool {
        self.store.dispatch(Action::Unbookmark(course_id.to_string()))
    }

    fn begin(&self, op: Operation) -> Generation {
        let generation = self.store.next_generation();
        self.store.dispatch(Action::Pending(op, generation));
        generation
    }

    fn settle(&self, action: Action, op: Operation, generation: Generation) {
        if !self.store.dispatch(action) {
            trace!(%op, %generation, "discarding stale outcome");
        }
    }

    fn reject(&self, op: Operation, generation: Generation, err: ApiError) -> ApiError {
        warn!(%op, %generation, error = %err, "request failed");
        self.settle(Action::Rejected(op, generation, err.to_string()), op, generation);
        err
    }
}
