//! Stateless HTTP request builder and response parser for observations.
//!
//! # Design
//! `NaturalistClient` holds only its `ClientConfig` and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes the matching
//! `HttpResponse`. The convenience methods without a prefix run both around an
//! `HttpExecutor`.
//!
//! The provider answers create, update and delete with 201, even for the two
//! that create nothing. That code is recorded on each request as
//! `expected_status` and checked by the parser.

use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Operation};
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse};
use crate::paging::PageInfo;
use crate::query::ObservationQuery;
use crate::types::{
    CreateObservation, Observation, ObservationSummary, ObservationsPage, UpdateObservation,
};

const STATUS_OK: u16 = 200;
/// Success code for every write, including update and delete.
const STATUS_WRITTEN: u16 = 201;

/// Synchronous, stateless client for the observations API.
#[derive(Debug, Clone)]
pub struct NaturalistClient {
    config: ClientConfig,
}

impl NaturalistClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------------

    pub fn build_list_observations(
        &self,
        query: Option<&ObservationQuery>,
    ) -> Result<HttpRequest, ApiError> {
        let mut url = self.url("/observations.json");
        if let Some(query) = query {
            let params = query.to_query_string().map_err(|e| ApiError::Encode {
                operation: Operation::ListObservations,
                message: e.to_string(),
            })?;
            if !params.is_empty() {
                url.push('?');
                url.push_str(&params);
            }
        }
        Ok(self.request(HttpMethod::Get, url, None, STATUS_OK))
    }

    pub fn build_list_observations_by_username(&self, username: &str) -> HttpRequest {
        let url = self.url(&format!(
            "/observations/{}.json",
            urlencoding::encode(username)
        ));
        self.request(HttpMethod::Get, url, None, STATUS_OK)
    }

    /// Shared by the full and summary views; they differ only in parsing.
    pub fn build_get_observation(&self, id: i64) -> HttpRequest {
        let url = self.url(&format!("/observations/{id}.json"));
        self.request(HttpMethod::Get, url, None, STATUS_OK)
    }

    pub fn build_create_observation(
        &self,
        input: &CreateObservation,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(Operation::CreateObservation, input)?;
        let url = self.url("/observations.json");
        Ok(self.request(HttpMethod::Post, url, Some(body), STATUS_WRITTEN))
    }

    pub fn build_update_observation(
        &self,
        input: &UpdateObservation,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(Operation::UpdateObservation, input)?;
        let url = self.url(&format!("/observations/{}.json", input.id));
        Ok(self.request(HttpMethod::Put, url, Some(body), STATUS_WRITTEN))
    }

    pub fn build_delete_observation(&self, id: i64) -> HttpRequest {
        let url = self.url(&format!("/observations/{id}.json"));
        self.request(HttpMethod::Delete, url, None, STATUS_WRITTEN)
    }

    // ---------------------------------------------------------------------
    // Responses
    // ---------------------------------------------------------------------

    pub fn parse_list_observations(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<ObservationsPage, ApiError> {
        parse_page(Operation::ListObservations, request, response)
    }

    pub fn parse_list_observations_by_username(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<ObservationsPage, ApiError> {
        parse_page(Operation::ListObservationsByUsername, request, response)
    }

    pub fn parse_get_observation(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<Observation, ApiError> {
        let operation = Operation::GetObservation;
        check_status(operation, request, &response)?;
        decode(operation, request, &response.body)
    }

    pub fn parse_get_observation_summary(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<ObservationSummary, ApiError> {
        let operation = Operation::GetObservationSummary;
        check_status(operation, request, &response)?;
        decode(operation, request, &response.body)
    }

    /// The provider answers with a one-element array.
    pub fn parse_create_observation(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<ObservationSummary, ApiError> {
        let operation = Operation::CreateObservation;
        check_status(operation, request, &response)?;
        let created: Vec<ObservationSummary> = decode(operation, request, &response.body)?;
        let observation = created.into_iter().next().ok_or_else(|| ApiError::Decode {
            operation,
            url: request.url.clone(),
            message: "expected at least one observation in response".to_string(),
        })?;
        debug!(id = observation.id, "created observation");
        Ok(observation)
    }

    /// The body is only checked to be JSON; its shape is not relied upon.
    pub fn parse_update_observation(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        let operation = Operation::UpdateObservation;
        check_status(operation, request, &response)?;
        if !response.body.trim().is_empty() {
            decode::<IgnoredAny>(operation, request, &response.body)?;
        }
        Ok(())
    }

    pub fn parse_delete_observation(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        check_status(Operation::DeleteObservation, request, &response)
    }

    // ---------------------------------------------------------------------
    // Round-trips
    // ---------------------------------------------------------------------

    pub fn list_observations<E: HttpExecutor + ?Sized>(
        &self,
        executor: &E,
        query: Option<&ObservationQuery>,
    ) -> Result<ObservationsPage, ApiError> {
        let request = self.build_list_observations(query)?;
        let response = send(Operation::ListObservations, executor, &request)?;
        self.parse_list_observations(&request, response)
    }

    pub fn list_observations_by_username<E: HttpExecutor + ?Sized>(
        &self,
        executor: &E,
        username: &str,
    ) -> Result<ObservationsPage, ApiError> {
        let request = self.build_list_observations_by_username(username);
        let response = send(Operation::ListObservationsByUsername, executor, &request)?;
        self.parse_list_observations_by_username(&request, response)
    }

    pub fn get_observation<E: HttpExecutor + ?Sized>(
        &self,
        executor: &E,
        id: i64,
    ) -> Result<Observation, ApiError> {
        let request = self.build_get_observation(id);
        let response = send(Operation::GetObservation, executor, &request)?;
        self.parse_get_observation(&request, response)
    }

    pub fn get_observation_summary<E: HttpExecutor + ?Sized>(
        &self,
        executor: &E,
        id: i64,
    ) -> Result<ObservationSummary, ApiError> {
        let request = self.build_get_observation(id);
        let response = send(Operation::GetObservationSummary, executor, &request)?;
        self.parse_get_observation_summary(&request, response)
    }

    pub fn create_observation<E: HttpExecutor + ?Sized>(
        &self,
        executor: &E,
        input: &CreateObservation,
    ) -> Result<ObservationSummary, ApiError> {
        let request = self.build_create_observation(input)?;
        let response = send(Operation::CreateObservation, executor, &request)?;
        self.parse_create_observation(&request, response)
    }

    pub fn update_observation<E: HttpExecutor + ?Sized>(
        &self,
        executor: &E,
        input: &UpdateObservation,
    ) -> Result<(), ApiError> {
        let request = self.build_update_observation(input)?;
        let response = send(Operation::UpdateObservation, executor, &request)?;
        self.parse_update_observation(&request, response)
    }

    pub fn delete_observation<E: HttpExecutor + ?Sized>(
        &self,
        executor: &E,
        id: i64,
    ) -> Result<(), ApiError> {
        let request = self.build_delete_observation(id);
        let response = send(Operation::DeleteObservation, executor, &request)?;
        self.parse_delete_observation(&request, response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url())
    }

    fn request(
        &self,
        method: HttpMethod,
        url: String,
        body: Option<String>,
        expected_status: u16,
    ) -> HttpRequest {
        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), self.config.user_agent().to_string()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.config.access_token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
            expected_status,
        }
    }
}

fn send<E: HttpExecutor + ?Sized>(
    operation: Operation,
    executor: &E,
    request: &HttpRequest,
) -> Result<HttpResponse, ApiError> {
    debug!(%operation, method = %request.method, url = %request.url, "sending request");
    executor
        .execute(request)
        .map_err(|source| ApiError::Transport {
            operation,
            url: request.url.clone(),
            source,
        })
}

fn parse_page(
    operation: Operation,
    request: &HttpRequest,
    response: HttpResponse,
) -> Result<ObservationsPage, ApiError> {
    check_status(operation, request, &response)?;
    let observations: Vec<ObservationSummary> = decode(operation, request, &response.body)?;
    let paging = PageInfo::from_response(&response).map_err(|err| ApiError::Decode {
        operation,
        url: request.url.clone(),
        message: err.to_string(),
    })?;
    debug!(
        count = observations.len(),
        total = ?paging.total_entries,
        page = ?paging.page,
        "decoded observations page"
    );
    Ok(ObservationsPage {
        paging,
        observations,
    })
}

/// Reject any status other than the one the request was built to expect.
fn check_status(
    operation: Operation,
    request: &HttpRequest,
    response: &HttpResponse,
) -> Result<(), ApiError> {
    if response.status == request.expected_status {
        return Ok(());
    }
    warn!(
        %operation,
        url = %request.url,
        expected = request.expected_status,
        status = response.status,
        "unexpected response status"
    );
    Err(ApiError::UnexpectedStatus {
        operation,
        url: request.url.clone(),
        expected: request.expected_status,
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(
    operation: Operation,
    request: &HttpRequest,
    body: &str,
) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        operation,
        url: request.url.clone(),
        message: e.to_string(),
    })
}

fn encode<T: serde::Serialize>(operation: Operation, input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Encode {
        operation,
        message: e.to_string(),
    })
}
