//! In-memory stand-in for the provider's observation endpoints.
//!
//! Reproduces the wire details clients depend on: string-encoded
//! coordinates, paging headers on listings, one-element arrays from create
//! and update, and 201 as the success code for every write.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: usize = 30;
pub const MAX_PER_PAGE: usize = 200;
pub const MOCK_USER_ID: i64 = 1;
pub const MOCK_USER_LOGIN: &str = "mock-user";

/// An observation as stored and served. Serializes to a superset of the
/// provider's summary and detailed views.
#[derive(Clone, Debug, Serialize)]
pub struct Observation {
    pub id: i64,
    pub uuid: Uuid,
    pub uri: String,
    pub user_id: i64,
    pub user_login: String,
    pub species_guess: Option<String>,
    pub description: Option<String>,
    pub place_guess: Option<String>,
    #[serde(serialize_with = "coordinate_as_string")]
    pub latitude: Option<f64>,
    #[serde(serialize_with = "coordinate_as_string")]
    pub longitude: Option<f64>,
    pub positional_accuracy: Option<i32>,
    pub public_positional_accuracy: Option<i32>,
    pub geoprivacy: Option<String>,
    pub tag_list: Option<String>,
    pub observed_on: Option<NaiveDate>,
    pub observed_on_string: Option<String>,
    pub time_observed_at_utc: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub observation_photos: Vec<serde_json::Value>,
    pub comments: Vec<serde_json::Value>,
    pub project_observations: Vec<serde_json::Value>,
}

/// Body accepted by create and update.
#[derive(Debug, Default, Deserialize)]
pub struct ObservationInput {
    pub species_guess: Option<String>,
    pub observed_on_string: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub positional_accuracy: Option<i32>,
    pub tag_list: Option<String>,
    pub geoprivacy: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    observations: BTreeMap<i64, Observation>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route(
            "/observations.json",
            get(list_observations).post(create_observation),
        )
        .route(
            "/observations/{resource}",
            get(get_resource)
                .put(update_observation)
                .delete(delete_observation),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn coordinate_as_string<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_str(&value.to_string()),
        None => serializer.serialize_none(),
    }
}

/// `1418.json` -> `1418`; anything without the suffix is not a resource.
fn strip_json(resource: &str) -> Result<&str, StatusCode> {
    resource.strip_suffix(".json").ok_or(StatusCode::NOT_FOUND)
}

fn require_token(headers: &HeaderMap) -> Result<(), StatusCode> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer ") && value.len() > "Bearer ".len());
    if authorized {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, StatusCode> {
    params
        .get(name)
        .map(|value| value.parse().map_err(|_| StatusCode::BAD_REQUEST))
        .transpose()
}

fn within(value: Option<f64>, low: f64, high: f64) -> bool {
    value.is_some_and(|v| low <= v && v <= high)
}

/// Filter, sort and slice `observations` according to the listing parameters.
fn page_response(
    mut observations: Vec<Observation>,
    params: &HashMap<String, String>,
) -> Result<Response, StatusCode> {
    if params.get("has[]").map(String::as_str) == Some("geo") {
        observations.retain(|o| o.latitude.is_some() && o.longitude.is_some());
    }

    let bounds = (
        param::<f64>(params, "swlng")?,
        param::<f64>(params, "swlat")?,
        param::<f64>(params, "nelng")?,
        param::<f64>(params, "nelat")?,
    );
    if let (Some(swlng), Some(swlat), Some(nelng), Some(nelat)) = bounds {
        observations
            .retain(|o| within(o.longitude, swlng, nelng) && within(o.latitude, swlat, nelat));
    }

    if let Some(on) = params.get("on") {
        let on = NaiveDate::parse_from_str(on, "%Y-%m-%d").map_err(|_| StatusCode::BAD_REQUEST)?;
        observations.retain(|o| o.observed_on == Some(on));
    }

    if let Some(since) = params.get("updated_since") {
        let since = DateTime::parse_from_rfc3339(since)
            .map_err(|_| StatusCode::BAD_REQUEST)?
            .with_timezone(&Utc);
        observations.retain(|o| o.updated_at >= since);
    }

    match params.get("order_by").map(String::as_str) {
        Some("observed_on") => observations.sort_by_key(|o| (o.observed_on, o.id)),
        Some("created_at") => observations.sort_by_key(|o| (o.created_at, o.id)),
        _ => observations.sort_by_key(|o| o.id),
    }
    if params.get("order").map(String::as_str) != Some("asc") {
        observations.reverse();
    }

    let page = param::<usize>(params, "page")?.unwrap_or(1).max(1);
    let per_page = param::<usize>(params, "per_page")?
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let total = observations.len();
    let slice: Vec<Observation> = observations
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    let headers = [
        ("X-Total-Entries", total.to_string()),
        ("X-Page", page.to_string()),
        ("X-Per-Page", per_page.to_string()),
    ];
    Ok((StatusCode::OK, headers, Json(slice)).into_response())
}

async fn list_observations(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, StatusCode> {
    let observations: Vec<Observation> = db.read().await.observations.values().cloned().collect();
    page_response(observations, &params)
}

/// `/observations/{id}.json` is a single record; `/observations/{login}.json`
/// lists that user's observations.
async fn get_resource(
    State(db): State<Db>,
    Path(resource): Path<String>,
) -> Result<Response, StatusCode> {
    let key = strip_json(&resource)?;
    let store = db.read().await;
    if let Ok(id) = key.parse::<i64>() {
        let observation = store.observations.get(&id).ok_or(StatusCode::NOT_FOUND)?;
        return Ok(Json(observation.clone()).into_response());
    }
    let observations: Vec<Observation> = store
        .observations
        .values()
        .filter(|o| o.user_login == key)
        .cloned()
        .collect();
    page_response(observations, &HashMap::new())
}

async fn create_observation(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ObservationInput>,
) -> Result<(StatusCode, Json<Vec<Observation>>), StatusCode> {
    require_token(&headers)?;
    let mut store = db.write().await;
    store.next_id += 1;
    let id = store.next_id;
    let now = Utc::now();
    let mut observation = Observation {
        id,
        uuid: Uuid::new_v4(),
        uri: format!("http://mock.invalid/observations/{id}"),
        user_id: MOCK_USER_ID,
        user_login: MOCK_USER_LOGIN.to_string(),
        species_guess: None,
        description: None,
        place_guess: None,
        latitude: None,
        longitude: None,
        positional_accuracy: None,
        public_positional_accuracy: None,
        geoprivacy: None,
        tag_list: None,
        observed_on: None,
        observed_on_string: None,
        time_observed_at_utc: None,
        created_at: now,
        created_at_utc: now,
        updated_at: now,
        updated_at_utc: now,
        observation_photos: Vec::new(),
        comments: Vec::new(),
        project_observations: Vec::new(),
    };
    apply(&mut observation, input);
    store.observations.insert(id, observation.clone());
    info!(id, "created observation");
    Ok((StatusCode::CREATED, Json(vec![observation])))
}

async fn update_observation(
    State(db): State<Db>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Json(input): Json<ObservationInput>,
) -> Result<(StatusCode, Json<Vec<Observation>>), StatusCode> {
    require_token(&headers)?;
    let id: i64 = strip_json(&resource)?
        .parse()
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let mut store = db.write().await;
    let observation = store.observations.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    apply(observation, input);
    let now = Utc::now();
    observation.updated_at = now;
    observation.updated_at_utc = now;
    debug!(id, "updated observation");
    Ok((StatusCode::CREATED, Json(vec![observation.clone()])))
}

async fn delete_observation(
    State(db): State<Db>,
    Path(resource): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    require_token(&headers)?;
    let id: i64 = strip_json(&resource)?
        .parse()
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let mut store = db.write().await;
    store
        .observations
        .remove(&id)
        .map(|_| {
            info!(id, "deleted observation");
            StatusCode::CREATED
        })
        .ok_or(StatusCode::NOT_FOUND)
}

/// Copy every field present in `input` onto `observation`.
fn apply(observation: &mut Observation, input: ObservationInput) {
    if let Some(species_guess) = input.species_guess {
        observation.species_guess = Some(species_guess);
    }
    if let Some(observed) = input.observed_on_string {
        observation.observed_on = Some(observed.date_naive());
        observation.observed_on_string = Some(observed.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        observation.time_observed_at_utc = Some(observed);
    }
    if let Some(description) = input.description {
        observation.description = Some(description);
    }
    if let Some(latitude) = input.latitude {
        observation.latitude = Some(latitude);
    }
    if let Some(longitude) = input.longitude {
        observation.longitude = Some(longitude);
    }
    if let Some(accuracy) = input.positional_accuracy {
        observation.positional_accuracy = Some(accuracy);
    }
    if let Some(tag_list) = input.tag_list {
        observation.tag_list = Some(tag_list);
    }
    if let Some(geoprivacy) = input.geoprivacy {
        observation.geoprivacy = Some(geoprivacy);
    }
    observation.public_positional_accuracy = match observation.geoprivacy.as_deref() {
        Some("obscured") | Some("private") => None,
        _ => observation.positional_accuracy,
    };
}
