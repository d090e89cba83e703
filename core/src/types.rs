//! Domain DTOs for the observations API.
//!
//! # Design
//! Every field the provider may send as `null`, or leave out, is an `Option`,
//! so "not reported" never collapses into zero. Request payloads follow the
//! same rule in the other direction: an unset field is omitted from the JSON
//! body, while a field set to an empty or zero value is sent as-is.
//!
//! These types are defined independently from the mock-server crate; the
//! integration tests catch schema drift between the two.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec;
use crate::error::ObservedOnError;
use crate::observed_on::parse_observed_on;
use crate::paging::PageInfo;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// A bounding box used to filter listings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub southwest: Location,
    pub northeast: Location,
}

impl Rectangle {
    pub fn new(southwest: Location, northeast: Location) -> Self {
        Self {
            southwest,
            northeast,
        }
    }
}

/// How precisely the provider publishes an observation's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoPrivacy {
    Open,
    Obscured,
    Private,
}

/// The flat view of an observation returned by listings and by create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSummary {
    pub id: i64,
    pub uuid: Option<Uuid>,
    pub uri: Option<String>,
    pub user_id: Option<i64>,
    pub user_login: Option<String>,
    pub species_guess: Option<String>,
    pub description: Option<String>,
    pub place_guess: Option<String>,
    #[serde(default, with = "codec::latitude")]
    pub latitude: Option<f64>,
    #[serde(default, with = "codec::longitude")]
    pub longitude: Option<f64>,
    #[serde(rename = "created_at_utc")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updated_at_utc")]
    pub updated_at: Option<DateTime<Utc>>,
    pub observed_on: Option<NaiveDate>,
    pub observed_on_string: Option<String>,
    #[serde(rename = "time_observed_at_utc")]
    pub time_observed_at: Option<DateTime<Utc>>,
    pub time_zone: Option<String>,
    pub taxon_id: Option<i64>,
    pub site_id: Option<i64>,
    /// Meters.
    pub positional_accuracy: Option<i32>,
    /// Meters, after geoprivacy obscuring.
    pub public_positional_accuracy: Option<i32>,
}

impl ObservationSummary {
    /// Both coordinates, when the observation has a location.
    pub fn location(&self) -> Option<Location> {
        Some(Location::new(self.longitude?, self.latitude?))
    }

    /// Interpret the free-text `observed_on_string`.
    pub fn try_parse_observed_on(&self) -> Result<DateTime<FixedOffset>, ObservedOnError> {
        parse_observed_on(self.observed_on_string.as_deref().unwrap_or_default())
    }
}

/// A page of observation summaries plus the provider's paging headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationsPage {
    pub paging: PageInfo,
    pub observations: Vec<ObservationSummary>,
}

/// The detailed view of a single observation with its nested records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: i64,
    pub uuid: Option<Uuid>,
    pub uri: Option<String>,
    pub user_id: Option<i64>,
    pub user_login: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub observed_on: Option<NaiveDate>,
    #[serde(rename = "time_observed_at_utc")]
    pub time_observed_at: Option<DateTime<Utc>>,
    #[serde(default, with = "codec::latitude")]
    pub latitude: Option<f64>,
    #[serde(default, with = "codec::longitude")]
    pub longitude: Option<f64>,
    pub observed_on_string: Option<String>,
    #[serde(default, deserialize_with = "codec::null_as_empty")]
    pub observation_photos: Vec<ObservationPhoto>,
    #[serde(default, deserialize_with = "codec::null_as_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "codec::null_as_empty")]
    pub project_observations: Vec<ProjectObservation>,
}

impl Observation {
    pub fn location(&self) -> Option<Location> {
        Some(Location::new(self.longitude?, self.latitude?))
    }

    pub fn try_parse_observed_on(&self) -> Result<DateTime<FixedOffset>, ObservedOnError> {
        parse_observed_on(self.observed_on_string.as_deref().unwrap_or_default())
    }
}

/// Link between an observation and one of its photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationPhoto {
    pub id: i64,
    pub photo_id: i64,
    pub observation_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub photo: Photo,
}

/// A photo with its rendered sizes, largest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub large_url: Option<String>,
    pub medium_url: Option<String>,
    pub small_url: Option<String>,
    pub square_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// The comment this one replies to.
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub user: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
}

/// Membership of an observation in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectObservation {
    pub id: i64,
    pub observation_id: i64,
    pub project_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub tracking_code: Option<String>,
    pub curator_identification_id: Option<i64>,
}

/// Request payload for creating an observation. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateObservation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_guess: Option<String>,
    /// Sent as a full timestamp although the provider stores a date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_on_string: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "codec::latitude::serialize_number"
    )]
    pub latitude: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "codec::longitude::serialize_number"
    )]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positional_accuracy: Option<i32>,
    #[serde(rename = "tag_list", skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geoprivacy: Option<GeoPrivacy>,
}

/// Request payload for updating an observation. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateObservation {
    /// Selects the resource path; never part of the body.
    #[serde(skip)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_guess: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_on_string: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "codec::latitude::serialize_number"
    )]
    pub latitude: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "codec::longitude::serialize_number"
    )]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positional_accuracy: Option<i32>,
    #[serde(rename = "tag_list", skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geoprivacy: Option<GeoPrivacy>,
}

impl UpdateObservation {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
