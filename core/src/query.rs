//! Listing filters and their query-string encoding.

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use url::form_urlencoded;

use crate::types::Rectangle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Optional filters for listing observations. Only fields that are set
/// become query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub rectangle: Option<Rectangle>,
    /// Observations made on this calendar date.
    pub on: Option<NaiveDate>,
    pub updated_since: Option<DateTime<Utc>>,
    /// Field to sort by, e.g. `observed_on`. Descending unless `order` says
    /// otherwise.
    pub order_by: Option<String>,
    pub order: Option<SortOrder>,
    /// Any value restricts results to georeferenced observations; the
    /// provider has no "without location" filter.
    pub has_geo: Option<bool>,
}

impl ObservationQuery {
    /// Encode as `application/x-www-form-urlencoded`, without the leading `?`.
    /// Returns an empty string when nothing is set.
    ///
    /// Bounding-box corners must be finite and within the usual ranges
    /// (longitude ±180, latitude ±90).
    pub fn to_query_string(&self) -> Result<String, InvalidBoundingBox> {
        let mut params = form_urlencoded::Serializer::new(String::new());

        if let Some(page) = self.page {
            params.append_pair("page", &page.to_string());
        }
        if let Some(per_page) = self.per_page {
            params.append_pair("per_page", &per_page.to_string());
        }
        if let Some(rectangle) = &self.rectangle {
            let corners = [
                ("swlng", rectangle.southwest.longitude, LONGITUDE_LIMIT),
                ("swlat", rectangle.southwest.latitude, LATITUDE_LIMIT),
                ("nelng", rectangle.northeast.longitude, LONGITUDE_LIMIT),
                ("nelat", rectangle.northeast.latitude, LATITUDE_LIMIT),
            ];
            for (name, value, limit) in corners {
                if !(-limit..=limit).contains(&value) {
                    return Err(InvalidBoundingBox { name, value });
                }
                params.append_pair(name, &value.to_string());
            }
        }
        if let Some(order_by) = &self.order_by {
            params.append_pair("order_by", order_by);
        }
        let order = match (&self.order_by, self.order) {
            (_, Some(order)) => Some(order),
            (Some(_), None) => Some(SortOrder::Descending),
            (None, None) => None,
        };
        if let Some(order) = order {
            params.append_pair("order", order.as_str());
        }
        if let Some(updated_since) = &self.updated_since {
            params.append_pair(
                "updated_since",
                &updated_since.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        if self.has_geo.is_some() {
            params.append_pair("has[]", "geo");
        }
        if let Some(on) = &self.on {
            params.append_pair("on", &on.format("%Y-%m-%d").to_string());
        }

        Ok(params.finish())
    }
}

const LONGITUDE_LIMIT: f64 = 180.0;
const LATITUDE_LIMIT: f64 = 90.0;

/// A bounding-box corner that cannot be sent: NaN, infinite, or off the globe.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidBoundingBox {
    pub name: &'static str,
    pub value: f64,
}

impl fmt::Display for InvalidBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid bounding box {}: {}", self.name, self.value)
    }
}

impl std::error::Error for InvalidBoundingBox {}
