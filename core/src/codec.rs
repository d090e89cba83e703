//! serde helpers for the provider's irregular JSON.
//!
//! Coordinates on observation records arrive as strings (`"37.5"`), or as
//! `null` when the observation has no location. Generic `f64` decoding would
//! reject the quoted form, so those fields go through `latitude` and
//! `longitude` below. Outgoing payloads send plain JSON numbers through
//! `serialize_number`, which refuses NaN, infinities and off-globe values
//! rather than letting serde_json write them as `null`.

use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::ser::Error as _;
use serde::{Deserialize, Serializer};

#[derive(Clone, Copy)]
struct Axis {
    name: &'static str,
    limit: f64,
}

impl Axis {
    /// False for NaN and infinities.
    fn contains(&self, value: f64) -> bool {
        (-self.limit..=self.limit).contains(&value)
    }
}

const LATITUDE: Axis = Axis {
    name: "latitude",
    limit: 90.0,
};

const LONGITUDE: Axis = Axis {
    name: "longitude",
    limit: 180.0,
};

struct CoordinateVisitor(Axis);

impl CoordinateVisitor {
    fn check<E: de::Error>(&self, value: f64) -> Result<Option<f64>, E> {
        if self.0.contains(value) {
            Ok(Some(value))
        } else {
            Err(E::invalid_value(Unexpected::Float(value), self))
        }
    }
}

impl<'de> Visitor<'de> for CoordinateVisitor {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a {} between -{limit} and {limit} as a numeric string",
            self.0.name,
            limit = self.0.limit
        )
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let parsed: f64 = trimmed
            .parse()
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))?;
        self.check(parsed)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        self.check(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        self.check(value as f64)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        self.check(value as f64)
    }
}

fn serialize_coordinate<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_str(&value.to_string()),
        None => serializer.serialize_none(),
    }
}

fn serialize_number<S: Serializer>(
    axis: Axis,
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) if axis.contains(*value) => serializer.serialize_f64(*value),
        Some(value) => Err(S::Error::custom(format_args!(
            "{} must be between -{limit} and {limit}, got {value}",
            axis.name,
            limit = axis.limit
        ))),
        None => serializer.serialize_none(),
    }
}

pub(crate) mod latitude {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize_coordinate(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        deserializer.deserialize_option(super::CoordinateVisitor(super::LATITUDE))
    }

    pub fn serialize_number<S: Serializer>(
        value: &Option<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        super::serialize_number(super::LATITUDE, value, serializer)
    }
}

pub(crate) mod longitude {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize_coordinate(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        deserializer.deserialize_option(super::CoordinateVisitor(super::LONGITUDE))
    }

    pub fn serialize_number<S: Serializer>(
        value: &Option<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        super::serialize_number(super::LONGITUDE, value, serializer)
    }
}

/// Read a JSON array, treating `null` as empty.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
