//! Field types with stricter parsing than plain strings.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// A version identifier such as `"1.10"` or `"23"`.
///
/// Only accepted as a JSON string. A numeric literal is rejected instead of
/// being stringified, because `1.10` has already become `1.1` by the time it
/// is a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionString(String);

impl VersionString {
    /// Wrap a version string.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionString {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

fn numeric_version<E: de::Error>(literal: impl fmt::Display) -> E {
    E::custom(format!(
        "version must be provided as a string, e.g. \"{literal}\" not {literal}"
    ))
}

struct VersionVisitor;

impl<'de> Visitor<'de> for VersionVisitor {
    type Value = VersionString;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a version string such as \"1.0.0\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(VersionString::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(VersionString(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Err(numeric_version(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Err(numeric_version(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Err(numeric_version(v))
    }
}

impl<'de> Deserialize<'de> for VersionString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VersionVisitor)
    }
}

impl JsonSchema for VersionString {
    fn is_referenceable() -> bool {
        false
    }

    fn schema_name() -> String {
        "VersionString".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = String::json_schema(gen).into_object();
        schema.metadata().examples = vec![serde_json::json!("1.0.0")];
        schema.into()
    }
}

/// Shape of an accepted date: `YYYY-MM-DD`, optionally followed by `T` or a
/// space, `HH:MM[:SS[.fff]]` and an optional `Z` or `±HH:MM` offset.
///
/// Advertised as the schema pattern and enforced by [`DateParam::parse`].
const DATE_PATTERN: &str = concat!(
    r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])",
    r"([T ]([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9](\.[0-9]+)?)?",
    r"(Z|[+-]([01][0-9]|2[0-3]):[0-5][0-9])?)?$",
);

fn date_shape() -> Option<&'static Regex> {
    static SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(DATE_PATTERN).ok()).as_ref()
}

/// A date given either as `YYYY-MM-DD` or as an ISO 8601 timestamp with
/// minute, second or fractional precision and an optional offset.
///
/// The original text is forwarded upstream unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateParam(String);

impl DateParam {
    /// Parse and validate a date string.
    ///
    /// The text must match the advertised pattern and name a real calendar
    /// day.
    ///
    /// # Errors
    ///
    /// Returns a message describing the accepted formats.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let valid = date_shape().is_some_and(|shape| shape.is_match(raw))
            && NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d").is_ok();

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(format!(
                "invalid date '{raw}': expected YYYY-MM-DD or an ISO 8601 timestamp"
            ))
        }
    }

    /// The date as originally given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DateParam {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

impl JsonSchema for DateParam {
    fn is_referenceable() -> bool {
        false
    }

    fn schema_name() -> String {
        "DateParam".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = String::json_schema(gen).into_object();
        schema.string().pattern = Some(DATE_PATTERN.to_string());
        schema.metadata().examples = vec![
            serde_json::json!("2024-04-15"),
            serde_json::json!("2024-04-15T00:00:00Z"),
        ];
        schema.into()
    }
}

/// Release date column used by `search_releases` range filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// Date the release shipped.
    #[default]
    ReleaseDate,
    /// End of active support.
    ActiveSupportEndDate,
    /// End of security support.
    SecuritySupportEndDate,
    /// End of life.
    EolDate,
}
