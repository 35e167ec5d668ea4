//! Content model - a rated media record.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A content rating in [0, 10].
///
/// Every finite value in range is accepted and kept exactly as given.
/// Values outside the range and non-finite values are rejected, never
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Rating(f64);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: Rating = Rating(0.0);

    /// Highest accepted rating.
    pub const MAX: Rating = Rating(10.0);

    /// Validate and build a rating.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::InvalidRating(format!(
                "rating {} is not a finite number",
                value
            )));
        }
        if !(Self::MIN.0..=Self::MAX.0).contains(&value) {
            return Err(Error::InvalidRating(format!(
                "rating {} must be between 0 and 10",
                value
            )));
        }
        // -0.0 passes the range check; store it as 0
        Ok(Rating(value + 0.0))
    }

    /// The rating as a float.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Rating::new(value).map_err(serde::de::Error::custom)
    }
}

/// A rated media record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Store-assigned identifier
    pub id: u64,

    /// Title, fixed at creation
    pub title: String,

    /// Arbitrary key-value document (description, authors, genre, ...)
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,

    /// Rating, if one has been given
    pub rating: Option<Rating>,
}

fn empty_metadata() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Content {
    /// Create a new content record.
    pub fn new(id: u64, title: String, metadata: serde_json::Value, rating: Option<Rating>) -> Self {
        Self {
            id,
            title,
            metadata,
            rating,
        }
    }
}

/// Check that metadata is a key-value document.
pub(crate) fn check_metadata(metadata: &serde_json::Value) -> Result<()> {
    if metadata.is_object() {
        Ok(())
    } else {
        Err(Error::InvalidInput(
            "content metadata must be a JSON object".to_string(),
        ))
    }
}

/// Fields that may change on an existing content.
///
/// `rating` distinguishes "leave as is" (`None`) from "unset" (`Some(None)`).
/// Raw values are carried so that the write path validates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub rating: Option<Option<f64>>,
}

fn double_option<'de, D>(deserializer: D) -> std::result::Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

impl ContentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Replace metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Builder: Set or unset the rating.
    pub fn with_rating(mut self, rating: Option<f64>) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_none() && self.rating.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert_eq!(Rating::new(0.0).unwrap(), Rating::MIN);
        assert_eq!(Rating::new(10.0).unwrap(), Rating::MAX);
        assert!(Rating::new(-0.01).is_err());
        assert!(Rating::new(10.01).is_err());
        assert!(Rating::new(-1.0).is_err());
        assert!(Rating::new(11.0).is_err());
    }

    #[test]
    fn rating_rejects_non_finite() {
        assert!(matches!(
            Rating::new(f64::NAN),
            Err(Error::InvalidRating(_))
        ));
        assert!(Rating::new(f64::INFINITY).is_err());
    }

    #[test]
    fn rating_keeps_full_precision() {
        assert_eq!(Rating::new(8.555).unwrap().value(), 8.555);
        assert_eq!(Rating::new(0.001).unwrap().value(), 0.001);
        assert_eq!(Rating::new(9.9999999999).unwrap().value(), 9.9999999999);
        assert_eq!(Rating::new(0.000000001).unwrap().value(), 0.000000001);
    }

    #[test]
    fn rating_display() {
        assert_eq!(Rating::new(8.5).unwrap().to_string(), "8.5");
        assert_eq!(Rating::new(8.555).unwrap().to_string(), "8.555");
        assert_eq!(Rating::MAX.to_string(), "10");
    }

    #[test]
    fn rating_deserialize_validates() {
        let ok: Rating = serde_json::from_str("7.5").unwrap();
        assert_eq!(ok.value(), 7.5);
        let precise: Rating = serde_json::from_str("8.555").unwrap();
        assert_eq!(serde_json::to_string(&precise).unwrap(), "8.555");
        assert!(serde_json::from_str::<Rating>("12").is_err());
    }

    #[test]
    fn content_serialization() {
        let content = Content::new(
            1,
            "Content 1".to_string(),
            serde_json::json!({"description": "Content 1 description", "genre": "Comedy"}),
            Some(Rating::new(8.5).unwrap()),
        );

        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["rating"], serde_json::json!(8.5));

        let parsed: Content = serde_json::from_value(json).unwrap();
        assert_eq!(content, parsed);
    }

    #[test]
    fn update_distinguishes_unset_from_absent() {
        let absent: ContentUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.rating, None);
        assert!(absent.is_empty());

        let unset: ContentUpdate = serde_json::from_str(r#"{"rating": null}"#).unwrap();
        assert_eq!(unset.rating, Some(None));

        let set: ContentUpdate = serde_json::from_str(r#"{"rating": 9.0}"#).unwrap();
        assert_eq!(set.rating, Some(Some(9.0)));
    }

    #[test]
    fn metadata_must_be_object() {
        assert!(check_metadata(&serde_json::json!({"k": "v"})).is_ok());
        assert!(check_metadata(&serde_json::json!([1, 2])).is_err());
    }
}
