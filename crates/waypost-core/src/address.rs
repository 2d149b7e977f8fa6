//! # Addresses
//!
//! Postal addresses with optional geographic coordinates.
//!
//! On the wire an address carries `latitude` and `longitude` as two
//! independent optional fields. In Rust they collapse into a single
//! `Option<Coordinates>`: coordinates exist only when both halves are
//! present, which is the condition the distance rule needs.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type};
use utoipa::openapi::RefOr;

use crate::error::ValidationError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Degrees north, -90..=90.
    pub latitude: f64,
    /// Degrees east, -180..=180.
    pub longitude: f64,
}

impl Coordinates {
    /// Create validated coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let coordinates = Self {
            latitude,
            longitude,
        };
        coordinates.validate()?;
        Ok(coordinates)
    }

    /// Check both components are finite and in range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// A postal address. `state` may be empty for countries without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Street line, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// City or town.
    pub city: String,
    /// State, province, or region.
    #[serde(default)]
    pub state: String,
    /// Country name.
    pub country: String,
    /// Geographic position. Absent unless both latitude and longitude were given.
    #[serde(flatten)]
    pub coordinates: Option<Coordinates>,
}

impl Address {
    /// Build an address without coordinates.
    pub fn new(
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: None,
            city: city.into(),
            state: state.into(),
            country: country.into(),
            coordinates: None,
        }
    }

    /// Attach coordinates.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Attach a street line.
    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    /// The coordinates, when both halves are known.
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    /// Case-insensitive equality of city, state, and country.
    pub fn same_locality(&self, other: &Address) -> bool {
        fn eq(a: &str, b: &str) -> bool {
            a.trim().to_lowercase() == b.trim().to_lowercase()
        }
        eq(&self.city, &other.city)
            && eq(&self.state, &other.state)
            && eq(&self.country, &other.country)
    }

    /// Validate required fields and coordinate ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::require_text("city", &self.city)?;
        ValidationError::require_text("country", &self.country)?;
        if let Some(coordinates) = &self.coordinates {
            coordinates.validate()?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(street) = &self.street {
            write!(f, "{street}, ")?;
        }
        write!(f, "{}", self.city)?;
        if !self.state.is_empty() {
            write!(f, ", {}", self.state)?;
        }
        write!(f, ", {}", self.country)
    }
}

// The flattened coordinates appear on the wire as two plain fields, so the
// schema is written out by hand.
impl utoipa::PartialSchema for Address {
    fn schema() -> RefOr<Schema> {
        let text = || ObjectBuilder::new().schema_type(Type::String);
        let degrees = |description: &str| {
            ObjectBuilder::new()
                .schema_type(Type::Number)
                .format(Some(SchemaFormat::KnownFormat(KnownFormat::Double)))
                .description(Some(description))
        };
        ObjectBuilder::new()
            .property("street", text())
            .property("city", text())
            .property("state", text())
            .property("country", text())
            .property("latitude", degrees("Degrees north. Ignored without longitude."))
            .property("longitude", degrees("Degrees east. Ignored without latitude."))
            .required("city")
            .required("country")
            .into()
    }
}

impl utoipa::ToSchema for Address {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Address")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locality_match_ignores_case_and_whitespace() {
        let a = Address::new("Accra", "Greater Accra", "Ghana");
        let b = Address::new(" accra", "GREATER ACCRA ", "ghana");
        assert!(a.same_locality(&b));
    }

    #[test]
    fn locality_match_requires_all_three_fields() {
        let a = Address::new("Accra", "", "Ghana");
        let b = Address::new("Accra", "Ashanti", "Ghana");
        assert!(!a.same_locality(&b));
    }

    #[test]
    fn deserializes_without_state_or_coordinates() {
        let addr: Address = serde_json::from_str(r#"{"city":"Accra","country":"Ghana"}"#).unwrap();
        assert_eq!(addr.state, "");
        assert!(addr.coordinates().is_none());
    }

    #[test]
    fn deserializes_flattened_coordinates() {
        let addr: Address = serde_json::from_str(
            r#"{"city":"Accra","country":"Ghana","latitude":5.6,"longitude":-0.19}"#,
        )
        .unwrap();
        let coordinates = addr.coordinates().expect("both halves present");
        assert_eq!(coordinates.latitude, 5.6);
        assert_eq!(coordinates.longitude, -0.19);
    }

    #[test]
    fn half_a_coordinate_is_no_coordinate() {
        let addr: Address =
            serde_json::from_str(r#"{"city":"Accra","country":"Ghana","latitude":5.6}"#).unwrap();
        assert!(addr.coordinates().is_none());
    }

    #[test]
    fn serialization_omits_absent_coordinates() {
        let json = serde_json::to_value(Address::new("Lagos", "Lagos", "Nigeria")).unwrap();
        assert!(json.get("latitude").is_none());
        assert!(json.get("street").is_none());
    }

    #[test]
    fn validate_rejects_blank_city() {
        let addr = Address::new(" ", "", "Ghana");
        assert_eq!(
            addr.validate().unwrap_err(),
            ValidationError::EmptyField { field: "city" }
        );
    }

    #[test]
    fn coordinates_range_checked() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -181.0).is_err());
        assert!(Coordinates::new(5.6, -0.19).is_ok());
    }

    #[test]
    fn display_skips_empty_state() {
        let addr = Address::new("Accra", "", "Ghana").with_street("12 Oxford St");
        assert_eq!(addr.to_string(), "12 Oxford St, Accra, Ghana");
    }

    #[test]
    fn schema_lists_flattened_coordinates() {
        let schema = serde_json::to_value(<Address as utoipa::PartialSchema>::schema()).unwrap();
        let properties = &schema["properties"];
        for field in ["street", "city", "state", "country", "latitude", "longitude"] {
            assert!(properties[field].is_object(), "{field}");
        }
        assert_eq!(schema["required"], serde_json::json!(["city", "country"]));
    }
}
