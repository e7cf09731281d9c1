//! Parameter extraction helpers for handlers.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::handler::MethodError;

/// Opaque request parameters.
///
/// The dispatcher never validates the shape; each handler pulls out what it
/// needs and reports [`MethodError::InvalidParams`] otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Params(Value);

impl Default for Params {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl Params {
    /// Wraps a raw parameter value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw parameter value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Looks up a named field when the parameters are an object.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.as_object().and_then(|fields| fields.get(name))
    }

    /// Reads a required integer field.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::InvalidParams`] when the field is absent or not
    /// an integer.
    pub fn required_i64(&self, name: &str) -> Result<i64, MethodError> {
        self.optional_i64(name)?
            .ok_or_else(|| missing_or_invalid(name))
    }

    /// Reads an optional integer field; `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::InvalidParams`] when the field is present but not
    /// an integer.
    pub fn optional_i64(&self, name: &str) -> Result<Option<i64>, MethodError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| missing_or_invalid(name)),
        }
    }

    /// Reads an optional string field; `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::InvalidParams`] when the field is present but not
    /// a string.
    pub fn optional_str(&self, name: &str) -> Result<Option<&str>, MethodError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| missing_or_invalid(name)),
        }
    }

    /// Deserializes the whole parameter value into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::InvalidParams`] carrying the `serde_json` message
    /// when the value does not match `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, MethodError> {
        T::deserialize(&self.0)
            .map_err(|error| MethodError::invalid_params(format!("invalid params: {error}")))
    }
}

fn missing_or_invalid(name: &str) -> MethodError {
    MethodError::invalid_params(format!("Missing or invalid '{name}' parameter."))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_required_integer() {
        let params = Params::new(json!({ "planetId": 103 }));
        assert_eq!(params.required_i64("planetId").expect("present"), 103);
    }

    #[rstest]
    #[case::absent(json!({}))]
    #[case::null(json!({ "planetId": null }))]
    #[case::string(json!({ "planetId": "103" }))]
    #[case::fraction(json!({ "planetId": 1.5 }))]
    #[case::not_an_object(json!([103]))]
    fn rejects_missing_or_malformed_integer(#[case] raw: Value) {
        let error = Params::new(raw)
            .required_i64("planetId")
            .expect_err("must be rejected");
        assert_eq!(
            error.to_string(),
            "Missing or invalid 'planetId' parameter."
        );
    }

    #[test]
    fn optional_fields_tolerate_absence() {
        let params = Params::default();
        assert_eq!(params.optional_i64("limit").expect("absent"), None);
        assert_eq!(params.optional_str("filter").expect("absent"), None);
    }

    #[test]
    fn optional_string_rejects_wrong_type() {
        let params = Params::new(json!({ "filter": 5 }));
        assert!(matches!(
            params.optional_str("filter"),
            Err(MethodError::InvalidParams(_))
        ));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct StarQuery {
        star_id: i64,
        #[serde(default)]
        include_planets: bool,
    }

    #[test]
    fn parses_typed_params() {
        let params = Params::new(json!({ "starId": 4 }));
        let query: StarQuery = params.parse().expect("parse");
        assert_eq!(
            query,
            StarQuery {
                star_id: 4,
                include_planets: false
            }
        );
    }

    #[test]
    fn typed_parse_failure_is_invalid_params() {
        let params = Params::new(json!({ "starId": "four" }));
        let result: Result<StarQuery, _> = params.parse();
        assert!(matches!(result, Err(MethodError::InvalidParams(_))));
    }
}
