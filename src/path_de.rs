use serde::de::DeserializeOwned;
use thiserror::Error;

/// A deserialization failure together with the JSON path it happened at.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl PathError {
    fn from_track<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> Self {
        let path = err.path().to_string();
        Self { path, message: err.into_inner().to_string() }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize(de).map_err(PathError::from_track)
}

/// Same as [`from_str_with_path`], for an already parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, PathError> {
    serde_path_to_error::deserialize(value).map_err(PathError::from_track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reports_nested_path() {
        let err = from_str_with_path::<HashMap<String, f64>>(r#"{"a": 1, "b": "x"}"#).unwrap_err();
        assert_eq!(err.path, "b");
        let err = from_value_with_path::<Vec<HashMap<String, f64>>>(serde_json::json!([{}, {"c": true}]))
            .unwrap_err();
        assert_eq!(err.path, "[1].c");
        assert!(err.to_string().starts_with("at JSON path [1].c → "));
    }
}
