use crate::utils::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

/// Runs a declarative schema over an input DTO and surfaces the first
/// failing field as a `Validation` error, before any side effect happens.
pub fn run_validation<T: Validate>(input: &T) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .next()
            .unwrap_or_else(|| "invalid input".to_string());
        AppError::Validation(message)
    })
}

/// Deserializes a sanitized JSON value into a typed request. Missing or
/// mistyped fields fail here, so nothing malformed reaches a service.
pub fn parse_sanitized<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| AppError::Validation(e.to_string()))
}

/// Parses a path identity. An id that cannot be parsed cannot resolve, so
/// it fails the same way as an absent document.
pub fn parse_entity_id(id: &str, entity: &str) -> Result<mongodb::bson::oid::ObjectId, AppError> {
    mongodb::bson::oid::ObjectId::parse_str(id)
        .map_err(|_| AppError::NotFound(format!("{} not found", entity)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 2, max = 30, message = "name must be 2-30 characters"))]
        name: String,
        #[validate(email(message = "email must be a valid email address"))]
        email: String,
    }

    #[test]
    fn test_first_error_surfaced() {
        let sample = Sample {
            name: "x".to_string(),
            email: "user@example.com".to_string(),
        };
        let err = run_validation(&sample).unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "name must be 2-30 characters"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        let sample = Sample {
            name: "Ann".to_string(),
            email: "a@b.com".to_string(),
        };
        assert!(run_validation(&sample).is_ok());
    }

    #[test]
    fn test_parse_sanitized_missing_field() {
        let result: Result<Sample, _> = parse_sanitized(json!({"name": "Ann"}));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_entity_id_rejects_garbage() {
        assert!(parse_entity_id("64f07e5a1c9d440000a1b2c3", "User").is_ok());
        let err = parse_entity_id("not-an-id", "User").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_parse_sanitized_wrong_type() {
        let result: Result<Sample, _> =
            parse_sanitized(json!({"name": "Ann", "email": 42}));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
