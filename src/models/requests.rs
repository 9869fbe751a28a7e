use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::Validate;

/// Request to switch the active model
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewModelRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(
        required(message = "model_id is required"),
        length(min = 1, message = "model_id is required")
    )]
    pub model_id: Option<String>,
}

/// Accept ids sent as JSON strings or integers; dashboards send both
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id.trim().to_string())),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        Some(_) => Err(serde::de::Error::custom("model_id must be a string or an integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<NewModelRequest, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_missing_model_id_fails_validation() {
        let req = parse(json!({})).unwrap();
        assert!(req.model_id.is_none());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_null_and_empty_fail_validation() {
        assert!(parse(json!({"model_id": null})).unwrap().validate().is_err());
        assert!(parse(json!({"model_id": ""})).unwrap().validate().is_err());
        assert!(parse(json!({"model_id": "   "})).unwrap().validate().is_err());
    }

    #[test]
    fn test_string_and_integer_ids() {
        let req = parse(json!({"model_id": "v2"})).unwrap();
        assert_eq!(req.model_id.as_deref(), Some("v2"));
        assert!(req.validate().is_ok());

        let req = parse(json!({"model_id": 7})).unwrap();
        assert_eq!(req.model_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_other_types_are_rejected() {
        assert!(parse(json!({"model_id": [1]})).is_err());
        assert!(parse(json!({"model_id": 1.5})).is_err());
    }
}
