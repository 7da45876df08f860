//! The subset of the rosbridge v2 protocol used here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GET_PARAM_SERVICE: &str = "/rosapi/get_param";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Advertise {
        topic: String,
        #[serde(rename = "type")]
        message_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    Publish {
        topic: String,
        msg: Value,
    },
    CallService {
        id: String,
        service: String,
        args: Value,
    },
    ServiceResponse {
        #[serde(default)]
        id: Option<String>,
        service: String,
        #[serde(default)]
        values: Value,
        result: bool,
    },
    #[serde(other)]
    Unknown,
}

/// Extracts the parameter value from a `/rosapi/get_param` response.
///
/// rosapi sends the value JSON encoded, so a string parameter arrives quoted.
pub fn decode_param_value(name: &str, values: &Value) -> Result<String, jsp::Error> {
    let invalid = |reason: &str| jsp::Error::Connection {
        message: format!("Invalid value for parameter={name}: {reason}"),
    };
    let encoded = values
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing value"))?;
    match serde_json::from_str::<Value>(encoded) {
        Ok(Value::String(value)) => Ok(value),
        Ok(other) => Err(invalid(&format!("not a string: {other}"))),
        Err(e) => Err(invalid(&e.to_string())),
    }
}
