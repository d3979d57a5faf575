//! The built-in tool set advertised to the model.

use serde_json::{json, Value};

use super::{Tool, ToolError};

fn require_i64(tool: &'static str, args: &Value, key: &str) -> Result<i64, ToolError> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: format!("'{key}' must be an integer"),
        })
}

fn require_str<'a>(
    tool: &'static str,
    args: &'a Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: format!("'{key}' must be a string"),
        })
}

/// Adds two integers.
pub struct Add;

impl Tool for Add {
    fn name(&self) -> &'static str {
        "add"
    }

    fn description(&self) -> &'static str {
        "Adds a and b."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer" },
                "b": { "type": "integer" }
            },
            "required": ["a", "b"]
        })
    }

    fn invoke(&self, args: &Value) -> Result<Value, ToolError> {
        let a = require_i64(self.name(), args, "a")?;
        let b = require_i64(self.name(), args, "b")?;
        Ok(Value::from(a.wrapping_add(b)))
    }
}

/// Multiplies two integers.
pub struct Multiply;

impl Tool for Multiply {
    fn name(&self) -> &'static str {
        "multiply"
    }

    fn description(&self) -> &'static str {
        "Multiplies a and b."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer" },
                "b": { "type": "integer" }
            },
            "required": ["a", "b"]
        })
    }

    fn invoke(&self, args: &Value) -> Result<Value, ToolError> {
        let a = require_i64(self.name(), args, "a")?;
        let b = require_i64(self.name(), args, "b")?;
        Ok(Value::from(a.wrapping_mul(b)))
    }
}

/// Reports the current weather for a location.
pub struct CurrentWeather;

impl Tool for CurrentWeather {
    fn name(&self) -> &'static str {
        "get_current_weather"
    }

    fn description(&self) -> &'static str {
        "Get the current weather in a given location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city and state, e.g. San Francisco, CA"
                },
                "unit": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"]
                }
            },
            "required": ["location", "unit"]
        })
    }

    fn invoke(&self, args: &Value) -> Result<Value, ToolError> {
        let location = require_str(self.name(), args, "location")?;
        let unit = args
            .get("unit")
            .and_then(Value::as_str)
            .unwrap_or("fahrenheit");
        let temperature = if unit == "celsius" {
            fastrand::i32(-34..=43)
        } else {
            fastrand::i32(-30..=110)
        };
        Ok(json!({
            "temperature": temperature,
            "unit": unit,
            "location": location,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        let result = Add.invoke(&json!({"a": 1, "b": 2})).expect("invoke");
        assert_eq!(result, json!(3));
    }

    #[test]
    fn test_add_rejects_missing_operand() {
        assert!(matches!(
            Add.invoke(&json!({"a": 1})),
            Err(ToolError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_add_rejects_non_integer() {
        assert!(matches!(
            Add.invoke(&json!({"a": "one", "b": 2})),
            Err(ToolError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_multiply() {
        let result = Multiply.invoke(&json!({"a": 6, "b": 7})).expect("invoke");
        assert_eq!(result, json!(42));
    }

    #[test]
    fn test_weather_result_shape() {
        let result = CurrentWeather
            .invoke(&json!({"location": "San Francisco, CA", "unit": "celsius"}))
            .expect("invoke");
        assert_eq!(result["location"], "San Francisco, CA");
        assert_eq!(result["unit"], "celsius");
        let temperature = result["temperature"].as_i64().expect("temperature");
        assert!((-34..=43).contains(&temperature));
    }

    #[test]
    fn test_weather_defaults_unit() {
        let result = CurrentWeather
            .invoke(&json!({"location": "Anchorage, AK"}))
            .expect("invoke");
        assert_eq!(result["unit"], "fahrenheit");
    }

    #[test]
    fn test_weather_requires_location() {
        assert!(matches!(
            CurrentWeather.invoke(&json!({"unit": "celsius"})),
            Err(ToolError::InvalidArguments { .. })
        ));
    }
}
