//! `get_weather`: current conditions from the Open-Meteo forecast API.

use async_trait::async_trait;
use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::Tool;
use crate::backend::http_error;
use crate::error::Result;
use crate::WorkflowError;

pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";

const TOOL_NAME: &str = "get_weather";

/// Final answer of the weather assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherResponse {
    /// The current temperature in celsius for the given location.
    pub temperature: f64,
    /// A natural language response to the user's question.
    pub response: String,
}

pub struct WeatherTool {
    client: Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: OPEN_METEO_BASE_URL.to_string(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn forecast_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/v1/forecast?latitude={}&longitude={}&current=temperature_2m,wind_speed_10m&hourly=temperature_2m,relative_humidity_2m,wind_speed_10m",
            self.base_url, latitude, longitude
        )
    }

    /// Fetch the `current` block of the forecast for a coordinate.
    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<Value> {
        let url = self.forecast_url(latitude, longitude);
        debug!(%url, "Fetching weather");
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(http_error(resp).await);
        }
        let mut body: Value = resp.json().await?;
        match body.get_mut("current") {
            Some(current) => Ok(current.take()),
            None => Err(WorkflowError::tool(
                TOOL_NAME,
                "forecast response has no 'current' block",
            )),
        }
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

fn coordinate(args: &Value, key: &str) -> Result<f64> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| WorkflowError::tool(TOOL_NAME, format!("'{}' must be a number", key)))
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Gets the current temperature for provided coordinates."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "latitude": {
                    "type": "number",
                    "description": "The latitude coordinate of the location"
                },
                "longitude": {
                    "type": "number",
                    "description": "The longitude coordinate of the location"
                }
            },
            "required": ["latitude", "longitude"]
        })
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let latitude = coordinate(args, "latitude")?;
        let longitude = coordinate(args, "longitude")?;
        self.current(latitude, longitude).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_url() {
        let tool = WeatherTool::new();
        assert_eq!(
            tool.forecast_url(48.8566, 2.3522),
            "https://api.open-meteo.com/v1/forecast?latitude=48.8566&longitude=2.3522&current=temperature_2m,wind_speed_10m&hourly=temperature_2m,relative_humidity_2m,wind_speed_10m"
        );
    }

    #[test]
    fn test_custom_base_url() {
        let tool = WeatherTool::new().with_base_url("http://localhost:9000/");
        assert!(tool
            .forecast_url(1.0, -2.5)
            .starts_with("http://localhost:9000/v1/forecast?latitude=1&longitude=-2.5&"));
    }

    #[test]
    fn test_declaration() {
        let tool = WeatherTool::default();
        assert_eq!(tool.name(), "get_weather");
        let params = tool.parameters();
        assert_eq!(params["required"], json!(["latitude", "longitude"]));
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_coordinates() {
        let tool = WeatherTool::new();
        let err = tool.execute(&json!({"latitude": 48.8})).await.unwrap_err();
        match err {
            WorkflowError::Tool { tool, message } => {
                assert_eq!(tool, "get_weather");
                assert!(message.contains("longitude"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_weather_response_schema() {
        let schema = crate::schema::response_schema::<WeatherResponse>().unwrap();
        assert_eq!(
            schema.schema["properties"]["temperature"]["description"],
            "The current temperature in celsius for the given location."
        );
    }

    #[test]
    fn test_weather_response_round_trip() {
        let answer: WeatherResponse = serde_json::from_str(
            r#"{"temperature": 12.4, "response": "It is 12.4°C in Paris right now."}"#,
        )
        .unwrap();
        assert_eq!(answer.temperature, 12.4);
        let again: WeatherResponse =
            serde_json::from_str(&serde_json::to_string(&answer).unwrap()).unwrap();
        assert_eq!(again, answer);
    }
}
