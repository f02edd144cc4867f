//! Sample user functions the demo agent can call.
//!
//! `fetch_current_datetime`, `fetch_weather`, `send_email` and
//! `convert_temperature`. Weather and email are mocked; each function
//! returns a JSON object that is submitted as the tool output.
//!
//! ```rust
//! use foundry_agents::tools::builtin::user_functions;
//!
//! assert_eq!(user_functions().len(), 4);
//! ```

use std::sync::Arc;

use serde::Deserialize;

use crate::tools::tool::{FnTool, Tool};
use crate::tools::types::FunctionParameters;

const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MOCK_WEATHER: [(&str, &str); 3] = [
    ("New York", "Sunny, 25°C"),
    ("London", "Cloudy, 18°C"),
    ("Tokyo", "Rainy, 22°C"),
];

/// Current local time, formatted with a strftime pattern.
pub fn fetch_current_datetime_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "fetch_current_datetime",
        "Get the current time as a JSON string, optionally formatted.",
        FunctionParameters::object()
            .string(
                "format",
                "strftime format for the time, defaults to '%Y-%m-%d %H:%M:%S'",
                false,
            )
            .build(),
        |args, _ctx| async move {
            let format = args.get_str_opt("format").unwrap_or(DEFAULT_DATETIME_FORMAT);
            let current_time = format_now(format)?;
            Ok(serde_json::json!({ "current_time": current_time }))
        },
    ))
}

fn format_now(format: &str) -> Result<String, crate::error::FoundryError> {
    use std::fmt::Write;

    let mut out = String::new();
    // chrono reports bad format specifiers as a fmt::Error while writing.
    write!(out, "{}", chrono::Local::now().format(format)).map_err(|_| {
        crate::error::FoundryError::InvalidArgument(format!("invalid datetime format: {format}"))
    })?;
    Ok(out)
}

pub fn fetch_weather_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "fetch_weather",
        "Fetch the weather information for the specified location.",
        FunctionParameters::object()
            .string("location", "The location to fetch weather for", true)
            .build(),
        |args, _ctx| async move {
            let location = args.get_str("location")?;
            let weather = MOCK_WEATHER
                .iter()
                .find(|(city, _)| *city == location)
                .map(|(_, weather)| *weather)
                .unwrap_or("Weather data not available for this location.");
            Ok(serde_json::json!({ "weather": weather }))
        },
    ))
}

#[derive(Debug, Deserialize)]
struct Email {
    recipient: String,
    subject: String,
    body: String,
}

/// Pretends to send an email. Logs it and reports success.
pub fn send_email_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "send_email",
        "Send an email to the specified recipient with subject and body.",
        FunctionParameters::object()
            .string("recipient", "Email address of the recipient", true)
            .string("subject", "Subject of the email", true)
            .string("body", "Body of the email", true)
            .build(),
        |args, _ctx| async move {
            let email: Email = args.deserialize()?;
            tracing::info!(
                recipient = %email.recipient,
                subject = %email.subject,
                body_len = email.body.len(),
                "Sending email"
            );
            Ok(serde_json::json!({
                "message": format!("Email successfully sent to {}.", email.recipient)
            }))
        },
    ))
}

pub fn convert_temperature_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "convert_temperature",
        "Convert a temperature from Celsius to Fahrenheit.",
        FunctionParameters::object()
            .number("celsius", "Temperature in Celsius", true)
            .build(),
        |args, _ctx| async move {
            let celsius = args.get_f64("celsius")?;
            Ok(serde_json::json!({ "fahrenheit": celsius * 9.0 / 5.0 + 32.0 }))
        },
    ))
}

pub fn user_functions() -> Vec<Arc<dyn Tool>> {
    vec![
        fetch_current_datetime_tool(),
        fetch_weather_tool(),
        send_email_tool(),
        convert_temperature_tool(),
    ]
}
