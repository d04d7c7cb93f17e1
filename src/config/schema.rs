//! JSON Schema Generation
//!
//! Generates JSON Schema for pollcast configuration validation.
//! Based on draft-07 of the JSON Schema specification.

use serde_json::json;
use serde_json::Value;

use crate::polls::poll::{DEFAULT_WINDOW_SECONDS, MAX_OPTIONS, MAX_WINDOW_SECONDS, MIN_WINDOW_SECONDS};

/// Generate the complete JSON schema for pollcast configuration
pub fn generate_config_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Pollcast Configuration",
        "description": "Configuration schema for the pollcast live poll engine",
        "type": "object",
        "properties": {
            "polls": generate_polls_schema(),
            "clock": generate_clock_schema(),
            "logging": generate_logging_schema(),
        },
        "additionalProperties": false
    })
}

fn generate_polls_schema() -> Value {
    json!({
        "type": "object",
        "description": "Poll creation limits",
        "properties": {
            "defaultWindowSeconds": {
                "type": "integer",
                "description": "Voting window used when a poll is created without one",
                "default": DEFAULT_WINDOW_SECONDS
            },
            "minWindowSeconds": {
                "type": "integer",
                "minimum": 1,
                "description": "Shortest accepted voting window",
                "default": MIN_WINDOW_SECONDS
            },
            "maxWindowSeconds": {
                "type": "integer",
                "minimum": 1,
                "description": "Longest accepted voting window",
                "default": MAX_WINDOW_SECONDS
            },
            "maxOptions": {
                "type": "integer",
                "minimum": 2,
                "description": "Maximum number of options per poll",
                "default": MAX_OPTIONS
            },
            "simulatedLatencyMs": {
                "type": "integer",
                "minimum": 0,
                "description": "Artificial delay before poll creation and votes complete (testing aid, 0 disables)",
                "default": 0
            }
        }
    })
}

fn generate_clock_schema() -> Value {
    json!({
        "type": "object",
        "description": "Voting window clock",
        "properties": {
            "tickIntervalMs": {
                "type": "integer",
                "minimum": 1,
                "description": "Wall-clock milliseconds per window second",
                "default": 1000
            }
        }
    })
}

fn generate_logging_schema() -> Value {
    json!({
        "type": "object",
        "description": "Logging configuration",
        "properties": {
            "level": {
                "type": "string",
                "description": "Log filter (error, warn, info, debug, trace or an env-filter directive)",
                "default": "info"
            },
            "format": {
                "type": "string",
                "enum": ["text", "json"],
                "default": "text"
            }
        }
    })
}
