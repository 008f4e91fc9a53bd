//! Request validation for the generate and delete endpoints.
//!
//! Bodies arrive as raw bytes. Anything that isn't a JSON object is treated
//! as an empty object, so malformed input gets the same answer as a body with
//! no fields at all.

use crate::{Error, Result};
use serde_json::{Map, Value};

/// Accent colour used when `focusTextColor` is not supplied
pub const DEFAULT_FOCUS_COLOR: &str = "#FF4500";

/// Document language used when `language` is not supplied
pub const DEFAULT_LANGUAGE: &str = "en";

/// Reading direction of the post text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// Parse a client-supplied direction. Only the exact string `rtl`
    /// selects right-to-left.
    pub fn parse(value: &str) -> Self {
        if value == "rtl" {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// A validated generate request with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct PostSpec {
    pub image_url: String,
    pub logo_url: String,
    pub text01: String,
    pub focus_text: String,
    pub text02: String,
    pub direction: Direction,
    pub language: String,
    pub focus_text_color: String,
}

impl PostSpec {
    /// Validate a raw `POST /generate-post` body.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        Self::from_object(&parse_object(body))
    }

    /// Validate an already-parsed JSON object.
    pub fn from_object(obj: &Map<String, Value>) -> Result<Self> {
        let required = |key: &str| field(obj, key).ok_or(Error::MissingField);

        // Check all five before building anything so the error is uniform.
        let image_url = required("imageUrl");
        let logo_url = required("logoUrl");
        let text01 = required("text01");
        let focus_text = required("focusText");
        let text02 = required("text02");

        Ok(Self {
            image_url: image_url?,
            logo_url: logo_url?,
            text01: text01?,
            focus_text: focus_text?,
            text02: text02?,
            direction: field(obj, "direction")
                .map(|d| Direction::parse(&d))
                .unwrap_or_default(),
            language: field(obj, "language").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            focus_text_color: field(obj, "focusTextColor").unwrap_or_else(|| DEFAULT_FOCUS_COLOR.to_string()),
        })
    }
}

/// A validated `DELETE /delete-image` body. The name itself is checked by the
/// file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSpec {
    pub file_name: String,
}

impl DeleteSpec {
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let obj = parse_object(body);
        let file_name = field(&obj, "fileName").ok_or(Error::MissingFileName)?;
        Ok(Self { file_name })
    }
}

fn parse_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(obj)) => obj,
        Ok(_) => {
            log::debug!("Request body is JSON but not an object; treating as empty");
            Map::new()
        }
        Err(e) => {
            if !body.is_empty() {
                log::debug!("Request body is not valid JSON ({}); treating as empty", e);
            }
            Map::new()
        }
    }
}

/// Extract a field using JSON truthiness: empty strings, `null`, `false`
/// and zero count as absent.
fn field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => {
            log::debug!("Ignoring non-scalar value for field {}", key);
            None
        }
        _ => None,
    }
}
