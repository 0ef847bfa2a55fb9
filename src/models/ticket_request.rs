use serde_json::{Map, Value};

/// Body keys that may carry the ticket identifier, in precedence order.
pub const TICKET_ID_KEYS: [&str; 4] = ["ticket_id", "ticketId", "Ticket_id", "TicketID"];

/// Turns the raw request body into a key-value mapping.
///
/// Callers send the payload in several shapes: a plain object, an object
/// wrapped in an array, or the whole thing JSON-encoded into a string (and
/// occasionally both). Strings are parsed and arrays unwrapped until an object
/// remains. Empty input and empty arrays become an empty mapping, as does
/// any scalar left over at the end.
pub fn parse_body(raw: &[u8]) -> Result<Map<String, Value>, serde_json::Error> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_slice(raw)?;
    normalize(value)
}

pub fn normalize(mut value: Value) -> Result<Map<String, Value>, serde_json::Error> {
    loop {
        value = match value {
            Value::Object(map) => return Ok(map),
            Value::String(text) if text.is_empty() => return Ok(Map::new()),
            Value::String(text) => serde_json::from_str(&text)?,
            Value::Array(items) => match items.into_iter().next() {
                Some(first) => first,
                None => return Ok(Map::new()),
            },
            Value::Null | Value::Bool(_) | Value::Number(_) => return Ok(Map::new()),
        };
    }
}

/// Returns the first usable identifier under [`TICKET_ID_KEYS`].
pub fn extract_ticket_id(body: &Map<String, Value>) -> Option<String> {
    TICKET_ID_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(coerce_identifier))
}

// Falsy values (null, false, 0, "") do not count. Neither do objects and
// arrays, which have no sensible string form.
fn coerce_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_f64() => n.as_f64().filter(|f| *f != 0.0).map(float_identifier),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

// Whole floats print without a fraction, so `1.0` and `1e3` match the
// `ticket_id` values "1" and "1000" stored upstream.
fn float_identifier(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}
