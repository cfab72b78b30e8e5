//! Guardrail payload sniffing.
//!
//! The canonical control schema is `ControlPayload { level, code,
//! message }`, but deployed services have sent several ad hoc shapes.
//! This module is the compatibility shim that recognizes them; new
//! integrations should emit the canonical shape.

use palisade_core::event::ControlPayload;
use serde_json::Value;

/// Keys whose presence marks a JSON object as guardrail-shaped.
const GUARD_KEYS: [&str; 5] = ["level", "severity", "error", "warning", "guard"];

/// Try to interpret `payload` as a control signal.
///
/// Accepts the canonical schema, plus these legacy shapes:
/// - `{"severity": "...", "message": "..."}`
/// - `{"error": "..."}` / `{"warning": "..."}` (bare string detail)
/// - `{"guard": { ... nested payload ... }}`
///
/// Returns `None` for anything that is not guardrail-shaped, including
/// non-JSON text.
pub fn sniff_control(payload: &str) -> Option<ControlPayload> {
    let value: Value = serde_json::from_str(payload.trim()).ok()?;
    sniff_value(&value)
}

/// Same, for already-parsed JSON.
pub fn sniff_value(value: &Value) -> Option<ControlPayload> {
    let object = value.as_object()?;
    if !GUARD_KEYS.iter().any(|key| object.contains_key(*key)) {
        return None;
    }

    // nested shape: {"guard": {...}}
    if let Some(inner) = object.get("guard") {
        if inner.is_object() {
            return sniff_value(inner).or(Some(ControlPayload {
                level: "warn".into(),
                code: None,
                message: inner.to_string(),
            }));
        }
    }

    let level = object
        .get("level")
        .or_else(|| object.get("severity"))
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .unwrap_or_else(|| {
            if object.contains_key("error") {
                "error".into()
            } else {
                "warn".into()
            }
        });

    let message = object
        .get("message")
        .or_else(|| object.get("error"))
        .or_else(|| object.get("warning"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let code = object
        .get("code")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ControlPayload {
        level,
        code,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_shape() {
        let payload = sniff_control(r#"{"level":"error","code":"rate","message":"slow down"}"#)
            .expect("canonical shape recognized");
        assert!(payload.is_error());
        assert_eq!(payload.code.as_deref(), Some("rate"));
        assert_eq!(payload.message, "slow down");
    }

    #[test]
    fn severity_alias() {
        let payload = sniff_control(r#"{"severity":"WARN","message":"careful"}"#).unwrap();
        assert_eq!(payload.level, "warn");
    }

    #[test]
    fn bare_error_string() {
        let payload = sniff_control(r#"{"error":"upstream overloaded"}"#).unwrap();
        assert!(payload.is_error());
        assert_eq!(payload.message, "upstream overloaded");
    }

    #[test]
    fn bare_warning_string() {
        let payload = sniff_control(r#"{"warning":"degraded"}"#).unwrap();
        assert!(!payload.is_error());
        assert_eq!(payload.message, "degraded");
    }

    #[test]
    fn nested_guard_object() {
        let payload =
            sniff_control(r#"{"guard":{"level":"error","message":"blocked"}}"#).unwrap();
        assert!(payload.is_error());
        assert_eq!(payload.message, "blocked");
    }

    #[test]
    fn plain_text_and_unrelated_json_rejected() {
        assert!(sniff_control("hello world").is_none());
        assert!(sniff_control(r#"{"answer":"42"}"#).is_none());
        assert!(sniff_control(r#"[1,2,3]"#).is_none());
    }
}
