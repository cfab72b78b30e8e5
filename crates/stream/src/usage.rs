//! Usage and limit metadata tracking.
//!
//! The remote service reports resource consumption through comment
//! lines and reserved metadata events. Key names are not standardized,
//! so classification is by case-insensitive substring: "token" keys go
//! to the token class, "minute"/"time" keys to the minutes class, and
//! keys that also mention "limit"/"max"/"cap"/"total" set the limit
//! side instead of the used side.

use serde::{Deserialize, Serialize};

/// Used/limit pair for one resource class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub used: Option<f64>,
    pub limit: Option<f64>,
}

/// A point-in-time copy of the meter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub tokens: ResourceUsage,
    pub minutes: ResourceUsage,
}

/// Accumulates usage metadata over the life of one stream.
#[derive(Debug, Clone, Default)]
pub struct UsageMeter {
    tokens: ResourceUsage,
    minutes: ResourceUsage,
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one key/value pair from the metadata side channel.
    /// Unclassifiable keys are ignored.
    pub fn record(&mut self, key: &str, value: f64) {
        let lowered = key.to_lowercase();

        let slot = if lowered.contains("token") {
            &mut self.tokens
        } else if lowered.contains("minute") || lowered.contains("time") {
            &mut self.minutes
        } else {
            tracing::trace!(key, "unclassified usage key ignored");
            return;
        };

        let is_limit = ["limit", "max", "cap", "total"]
            .iter()
            .any(|marker| lowered.contains(marker));

        if is_limit {
            slot.limit = Some(value);
        } else {
            slot.used = Some(value);
        }
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            tokens: self.tokens,
            minutes: self.minutes,
        }
    }
}

/// Parse a metadata payload into key/value pairs and feed the meter.
///
/// Accepts a JSON object, or `key: value` / `key=value` pairs separated
/// by `,` or `;`. Anything unparseable is skipped silently.
pub fn apply_metadata(meter: &mut UsageMeter, payload: &str) {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        for (key, value) in map {
            if let Some(number) = value.as_f64().or_else(|| {
                value.as_str().and_then(|s| s.trim().parse::<f64>().ok())
            }) {
                meter.record(&key, number);
            }
        }
        return;
    }

    for pair in trimmed.split([',', ';']) {
        let Some((key, value)) = pair.split_once([':', '=']) else {
            continue;
        };
        if let Ok(number) = value.trim().parse::<f64>() {
            meter.record(key.trim(), number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_token_and_minute_keys() {
        let mut meter = UsageMeter::new();
        meter.record("tokens_used", 1200.0);
        meter.record("token_limit", 100_000.0);
        meter.record("minutes", 3.0);
        meter.record("time_cap", 60.0);

        let snap = meter.snapshot();
        assert_eq!(snap.tokens.used, Some(1200.0));
        assert_eq!(snap.tokens.limit, Some(100_000.0));
        assert_eq!(snap.minutes.used, Some(3.0));
        assert_eq!(snap.minutes.limit, Some(60.0));
    }

    #[test]
    fn unknown_keys_ignored() {
        let mut meter = UsageMeter::new();
        meter.record("requests", 5.0);
        assert_eq!(meter.snapshot(), UsageSnapshot::default());
    }

    #[test]
    fn classification_is_case_insensitive() {
        let mut meter = UsageMeter::new();
        meter.record("TOKENS-MAX", 9.0);
        assert_eq!(meter.snapshot().tokens.limit, Some(9.0));
    }

    #[test]
    fn json_metadata_applies() {
        let mut meter = UsageMeter::new();
        apply_metadata(&mut meter, r#"{"tokens": 42, "token_total": "500"}"#);
        let snap = meter.snapshot();
        assert_eq!(snap.tokens.used, Some(42.0));
        assert_eq!(snap.tokens.limit, Some(500.0));
    }

    #[test]
    fn pair_metadata_applies() {
        let mut meter = UsageMeter::new();
        apply_metadata(&mut meter, "tokens: 10, minutes=2; token_limit: 99");
        let snap = meter.snapshot();
        assert_eq!(snap.tokens.used, Some(10.0));
        assert_eq!(snap.minutes.used, Some(2.0));
        assert_eq!(snap.tokens.limit, Some(99.0));
    }

    #[test]
    fn garbage_metadata_is_silent() {
        let mut meter = UsageMeter::new();
        apply_metadata(&mut meter, "not metadata at all");
        apply_metadata(&mut meter, "");
        assert_eq!(meter.snapshot(), UsageSnapshot::default());
    }
}
