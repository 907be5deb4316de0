//! Response envelopes
//!
//! Upstream providers return heterogeneous JSON. Every capability result is
//! reshaped here into one of a small set of caller-facing shapes, built fresh
//! per request and never mutated afterwards.

use serde::Serialize;
use serde_json::Value;

use crate::error::UpstreamError;

/// Uniform `{success, data}` envelope.
///
/// `included` and `meta` carry the JSON:API sidecars some upstreams attach
/// to their primary data; both are omitted from the body when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T = Vec<Value>> {
    /// Always `true`: failures never produce an envelope
    pub success: bool,
    /// Primary payload
    pub data: T,
    /// Related resources referenced by `data`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included: Option<Value>,
    /// Upstream metadata about `data`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<T> Envelope<T> {
    /// Successful envelope without sidecars
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            included: None,
            meta: None,
        }
    }

    /// Attach an `included` sidecar, dropping null or empty values
    #[must_use]
    pub fn with_included(mut self, included: Option<Value>) -> Self {
        self.included = included.filter(|v| !is_blank(v));
        self
    }

    /// Attach a `meta` sidecar, dropping null or empty values
    #[must_use]
    pub fn with_meta(mut self, meta: Option<Value>) -> Self {
        self.meta = meta.filter(|v| !is_blank(v));
        self
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// AI agent answer; `question` is echoed from the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentAnswer {
    /// The question exactly as asked
    pub question: String,
    /// Upstream answer text
    pub answer: String,
}

/// One OHLCV candle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    /// Unix seconds at candle open
    pub timestamp: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
}

/// Interpret a payload as an ordered list of records.
///
/// Arrays are taken as-is, `null` becomes an empty list and any other value
/// becomes a one-element list.
#[must_use]
pub fn into_records(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Wrap a list-valued payload
#[must_use]
pub fn list(payload: Value) -> Envelope {
    Envelope::ok(into_records(payload))
}

/// Walk a dotted path (`data.Solana.DEXTrades`, `data.0.name`).
///
/// Missing segments yield `Value::Null`.
#[must_use]
pub fn extract_path(value: Value, path: &str) -> Value {
    let mut current = value;

    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }

        current = match current {
            Value::Object(mut map) => map.remove(segment).unwrap_or(Value::Null),
            Value::Array(mut arr) => match segment.parse::<usize>() {
                Ok(index) if index < arr.len() => arr.swap_remove(index),
                _ => Value::Null,
            },
            _ => Value::Null,
        };
    }

    current
}

/// Split a JSON:API document into `(data, included, meta)`
#[must_use]
pub fn split_document(document: Value) -> (Value, Option<Value>, Option<Value>) {
    match document {
        Value::Object(mut map) => {
            let data = map.remove("data").unwrap_or(Value::Null);
            (data, map.remove("included"), map.remove("meta"))
        }
        other => (other, None, None),
    }
}

/// Reshape `[[ts, o, h, l, c, v], ...]` rows into candles.
///
/// Rows shorter than six columns or with non-numeric cells are rejected,
/// numeric strings are accepted.
pub fn candles(provider: &'static str, rows: Value) -> Result<Vec<Candle>, UpstreamError> {
    into_records(rows)
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row.as_array().filter(|c| c.len() >= 6).ok_or_else(|| {
                UpstreamError::transport(provider, format!("malformed OHLCV row {i}"))
            })?;
            let num = |j: usize| {
                number(&cells[j]).ok_or_else(|| {
                    UpstreamError::transport(provider, format!("non-numeric OHLCV cell {i}:{j}"))
                })
            };
            #[allow(clippy::cast_possible_truncation)]
            let timestamp = num(0)? as i64;
            Ok(Candle {
                timestamp,
                open: num(1)?,
                high: num(2)?,
                low: num(3)?,
                close: num(4)?,
                volume: num(5)?,
            })
        })
        .collect()
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_list_still_succeeds() {
        let body = serde_json::to_value(list(json!([]))).unwrap();
        assert_eq!(body, json!({"success": true, "data": []}));

        let body = serde_json::to_value(list(Value::Null)).unwrap();
        assert_eq!(body, json!({"success": true, "data": []}));
    }

    #[test]
    fn single_object_becomes_one_record() {
        let env = list(json!({"TOKEN_SYMBOL": "BTC"}));
        assert_eq!(env.data, vec![json!({"TOKEN_SYMBOL": "BTC"})]);
    }

    #[test]
    fn list_order_preserved() {
        let env = list(json!([{"n": 1}, {"n": 2}, {"n": 3}]));
        let ns: Vec<_> = env.data.iter().map(|v| v["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[test]
    fn extract_path_walks_objects_and_arrays() {
        let value = json!({
            "data": {
                "users": [
                    {"name": "Alice"},
                    {"name": "Bob"}
                ]
            }
        });

        let users = extract_path(value.clone(), "data.users");
        assert_eq!(users.as_array().unwrap().len(), 2);

        assert_eq!(extract_path(value.clone(), "data.users.1.name"), "Bob");
        assert_eq!(extract_path(value, "data.missing.x"), Value::Null);
    }

    #[test]
    fn sidecars_skipped_when_blank() {
        let env = Envelope::ok(json!({"id": "x"}))
            .with_included(Some(json!([])))
            .with_meta(Some(json!({"base": {"symbol": "SUI"}})));
        let body = serde_json::to_value(env).unwrap();
        assert_eq!(
            body,
            json!({"success": true, "data": {"id": "x"}, "meta": {"base": {"symbol": "SUI"}}})
        );
    }

    #[test]
    fn split_jsonapi_document() {
        let (data, included, meta) = split_document(json!({
            "data": [{"id": "p1"}],
            "included": [{"id": "t1"}]
        }));
        assert_eq!(data, json!([{"id": "p1"}]));
        assert_eq!(included, Some(json!([{"id": "t1"}])));
        assert_eq!(meta, None);
    }

    #[test]
    fn candles_from_rows() {
        let rows = json!([[1_700_000_000, 1.0, 2.0, 0.5, "1.5", 1000]]);
        let out = candles("pools", rows).unwrap();
        assert_eq!(
            out,
            vec![Candle {
                timestamp: 1_700_000_000,
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 1000.0,
            }]
        );

        assert!(candles("pools", json!([[1, 2, 3]])).is_err());
        assert!(candles("pools", json!([[1, 2, 3, 4, 5, null]])).is_err());
    }

    #[test]
    fn agent_answer_shape() {
        let body = serde_json::to_value(AgentAnswer {
            question: "Is BTC bullish?".into(),
            answer: "Maybe.".into(),
        })
        .unwrap();
        assert_eq!(body, json!({"question": "Is BTC bullish?", "answer": "Maybe."}));
    }
}
