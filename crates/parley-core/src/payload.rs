// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passthrough-parameter merging shared by every adapter.

use std::collections::BTreeMap;

use tracing::warn;

/// Keys passthrough parameters may never shadow: the merge happens after
/// payload serialization, so an unchecked merge could silently replace
/// the message array or disable streaming.
pub const RESERVED_KEYS: &[&str] = &["model", "messages", "contents", "stream"];

/// Merges opaque passthrough parameters into a serialized payload.
///
/// Caller-supplied values win over generated fields that are not
/// protocol-mandatory; reserved keys are skipped with a warning. Payloads
/// that are not JSON objects are left untouched.
pub fn merge_extra_params(
    payload: &mut serde_json::Value,
    extras: &BTreeMap<String, serde_json::Value>,
) {
    let Some(object) = payload.as_object_mut() else {
        return;
    };
    for (key, value) in extras {
        if RESERVED_KEYS.contains(&key.as_str()) {
            warn!(key, "ignoring passthrough parameter shadowing a protocol key");
            continue;
        }
        object.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extras_win_over_generated_optional_fields() {
        let mut payload = json!({"model": "m", "messages": [], "stream": true, "temperature": 1.0});
        let extras = BTreeMap::from([
            ("temperature".to_string(), json!(0.2)),
            ("top_p".to_string(), json!(0.9)),
        ]);
        merge_extra_params(&mut payload, &extras);
        assert_eq!(payload["temperature"], json!(0.2));
        assert_eq!(payload["top_p"], json!(0.9));
    }

    #[test]
    fn reserved_keys_are_never_shadowed() {
        let mut payload = json!({"model": "m", "messages": [{"role": "user"}], "stream": true});
        let extras = BTreeMap::from([
            ("model".to_string(), json!("evil")),
            ("messages".to_string(), json!([])),
            ("contents".to_string(), json!([])),
            ("stream".to_string(), json!(false)),
        ]);
        merge_extra_params(&mut payload, &extras);
        assert_eq!(payload["model"], json!("m"));
        assert_eq!(payload["messages"], json!([{"role": "user"}]));
        assert_eq!(payload["stream"], json!(true));
        assert!(payload.get("contents").is_none());
    }
}
