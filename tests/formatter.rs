//! Formatter behaviour on events emitted through `tracing`.

use serde_json::json;

use request_journal::observability::format::{FormatterConfig, TimeFormat};

mod common;

#[test]
fn test_extra_fields_follow_fixed_keys() {
    let (logs, _guard) = common::capture_logs(FormatterConfig::default());
    tracing::warn!(order_id = 17_u64, paid = false, ratio = 0.25, "payment pending");

    let events = logs.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event["level"], json!("warn"));
    assert_eq!(event["msg"], json!("payment pending"));
    assert_eq!(event["order_id"], json!(17));
    assert_eq!(event["paid"], json!(false));
    assert_eq!(event["ratio"], json!(0.25));
    assert!(event["time"].is_f64());
    assert!(event["caller"].as_str().unwrap().starts_with("tests/formatter.rs:"));
}

#[test]
fn test_reserved_field_names_are_dropped() {
    let (logs, _guard) = common::capture_logs(FormatterConfig::default());
    tracing::info!(level = "shadow", caller = "shadow", _secret = "hidden", kept = "yes", "hello");

    let event = &logs.events()[0];
    assert_eq!(event["level"], json!("info"));
    assert_ne!(event["caller"], json!("shadow"));
    assert!(event.get("_secret").is_none());
    assert_eq!(event["kept"], json!("yes"));
}

#[test]
fn test_debug_and_trace_map_to_debug() {
    let (logs, _guard) = common::capture_logs(FormatterConfig::default());
    tracing::debug!("detail");

    let event = &logs.events()[0];
    assert_eq!(event["level"], json!("debug"));
    assert_eq!(event["msg"], json!("detail"));
}

#[test]
fn test_indented_output_spans_lines() {
    let (logs, _guard) = common::capture_logs(FormatterConfig {
        time_format: TimeFormat::EpochSeconds,
        indent: Some(2),
    });
    tracing::error!(code = 7_i64, "broken");

    let text = logs.text();
    assert!(text.lines().count() > 1);
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["level"], json!("error"));
    assert_eq!(parsed["code"], json!(7));
}

#[test]
fn test_text_format_uses_upper_case_level() {
    let (logs, _guard) = common::capture_text_logs();
    tracing::warn!(order_id = 17_u64, note = "two words", "payment pending");

    let text = logs.text();
    let line = text.lines().next().unwrap();
    assert!(line.starts_with("WARN  "), "{line}");
    assert!(line.contains(" tests/formatter.rs:"), "{line}");
    assert!(line.contains("payment pending"), "{line}");
    assert!(line.contains("order_id=17"), "{line}");
    assert!(line.contains("note=\"two words\""), "{line}");
}
