use serde_json::Value;

/// Headline fields in order of priority
const PRIORITY_KEYS: [&str; 4] = ["irr", "moic", "enterprise_value", "equity_value"];

/// Print just the key answer value from the output.
///
/// For a list of scenarios, prints one `label: value` line per scenario.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Array(items) => {
            for item in items {
                println!("{}", minimal_line(item));
            }
        }
        other => println!("{}", minimal_line(other)),
    }
}

fn minimal_line(value: &Value) -> String {
    let Value::Object(map) = value else {
        return format_minimal(value);
    };

    let headline = PRIORITY_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))
        .or_else(|| map.iter().next().map(|(k, v)| (k.as_str(), v)));

    match (map.get("label").and_then(Value::as_str), headline) {
        (Some(label), Some((key, val))) => format!("{label}: {key} {}", format_minimal(val)),
        (None, Some((_, val))) => format_minimal(val),
        (_, None) => String::new(),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
