use serde_json::Value;
use std::io::{self, Write};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    match value {
        Value::Object(map) => {
            let body = map.get("result").unwrap_or(value);
            match body {
                Value::Array(arr) => write_array_csv(wtr, arr),
                Value::Object(result) => {
                    // Two-column CSV: field, value. Record arrays are
                    // flattened to `key.label.field` rows.
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in result {
                        write_field_rows(wtr, key, val);
                    }
                }
                other => {
                    let _ = wtr.write_record([&format_csv_value(other)]);
                }
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }
}

fn write_field_rows<W: Write>(wtr: &mut csv::Writer<W>, key: &str, val: &Value) {
    match val {
        Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
            for (i, item) in items.iter().enumerate() {
                if let Value::Object(record) = item {
                    let id = record
                        .get("label")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| i.to_string());
                    for (field, v) in record.iter().filter(|(f, _)| f.as_str() != "label") {
                        let _ = wtr.write_record([
                            format!("{key}.{id}.{field}"),
                            format_csv_value(v),
                        ]);
                    }
                }
            }
        }
        _ => {
            let _ = wtr.write_record([key, &format_csv_value(val)]);
        }
    }
}

fn write_array_csv<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_csv_value).collect::<Vec<_>>().join(";"),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
