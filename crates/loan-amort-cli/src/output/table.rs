use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Schedule columns, in display order.
const SCHEDULE_COLUMNS: [(&str, &str); 8] = [
    ("period", "Period"),
    ("payment_date", "Date"),
    ("total_payment", "Payment"),
    ("interest_component", "Interest"),
    ("principal_component", "Principal"),
    ("extra_component", "Extra"),
    ("balance_after", "Balance"),
    ("cumulative_sunk_cost", "Sunk cost"),
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        println!("{}", result);
        return;
    };

    if let Some(Value::Array(rows)) = res_map.get("schedule") {
        print_schedule(rows);
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in res_map {
        match key.as_str() {
            "schedule" => {}
            "summary" | "extra_payment_impact" => {
                if let Value::Object(nested) = val {
                    for (k, v) in nested {
                        if let Value::Object(_) = v {
                            continue;
                        }
                        builder.push_record([format!("{}.{}", key, k), format_value(v)]);
                    }
                }
            }
            _ => builder.push_record([key.clone(), format_value(val)]),
        }
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_schedule(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty schedule)");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(SCHEDULE_COLUMNS.iter().map(|(_, label)| label.to_string()));
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(SCHEDULE_COLUMNS.iter().map(|(key, _)| {
                map.get(*key).map(format_money).unwrap_or_default()
            }));
        }
    }
    println!("{}\n", Table::from(builder));
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

/// Decimal strings rounded to cents for display; other values unchanged.
fn format_money(value: &Value) -> String {
    match value {
        Value::String(s) => match s.parse::<rust_decimal::Decimal>() {
            Ok(d) if s.contains('.') => d.round_dp(2).to_string(),
            _ => s.clone(),
        },
        other => format_value(other),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
