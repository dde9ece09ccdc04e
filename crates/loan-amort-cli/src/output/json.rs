use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_json(&mut stdout.lock(), value) {
        tracing::error!("JSON output error: {}", e);
    }
}

/// Amounts arrive as decimal strings and are written untouched, so no
/// precision is lost to floating point on the way out.
fn write_json<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimal_strings_survive_output() {
        let value = json!({
            "result": {
                "monthly_payment": "1028.6125969255858",
                "schedule": [{"period": 1, "balance_after": "99971.387403074414"}]
            }
        });
        let mut out = Vec::new();
        write_json(&mut out, &value).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"monthly_payment\": \"1028.6125969255858\""));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, value);
    }
}
