use serde_json::Value;

use super::flatten::flatten_object;
use super::format_scalar;

/// Key answer of each command, in priority order.
const PRIORITY_KEYS: [&str; 6] = [
    "monthly_payment",
    "summary.monthly_payment",
    "best_option_index",
    "rating",
    "recommended_budget",
    "debt_to_income",
];

/// Print just the key answer value from the output, falling back to the
/// first field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let flat = flatten_object(map);

        for key in PRIORITY_KEYS {
            if let Some((_, val)) = flat.iter().find(|(k, v)| k == key && !v.is_null()) {
                println!("{}", format_scalar(val));
                return;
            }
        }

        if let Some((key, val)) = flat.first() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
