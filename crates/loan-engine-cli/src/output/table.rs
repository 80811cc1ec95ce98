use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::flatten::{flatten_object, is_record_array, is_records, records};
use super::format_scalar;

/// Format output as tables using the tabled crate.
///
/// Scalar and nested fields of the result form a Field/Value table; every
/// list of records (schedule rows, comparison rows) gets its own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_table(result, map),
            _ => print_object(map),
        },
        Value::Array(arr) => print_records(arr),
        _ => println!("{}", format_scalar(value)),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_object(result);

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

fn print_object(map: &Map<String, Value>) {
    let flat = flatten_object(map);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flat.iter().filter(|(_, v)| !is_record_array(v)) {
        builder.push_record([key.clone(), format_scalar(val)]);
    }
    println!("{}", Table::from(builder));

    for (key, val) in flat.iter() {
        if let Value::Array(arr) = val {
            if is_record_array(val) {
                println!("\n{}:", key);
                print_records(arr);
            }
        }
    }
}

fn print_records(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if !is_records(arr) {
        for item in arr {
            println!("{}", format_scalar(item));
        }
        return;
    }

    let (headers, rows) = records(arr);
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row.iter().map(format_scalar));
    }
    println!("{}", Table::from(builder));
}
