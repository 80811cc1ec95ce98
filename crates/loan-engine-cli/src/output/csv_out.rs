use loan_engine_core::format::format_currency;
use serde_json::Value;
use std::io;

use super::flatten::{flatten_object, is_record_array, is_records, records};
use super::format_scalar;

/// Written bare; only the data rows are quoted.
const SCHEDULE_HEADER: &str = "Payment #,Payment Amount,Principal,Interest,Remaining Balance";

/// Write output as CSV to stdout.
///
/// An amortization schedule is exported in its fixed five-column layout;
/// any other list of records becomes one row per record.
pub fn print_csv(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(rows) = schedule_rows(result) {
        if let Err(e) = write_schedule(io::stdout().lock(), rows) {
            eprintln!("CSV export error: {}", e);
        }
        return;
    }

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result {
        Value::Array(arr) => write_records(&mut wtr, arr),
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = map.get("rows") {
                write_records(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in flatten_object(map) {
                    if !is_record_array(&val) {
                        let _ = wtr.write_record([key.as_str(), &format_scalar(&val)]);
                    }
                }
            }
        }
        _ => {
            let _ = wtr.write_record([&format_scalar(result)]);
        }
    }

    let _ = wtr.flush();
}

fn schedule_rows(result: &Value) -> Option<&Vec<Value>> {
    let rows = result.get("rows")?.as_array()?;
    rows.first()?.get("remaining_balance")?;
    Some(rows)
}

fn write_schedule<W: io::Write>(mut out: W, rows: &[Value]) -> io::Result<()> {
    writeln!(out, "{SCHEDULE_HEADER}")?;

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(out);
    for row in rows {
        let money =
            |key: &str| format_currency(row.get(key).and_then(Value::as_f64).unwrap_or(0.0));
        let index = row.get("index").map(format_scalar).unwrap_or_default();
        wtr.write_record([
            index,
            money("payment_amount"),
            money("principal_portion"),
            money("interest_portion"),
            money("remaining_balance"),
        ])?;
    }
    wtr.flush()
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if !is_records(arr) {
        for item in arr {
            let _ = wtr.write_record([&format_scalar(item)]);
        }
        return;
    }

    let (headers, rows) = records(arr);
    let _ = wtr.write_record(&headers);
    for row in rows {
        let _ = wtr.write_record(row.iter().map(format_scalar));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_engine_core::schedule::build_schedule;
    use loan_engine_core::LoanInputs;

    fn export(principal: f64, rate: f64, months: u32) -> Vec<String> {
        let inputs = LoanInputs::new(principal, rate, months).unwrap();
        let value = serde_json::to_value(build_schedule(&inputs).unwrap()).unwrap();
        let rows = schedule_rows(&value["result"]).unwrap();

        let mut buf = Vec::new();
        write_schedule(&mut buf, rows).unwrap();
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn schedule_export_layout() {
        let lines = export(1_200.0, 0.0, 12);
        assert_eq!(lines.len(), 13);
        assert_eq!(
            lines[0],
            "Payment #,Payment Amount,Principal,Interest,Remaining Balance"
        );
        assert_eq!(
            lines[1],
            r#""1","$100.00","$100.00","$0.00","$1,100.00""#
        );
        assert_eq!(lines[12], r#""12","$100.00","$100.00","$0.00","$0.00""#);
    }

    #[test]
    fn schedule_export_quotes_every_field_in_order() {
        let lines = export(250_000.0, 0.045, 360);
        assert_eq!(lines.len(), 361);
        for (i, line) in lines[1..].iter().enumerate() {
            let fields: Vec<&str> = line.split("\",\"").collect();
            assert_eq!(fields.len(), 5, "row {line}");
            assert!(line.starts_with('"') && line.ends_with('"'));
            assert_eq!(fields[0], format!("\"{}", i + 1));
            // Currency to two decimals
            assert!(fields[1].starts_with('$'));
            assert_eq!(fields[1].rsplit('.').next().unwrap().len(), 2);
        }
        assert!(lines[1].contains("\"$1,266.71\""));
        assert!(lines[1].contains("\"$937.50\""));
    }
}
