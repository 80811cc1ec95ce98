use clap::Args;
use serde_json::Value;

use loan_engine_core::comparison::{
    self, ComparisonConfig, ComparisonInput, LoanOptionEntry, RateBasis,
};

use crate::config::CliConfig;
use crate::input;

/// Arguments for comparing loan offers
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON/YAML input file with an `options` list
    #[arg(long)]
    pub input: Option<String>,

    /// Loan offer as PRINCIPAL,RATE,MONTHS (repeat per offer; blank fields
    /// mark an incomplete offer)
    #[arg(long = "option", value_name = "PRINCIPAL,RATE,MONTHS")]
    pub options: Vec<String>,

    /// Rates are percentages (4.5) instead of fractions (0.045)
    #[arg(long)]
    pub rate_percent: bool,
}

pub fn run_compare(
    args: CompareArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request = match input::load::<ComparisonInput>(args.input.as_deref())? {
        Some(request) => request,
        None if !args.options.is_empty() => ComparisonInput {
            options: args
                .options
                .iter()
                .map(|raw| parse_option(raw))
                .collect::<Result<_, _>>()?,
            config: ComparisonConfig::default(),
        },
        None => {
            return Err(
                "--option (repeatable), --input or stdin required for loan comparison".into(),
            )
        }
    };

    // The option bound is a deployment setting, never taken from the request
    request.config.max_options = config.max_options;
    if args.rate_percent {
        request.config.rate_basis = RateBasis::Percent;
    }

    let result = comparison::run_comparison(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Split `PRINCIPAL,RATE,MONTHS` into a raw option entry. Fields stay text so
/// the engine decides what is blank, out of range, or not a number.
fn parse_option(raw: &str) -> Result<LoanOptionEntry, String> {
    let fields: Vec<&str> = raw.split(',').collect();
    if fields.len() != 3 {
        return Err(format!(
            "--option '{raw}' must have exactly three comma-separated fields"
        ));
    }
    Ok(LoanOptionEntry::new(fields[0], fields[1], fields[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_engine_core::comparison::EntryField;

    #[test]
    fn parses_three_fields() {
        let entry = parse_option("250000,0.045,360").unwrap();
        assert_eq!(entry.principal, Some(EntryField::Text("250000".into())));
        assert_eq!(entry.term_months, Some(EntryField::Text("360".into())));
    }

    #[test]
    fn keeps_blank_fields_for_the_engine() {
        let entry = parse_option(",0.05,360").unwrap();
        assert_eq!(entry.principal, Some(EntryField::Text(String::new())));
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_option("250000,0.045").is_err());
    }
}
