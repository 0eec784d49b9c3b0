use crate::cli::args::{CliArgs, Command, StudentFields};

fn validate_fields(fields: &StudentFields) -> Result<(), String> {
    if let Some(raw) = fields.fee.as_deref() {
        let fee = crate::utils::parse_amount(raw).map_err(|e| format!("invalid --fee '{raw}': {e}"))?;
        if fee < 0.0 {
            return Err(format!("invalid --fee '{raw}': must not be negative"));
        }
    }
    if let Some(raw) = fields.active.as_deref() {
        crate::utils::parse_bool(raw).map_err(|e| format!("invalid --active '{raw}': {e}"))?;
    }
    Ok(())
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --format '{raw}', expected text, json or html"
            ));
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    match &args.command {
        Command::Create { fields } => {
            if fields.name.as_deref().unwrap_or_default().trim().is_empty() {
                return Err("--name is required".to_string());
            }
            if fields.code.as_deref().unwrap_or_default().trim().is_empty() {
                return Err("--ra is required".to_string());
            }
            if fields.fee.is_none() {
                return Err("--fee is required".to_string());
            }
            validate_fields(fields)?;
        }
        Command::Update { fields, .. } => validate_fields(fields)?,
        Command::Notice {
            amount, due_date, ..
        } => {
            crate::utils::parse_amount(amount)
                .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
            crate::utils::parse_due_date(due_date)?;
        }
        _ => {}
    }
    Ok(())
}
