use chrono::NaiveDate;

pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_currency(value: f64) -> String {
    format!("R$ {}", format_amount(value))
}

pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn parse_amount(value: &str) -> Result<f64, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("amount is empty".to_string());
    }
    let normalized = raw.replace(',', ".");
    let parsed: f64 = normalized
        .parse()
        .map_err(|_| format!("invalid amount '{raw}'"))?;
    if !parsed.is_finite() {
        return Err(format!("invalid amount '{raw}'"));
    }
    Ok(parsed)
}

pub fn parse_due_date(value: &str) -> Result<NaiveDate, String> {
    let raw = value.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" | "sim" => Ok(true),
        "false" | "no" | "n" | "0" | "off" | "nao" | "não" => Ok(false),
        other => Err(format!("invalid boolean '{other}'")),
    }
}
