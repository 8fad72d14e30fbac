//! Invoice number composition and parsing.

use chrono::{Datelike, NaiveDate};

use super::error::InvoiceError;

/// A parsed invoice number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInvoiceNo {
    /// Company initials prefix.
    pub initials: String,
    /// Two-digit year.
    pub year: u32,
    /// Month (1-12).
    pub month: u32,
    /// Sequence within the (tenant, company, month) scope.
    pub sequence: u32,
}

/// Derives the initials prefix from a company name: the first letter of
/// each whitespace-separated word, uppercased.
///
/// # Errors
///
/// Returns `InvoiceError::EmptyCompanyName` if the name has no words.
pub fn company_initials(name: &str) -> Result<String, InvoiceError> {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if initials.is_empty() {
        return Err(InvoiceError::EmptyCompanyName);
    }

    Ok(initials)
}

/// The `YYMM` period key for a date, used to scope the sequence counter.
#[must_use]
pub fn period_of(date: NaiveDate) -> String {
    format!("{:02}{:02}", date.year() % 100, date.month())
}

/// Composes an invoice number `<Initials><YY>-<MM><NNNN>`.
///
/// The sequence is zero-padded to four digits; sequences past 9999 widen
/// rather than wrap.
#[must_use]
pub fn compose_invoice_no(initials: &str, date: NaiveDate, sequence: u32) -> String {
    format!(
        "{initials}{:02}-{:02}{sequence:04}",
        date.year() % 100,
        date.month()
    )
}

/// Parses an invoice number back into its components.
///
/// # Errors
///
/// Returns `InvoiceError::MalformedNumber` if the input does not match
/// `<Initials><YY>-<MM><NNNN>`.
pub fn parse_invoice_no(invoice_no: &str) -> Result<ParsedInvoiceNo, InvoiceError> {
    let malformed = || InvoiceError::MalformedNumber(invoice_no.to_string());

    let (prefix, tail) = invoice_no.split_once('-').ok_or_else(malformed)?;

    // Prefix is <Initials><YY>: at least one initial plus two year digits.
    if prefix.len() < 3 {
        return Err(malformed());
    }
    let (initials, year_str) = prefix.split_at(prefix.len() - 2);
    let year: u32 = year_str.parse().map_err(|_| malformed())?;
    if initials.is_empty() || initials.chars().any(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    // Tail is <MM><NNNN>: two month digits plus a 4+ digit sequence.
    if tail.len() < 6 || !tail.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    let (month_str, seq_str) = tail.split_at(2);
    let month: u32 = month_str.parse().map_err(|_| malformed())?;
    if !(1..=12).contains(&month) {
        return Err(malformed());
    }
    let sequence: u32 = seq_str.parse().map_err(|_| malformed())?;

    Ok(ParsedInvoiceNo {
        initials: initials.to_string(),
        year,
        month,
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_initials_multi_word() {
        assert_eq!(company_initials("General Tech").unwrap(), "GT");
        assert_eq!(company_initials("acme retail stores").unwrap(), "ARS");
    }

    #[test]
    fn test_initials_single_word() {
        assert_eq!(company_initials("Vendra").unwrap(), "V");
    }

    #[test]
    fn test_initials_empty_name() {
        assert_eq!(company_initials("   "), Err(InvoiceError::EmptyCompanyName));
    }

    #[test]
    fn test_compose_first_invoice() {
        assert_eq!(
            compose_invoice_no("GT", date(2026, 7, 15), 0),
            "GT26-070000"
        );
    }

    #[test]
    fn test_compose_pads_sequence() {
        assert_eq!(
            compose_invoice_no("GT", date(2026, 7, 15), 42),
            "GT26-070042"
        );
    }

    #[test]
    fn test_compose_sequence_overflow_widens() {
        assert_eq!(
            compose_invoice_no("GT", date(2026, 7, 15), 12345),
            "GT26-0712345"
        );
    }

    #[test]
    fn test_period_key() {
        assert_eq!(period_of(date(2026, 7, 15)), "2607");
        assert_eq!(period_of(date(2031, 12, 1)), "3112");
    }

    #[test]
    fn test_parse_round_trip() {
        let no = compose_invoice_no("ARS", date(2026, 7, 15), 7);
        let parsed = parse_invoice_no(&no).unwrap();
        assert_eq!(
            parsed,
            ParsedInvoiceNo {
                initials: "ARS".into(),
                year: 26,
                month: 7,
                sequence: 7,
            }
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_invoice_no("").is_err());
        assert!(parse_invoice_no("GT26070000").is_err());
        assert!(parse_invoice_no("GT26-13").is_err());
        assert!(parse_invoice_no("GT26-130000").is_err());
        assert!(parse_invoice_no("26-070000").is_err());
        assert!(parse_invoice_no("GTXX-070000").is_err());
    }

    #[test]
    fn test_period_changes_across_months() {
        // Composition is pure: the caller resets the sequence when the
        // period key changes.
        assert_ne!(period_of(date(2026, 7, 31)), period_of(date(2026, 8, 1)));
    }
}
