//! Property tests for invoice number derivation.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use super::number::{company_initials, compose_invoice_no, parse_invoice_no, period_of};

fn initials_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z]{1,5}").unwrap()
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Compose then parse recovers the components exactly.
    #[test]
    fn prop_compose_parse_round_trip(
        initials in initials_strategy(),
        date in date_strategy(),
        seq in 0u32..100_000,
    ) {
        let no = compose_invoice_no(&initials, date, seq);
        let parsed = parse_invoice_no(&no).unwrap();

        prop_assert_eq!(parsed.initials, initials);
        prop_assert_eq!(parsed.year, u32::try_from(date.year() % 100).unwrap());
        prop_assert_eq!(parsed.month, date.month());
        prop_assert_eq!(parsed.sequence, seq);
    }

    /// Within one period, composed numbers are strictly increasing in the
    /// sequence, both numerically and lexicographically up to 9999.
    #[test]
    fn prop_sequence_is_monotonic_within_period(
        initials in initials_strategy(),
        date in date_strategy(),
        seq in 0u32..9_999,
    ) {
        let a = compose_invoice_no(&initials, date, seq);
        let b = compose_invoice_no(&initials, date, seq + 1);

        prop_assert!(a < b);
        prop_assert_eq!(
            parse_invoice_no(&a).unwrap().sequence + 1,
            parse_invoice_no(&b).unwrap().sequence
        );
    }

    /// The period key is unique per (year % 100, month).
    #[test]
    fn prop_period_key_discriminates_months(
        a in date_strategy(),
        b in date_strategy(),
    ) {
        let same_scope = a.format("%y%m").to_string() == b.format("%y%m").to_string();
        prop_assert_eq!(period_of(a) == period_of(b), same_scope);
    }

    /// Initials derivation never emits lowercase or whitespace.
    #[test]
    fn prop_initials_are_clean(name in "[A-Za-z]{1,8}( [A-Za-z]{1,8}){0,3}") {
        let initials = company_initials(&name).unwrap();
        prop_assert!(!initials.is_empty());
        prop_assert!(initials.chars().all(|c| c.is_ascii_uppercase()));
    }
}
