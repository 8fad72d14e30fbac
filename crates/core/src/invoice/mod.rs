//! Invoice number derivation and status rules.
//!
//! Invoice numbers follow `<Initials><YY>-<MM><NNNN>`: the company's
//! initials, a two-digit year, a two-digit month, and a four-digit
//! zero-padded sequence that starts at `0000` and resets whenever the
//! month prefix changes. Allocation itself (the per-scope counter) lives
//! in the database layer; this module owns the pure derivation.

pub mod error;
pub mod number;
pub mod status;

#[cfg(test)]
mod number_props;

pub use error::InvoiceError;
pub use number::{company_initials, compose_invoice_no, parse_invoice_no, period_of};
pub use status::InvoiceStatus;
