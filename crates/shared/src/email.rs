//! Invoice email dispatch.
//!
//! Uses `lettre` for SMTP transport. Sending is fire-and-forget from the
//! caller's point of view: a committed sale never rolls back because the
//! mail could not be delivered.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        Ok(transport)
    }

    /// Sends an invoice notification to a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or sent.
    pub async fn send_invoice_email(
        &self,
        to: &str,
        invoice_no: &str,
        total: Decimal,
    ) -> Result<(), EmailError> {
        let from = self
            .config
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(self.config.from_address.clone()))?;
        let to_addr = to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(to.to_string()))?;

        let body = format!(
            "Thank you for your purchase.\n\n\
             Invoice: {invoice_no}\n\
             Total: {total}\n\n\
             Please keep this invoice number for your records.",
        );

        let message = Message::builder()
            .from(from)
            .to(to_addr)
            .subject(format!("Invoice {invoice_no}"))
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        let transport = self.create_transport()?;
        transport
            .send(message)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "user".to_string(),
            smtp_password: "pass".to_string(),
            from_address: "invoices@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let service = EmailService::new(config());
        let result = service
            .send_invoice_email("not an address", "AS26-070000", dec!(1500))
            .await;
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }
}
