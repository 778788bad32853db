use async_trait::async_trait;
use resend_rs::{Resend, types::CreateEmailBaseOptions};
use tracing::{error, info};

/// Identifier placed in the X-Mailer header of outgoing reports.
pub const MAILER_IDENT: &str = concat!("harvest-blame/", env!("CARGO_PKG_VERSION"));

/// A fully-resolved outbound message: recipients, subject and rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Narrow seam to the mail service. The run treats a send as a boolean
/// outcome; failures are logged by the caller, never raised.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, envelope: &Envelope) -> anyhow::Result<()>;
}

/// Production transport backed by Resend.
pub struct ResendMailer {
    resend: Resend,
}

impl ResendMailer {
    pub fn new(api_key: &str) -> Self {
        Self {
            resend: Resend::new(api_key),
        }
    }
}

impl Default for ResendMailer {
    /// Reads the API key from the RESEND_API_KEY environment variable.
    fn default() -> Self {
        Self {
            resend: Resend::default(),
        }
    }
}

#[async_trait]
impl MailTransport for ResendMailer {
    async fn send(&self, envelope: &Envelope) -> anyhow::Result<()> {
        info!("Preparing to send email with subject: {}", envelope.subject);

        let mut email = CreateEmailBaseOptions::new(
            envelope.from.as_str(),
            [envelope.to.as_str()],
            envelope.subject.as_str(),
        )
        .with_html(&envelope.html)
        .with_header("X-Mailer", MAILER_IDENT);

        for cc in &envelope.cc {
            email = email.with_cc(cc.as_str());
        }

        let result = self.resend.emails.send(email).await;
        match &result {
            Ok(response) => info!("Email sent successfully with ID: {}", response.id),
            Err(e) => error!("Failed to send email: {}", e),
        }

        result.map(|_| ()).map_err(Into::into)
    }
}
