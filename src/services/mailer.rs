// ============================================================================
// MAILER - envoi des emails de vérification
// ============================================================================
//
// Description:
//   Trait Mailer + deux implémentations:
//   - SmtpMailer : SMTP authentifié (lettre), utilisé si EMAIL_USER/EMAIL_PASS
//   - LogMailer : écrit le lien dans les logs (dev sans SMTP)
//
// Points d'attention:
//   - L'inscription n'échoue JAMAIS à cause de l'email: l'appelant logge
//     l'erreur et continue (pas de renvoi automatique)
//
// ============================================================================

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Email envoyé après l'inscription
pub fn verification_mail(to: &str, verification_url: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: "DocVCS: Verify your email".to_string(),
        html: format!(
            "<p>Click <a href=\"{}\">here</a> to verify your email.</p>",
            verification_url
        ),
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = config.username.parse()?;
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .credentials(credentials)
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to.parse()?)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html)?;

        self.transport.send(message).await?;
        tracing::debug!(to = %mail.to, "verification email sent");
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, body = %mail.html, "SMTP not configured, email not sent");
        Ok(())
    }
}
