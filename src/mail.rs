//! Outbound mail — SMTP via lettre.
//!
//! The HTTP layer talks to a `Mailer` trait so dispatch can be exercised
//! in tests without a live SMTP relay. `SmtpMailer` is the production
//! transport; the composer renders the dispatch email for a routed
//! submission.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::error::MailError;
use crate::store::NewSubmission;

// ── Configuration ───────────────────────────────────────────────────

/// SMTP configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
    /// Inbox that receives routed submissions.
    pub recipient: String,
}

impl MailConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SMTP_HOST` is not set (mail disabled).
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;

        let smtp_port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = SecretString::from(std::env::var("SMTP_PASSWORD").unwrap_or_default());
        let from_address = std::env::var("MAIL_FROM").unwrap_or_else(|_| username.clone());
        let recipient = std::env::var("MAIL_RECIPIENT").unwrap_or_else(|_| username.clone());

        Some(Self {
            smtp_host,
            smtp_port,
            username,
            password,
            from_address,
            recipient,
        })
    }
}

// ── Outbound mail ───────────────────────────────────────────────────

/// A composed email, ready for a transport.
#[derive(Debug, Clone)]
pub struct OutboundMail {
    /// Submitter's address, so staff can reply directly.
    pub reply_to: String,
    pub subject: String,
    pub html_body: String,
}

/// Transport seam for outbound mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError>;
}

// ── SMTP transport ──────────────────────────────────────────────────

/// Production mailer: lettre's blocking SMTP transport, run on the
/// blocking pool.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        let config = self.config.clone();
        let mail = mail.clone();
        tokio::task::spawn_blocking(move || send_smtp(&config, &mail))
            .await
            .map_err(|e| MailError::Send(format!("send task panicked: {e}")))?
    }
}

fn send_smtp(config: &MailConfig, mail: &OutboundMail) -> Result<(), MailError> {
    let creds = Credentials::new(
        config.username.clone(),
        config.password.expose_secret().to_string(),
    );

    let transport = SmtpTransport::relay(&config.smtp_host)
        .map_err(|e| MailError::Send(format!("SMTP relay error: {e}")))?
        .port(config.smtp_port)
        .credentials(creds)
        .build();

    let message = Message::builder()
        .from(parse_mailbox(&config.from_address)?)
        .reply_to(parse_mailbox(&mail.reply_to)?)
        .to(parse_mailbox(&config.recipient)?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(mail.html_body.clone())
        .map_err(|e| MailError::Build(e.to_string()))?;

    transport
        .send(&message)
        .map_err(|e| MailError::Send(e.to_string()))?;

    info!(subject = %mail.subject, "Dispatch email sent");
    Ok(())
}

fn parse_mailbox(addr: &str) -> Result<Mailbox, MailError> {
    addr.parse()
        .map_err(|_| MailError::Address(addr.to_string()))
}

/// Stand-in when SMTP is unconfigured: every dispatch fails, and the
/// handler reports the failure the same way as a transport error.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _mail: &OutboundMail) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}

// ── Test transports (public for integration tests) ──────────────────

/// Captures sent mail instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<OutboundMail>>,
}

impl RecordingMailer {
    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Always fails, for exercising the dispatch-failure path.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: &OutboundMail) -> Result<(), MailError> {
        Err(MailError::Send("simulated transport failure".into()))
    }
}

// ── Composition ─────────────────────────────────────────────────────

/// Render the dispatch email for a routed submission.
///
/// Subject names the receiving entity; the body lists the submitted
/// fields followed by the routing outcome. User-supplied values are
/// HTML-escaped.
pub fn compose_contact_email(submission: &NewSubmission) -> OutboundMail {
    let subject = format!("New Contact - {}", submission.routed_to);

    let html_body = format!(
        "<h2>New Inquiry</h2>\n\
         <p><b>Name:</b> {name}</p>\n\
         <p><b>Email:</b> {email}</p>\n\
         <p><b>Organisation:</b> {organisation}</p>\n\
         <p><b>Category:</b> {category}</p>\n\
         <p><b>Stakeholder:</b> {stakeholder}</p>\n\
         <p><b>Domain:</b> {domain}</p>\n\
         <p><b>Complexity:</b> {complexity}</p>\n\
         <hr/>\n\
         <p><b>Message:</b></p>\n\
         <p>{message}</p>\n\
         <hr/>\n\
         <p><b>Routed To:</b> {routed_to}</p>\n\
         <p><b>Reason:</b> {reason}</p>",
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        organisation = escape_opt(&submission.organisation),
        category = escape_opt(&submission.category),
        stakeholder = escape_opt(&submission.stakeholder),
        domain = escape_opt(&submission.domain),
        complexity = escape_opt(&submission.complexity),
        message = escape_html(&submission.message),
        routed_to = escape_html(&submission.routed_to),
        reason = escape_html(&submission.routing_reason),
    );

    OutboundMail {
        reply_to: submission.email.clone(),
        subject,
        html_body,
    }
}

/// Escape text for embedding in the HTML body.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_opt(value: &Option<String>) -> String {
    value.as_deref().map(escape_html).unwrap_or_default()
}

// ── Tests ───────────────────────────────────────────────────────────
