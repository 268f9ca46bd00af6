use lettre::{
    message::{Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

use crate::configuration::EmailSettings;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("Failed to send email: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("Email worker failed")]
    Blocking,
}

/// Rendered message, ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// SMTP sender shared by every request. When delivery is disabled in the
/// configuration, messages are logged and dropped.
#[derive(Clone)]
pub struct EmailClient {
    transport: Option<SmtpTransport>,
    sender: String,
    app_url: String,
}

impl std::fmt::Debug for EmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailClient")
            .field("enabled", &self.transport.is_some())
            .field("sender", &self.sender)
            .finish()
    }
}

impl EmailClient {
    pub fn new(settings: &EmailSettings, app_url: &str) -> Result<Self, EmailError> {
        settings.sender.parse::<Mailbox>()?;
        let transport = if settings.enabled {
            let creds = Credentials::new(settings.user_name.clone(), settings.password.clone());
            Some(
                SmtpTransport::starttls_relay(&settings.smtp_host)?
                    .port(settings.smtp_port)
                    .credentials(creds)
                    .build(),
            )
        } else {
            tracing::info!("Email delivery disabled, messages will only be logged");
            None
        };
        Ok(EmailClient {
            transport,
            sender: settings.sender.clone(),
            app_url: app_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client that never talks to an SMTP server.
    pub fn disabled(app_url: &str) -> Self {
        EmailClient {
            transport: None,
            sender: "Movie Platform <noreply@movieplatform.com>".to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn verification_url(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.app_url, token)
    }

    pub fn reset_url(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.app_url, token)
    }

    pub fn movie_url(&self, movie_id: &str) -> String {
        format!("{}/movies/{}", self.app_url, movie_id)
    }

    pub async fn send(&self, to: &str, content: EmailContent) -> Result<(), EmailError> {
        let transport = match &self.transport {
            Some(transport) => transport.clone(),
            None => {
                tracing::info!("Email delivery disabled, skipping \"{}\" to {}", content.subject, to);
                return Ok(());
            }
        };
        let message = Message::builder()
            .from(self.sender.parse::<Mailbox>()?)
            .to(to.parse::<Mailbox>()?)
            .subject(content.subject.as_str())
            .multipart(MultiPart::alternative().singlepart(SinglePart::html(content.html)))?;

        let recipient = to.to_string();
        let result = actix_web::web::block(move || transport.send(&message))
            .await
            .map_err(|_| EmailError::Blocking)?;
        match result {
            Ok(_) => {
                tracing::info!("Email sent to {} successfully!", recipient);
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to send email {:#?}", err);
                Err(EmailError::Transport(err))
            }
        }
    }
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"></head>
<body>
    <h1>{}</h1>
    {}
    <p>Movie Platform</p>
</body>
</html>"##,
        heading, body
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn welcome_email(name: &str, verification_url: &str) -> EmailContent {
    EmailContent {
        subject: "Welcome to Movie Platform!".to_string(),
        html: layout(
            &format!("Welcome, {}!", escape_html(name)),
            &format!(
                r#"<p>Thanks for joining. Please confirm your email address within 24 hours:</p>
    <p><a href="{0}">{0}</a></p>"#,
                escape_html(verification_url)
            ),
        ),
    }
}

pub fn password_reset_email(name: &str, reset_url: &str) -> EmailContent {
    EmailContent {
        subject: "Reset Your Password".to_string(),
        html: layout(
            "Reset your password?",
            &format!(
                r#"<p>Hello {0},</p>
    <p>We received a request to reset your password. The link below is valid for 1 hour. If you did not ask for it, ignore this email.</p>
    <p><a href="{1}">{1}</a></p>"#,
                escape_html(name),
                escape_html(reset_url)
            ),
        ),
    }
}

pub fn new_movie_email(name: &str, title_english: &str, title_arabic: &str, movie_url: &str) -> EmailContent {
    EmailContent {
        subject: format!("New movie: {}", title_english),
        html: layout(
            &format!("{} / {}", escape_html(title_english), escape_html(title_arabic)),
            &format!(
                r#"<p>Hello {0},</p>
    <p>A new movie was just added to the catalog.</p>
    <p><a href="{1}">{1}</a></p>"#,
                escape_html(name),
                escape_html(movie_url)
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_email_carries_the_verification_link() {
        let client = EmailClient::disabled("http://localhost:3000/");
        let url = client.verification_url("abc.def");
        assert_eq!(url, "http://localhost:3000/verify-email?token=abc.def");
        let content = welcome_email("Sara", &url);
        assert_eq!(content.subject, "Welcome to Movie Platform!");
        assert!(content.html.contains(&url));
        assert!(content.html.contains("Welcome, Sara!"));
    }

    #[test]
    fn user_supplied_names_are_escaped() {
        let content = password_reset_email("<script>", "http://x/reset-password?token=t");
        assert!(!content.html.contains("<script>"));
        assert!(content.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn new_movie_subject_names_the_movie() {
        let content = new_movie_email("Omar", "Inception", "استهلال", "http://x/movies/1");
        assert_eq!(content.subject, "New movie: Inception");
        assert!(content.html.contains("استهلال"));
    }

    #[actix_rt::test]
    async fn disabled_client_drops_messages() {
        let client = EmailClient::disabled("http://localhost:3000");
        let result = client
            .send("someone@example.com", welcome_email("someone", "http://x"))
            .await;
        assert!(result.is_ok());
    }
}
