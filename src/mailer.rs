use async_trait::async_trait;
use tracing::info;

/// Outgoing mail used by the signup flow.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation(&self, email: &str, username: &str, link: &str) -> anyhow::Result<()>;
}

/// Writes the confirmation link to the log instead of delivering it.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation(&self, email: &str, username: &str, link: &str) -> anyhow::Result<()> {
        info!(%email, %username, %link, "confirmation email");
        Ok(())
    }
}

pub fn confirmation_link(base_url: &str, token: &str) -> String {
    format!("{}/api/auth/confirmed_email/{}", base_url.trim_end_matches('/'), token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_link_joins_without_double_slash() {
        assert_eq!(
            confirmation_link("http://localhost:8080/", "abc.def"),
            "http://localhost:8080/api/auth/confirmed_email/abc.def"
        );
    }

    #[tokio::test]
    async fn log_mailer_never_fails() {
        LogMailer
            .send_confirmation("a@x.com", "annlee", "http://x/confirm")
            .await
            .expect("log mailer");
    }
}
