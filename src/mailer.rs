use axum::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::error;

use crate::applications::repo::ApplicationStatus;
use crate::auth::repo::User;
use crate::config::SmtpConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)?
            .port(cfg.port)
            .credentials(Credentials::new(
                cfg.username.clone(),
                cfg.password.clone(),
            ))
            .build();
        let from = cfg.from.parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;
        self.transport.send(message).await?;
        Ok(())
    }
}

fn new_application_email(
    employer_name: &str,
    job_title: &str,
    applicant_name: &str,
) -> (String, String) {
    let subject = format!("New Application for {job_title}");
    let html = format!(
        "<h1>New Job Application Received</h1>\
         <p>Hello {employer_name},</p>\
         <p>{applicant_name} has applied for the position of {job_title}.</p>\
         <p>You can review the application in your dashboard.</p>"
    );
    (subject, html)
}

fn status_update_email(
    applicant_name: &str,
    job_title: &str,
    status: ApplicationStatus,
) -> (String, String) {
    let subject = format!("Application Status Update - {job_title}");
    let html = format!(
        "<h1>Your Application Status Has Been Updated</h1>\
         <p>Hello {applicant_name},</p>\
         <p>Your application for {job_title} has been {status}.</p>\
         <p>You can check the details in your applications dashboard.</p>"
    );
    (subject, html)
}

/// Tell the employer a new application arrived. The caller persists state
/// before invoking this and never rolls back on failure.
pub async fn notify_new_application(
    mailer: &dyn Mailer,
    employer: &User,
    job_title: &str,
    applicant_name: &str,
) -> anyhow::Result<()> {
    let (subject, html) = new_application_email(&employer.full_name, job_title, applicant_name);
    mailer
        .send(&employer.email, &subject, &html)
        .await
        .map_err(|e| {
            error!(error = %e, employer = %employer.email, "application notification failed");
            e
        })
}

/// Tell the applicant their application status changed.
pub async fn notify_status_change(
    mailer: &dyn Mailer,
    applicant: &User,
    job_title: &str,
    status: ApplicationStatus,
) -> anyhow::Result<()> {
    let (subject, html) = status_update_email(&applicant.full_name, job_title, status);
    mailer
        .send(&applicant.email, &subject, &html)
        .await
        .map_err(|e| {
            error!(error = %e, applicant = %applicant.email, "status notification failed");
            e
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::UserRole;
    use std::sync::Mutex;
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.into(), subject.into(), html.into()));
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _to: &str, _subject: &str, _html: &str) -> anyhow::Result<()> {
            anyhow::bail!("smtp connection refused")
        }
    }

    fn user(email: &str, name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: "hash".into(),
            full_name: name.into(),
            role: UserRole::Employer,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn new_application_template_mentions_all_parties() {
        let (subject, html) = new_application_email("Acme HR", "Backend Engineer", "Jane Doe");
        assert_eq!(subject, "New Application for Backend Engineer");
        assert!(html.contains("Hello Acme HR,"));
        assert!(html.contains("Jane Doe has applied for the position of Backend Engineer."));
    }

    #[test]
    fn status_update_template_spells_out_the_status() {
        let (subject, html) =
            status_update_email("Jane Doe", "Backend Engineer", ApplicationStatus::Accepted);
        assert_eq!(subject, "Application Status Update - Backend Engineer");
        assert!(html.contains("has been accepted."));
    }

    #[tokio::test]
    async fn notify_new_application_goes_to_the_employer() {
        let mailer = RecordingMailer {
            sent: Mutex::new(Vec::new()),
        };
        let employer = user("hr@acme.test", "Acme HR");
        notify_new_application(&mailer, &employer, "Backend Engineer", "Jane Doe")
            .await
            .unwrap();
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "hr@acme.test");
    }

    #[tokio::test]
    async fn notify_failure_propagates_to_the_caller() {
        let applicant = user("jane@doe.test", "Jane Doe");
        let err = notify_status_change(
            &FailingMailer,
            &applicant,
            "Backend Engineer",
            ApplicationStatus::Rejected,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("smtp"));
    }
}
