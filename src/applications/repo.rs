use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::jobs::JobStatus;

/// `pending` is the entry state; the other three are set by the employer.
/// Transitions are deliberately unrestricted beyond enum membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub resume_url: String,
    /// Blob-store deletion handle, internal only.
    #[serde(skip_serializing)]
    pub resume_key: String,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const APP_COLUMNS: &str =
    "id, job_id, applicant_id, resume_url, resume_key, cover_letter, status, created_at, updated_at";

impl JobApplication {
    pub async fn insert(
        db: &PgPool,
        job_id: Uuid,
        applicant_id: Uuid,
        resume_url: &str,
        resume_key: &str,
        cover_letter: Option<&str>,
    ) -> sqlx::Result<JobApplication> {
        sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            INSERT INTO job_applications (job_id, applicant_id, resume_url, resume_key, cover_letter)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {APP_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(applicant_id)
        .bind(resume_url)
        .bind(resume_key)
        .bind(cover_letter)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<JobApplication>> {
        sqlx::query_as::<_, JobApplication>(&format!(
            r#"SELECT {APP_COLUMNS} FROM job_applications WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_job_and_applicant(
        db: &PgPool,
        job_id: Uuid,
        applicant_id: Uuid,
    ) -> sqlx::Result<Option<JobApplication>> {
        sqlx::query_as::<_, JobApplication>(&format!(
            r#"SELECT {APP_COLUMNS} FROM job_applications WHERE job_id = $1 AND applicant_id = $2"#
        ))
        .bind(job_id)
        .bind(applicant_id)
        .fetch_optional(db)
        .await
    }

    /// Ownership folded into the lookup; non-owners get nothing back.
    pub async fn find_owned(
        db: &PgPool,
        id: Uuid,
        applicant_id: Uuid,
    ) -> sqlx::Result<Option<JobApplication>> {
        sqlx::query_as::<_, JobApplication>(&format!(
            r#"SELECT {APP_COLUMNS} FROM job_applications WHERE id = $1 AND applicant_id = $2"#
        ))
        .bind(id)
        .bind(applicant_id)
        .fetch_optional(db)
        .await
    }

    pub async fn set_status(
        db: &PgPool,
        id: Uuid,
        status: ApplicationStatus,
    ) -> sqlx::Result<JobApplication> {
        sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            UPDATE job_applications
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {APP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query(r#"DELETE FROM job_applications WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

/// Application joined with its listing, for the applicant's own list.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationJobRow {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub resume_url: String,
    pub cover_letter: Option<String>,
    pub created_at: OffsetDateTime,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_company: String,
    pub job_location: String,
    pub job_status: JobStatus,
}

pub async fn list_by_applicant(
    db: &PgPool,
    applicant_id: Uuid,
) -> sqlx::Result<Vec<ApplicationJobRow>> {
    sqlx::query_as::<_, ApplicationJobRow>(
        r#"
        SELECT a.id, a.status, a.resume_url, a.cover_letter, a.created_at,
               j.id AS job_id, j.title AS job_title, j.company AS job_company,
               j.location AS job_location, j.status AS job_status
        FROM job_applications a
        JOIN job_listings j ON j.id = a.job_id
        WHERE a.applicant_id = $1
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(applicant_id)
    .fetch_all(db)
    .await
}

/// Application joined with its applicant, for the employer's per-job view.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationApplicantRow {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub resume_url: String,
    pub cover_letter: Option<String>,
    pub created_at: OffsetDateTime,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
}

pub async fn list_for_job(db: &PgPool, job_id: Uuid) -> sqlx::Result<Vec<ApplicationApplicantRow>> {
    sqlx::query_as::<_, ApplicationApplicantRow>(
        r#"
        SELECT a.id, a.status, a.resume_url, a.cover_letter, a.created_at,
               u.id AS applicant_id, u.full_name AS applicant_name, u.email AS applicant_email
        FROM job_applications a
        JOIN users u ON u.id = a.applicant_id
        WHERE a.job_id = $1
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(job_id)
    .fetch_all(db)
    .await
}
