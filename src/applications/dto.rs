use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::jobs::JobStatus;

use super::repo::{ApplicationApplicantRow, ApplicationJobRow, ApplicationStatus};

#[derive(Debug, Deserialize)]
pub struct StatusUpdateBody {
    pub status: ApplicationStatus,
}

/// Listing data embedded in the applicant's own application list.
#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub status: JobStatus,
}

#[derive(Debug, Serialize)]
pub struct ApplicationWithJob {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub resume_url: String,
    pub cover_letter: Option<String>,
    pub created_at: OffsetDateTime,
    pub job: JobSummary,
}

impl From<ApplicationJobRow> for ApplicationWithJob {
    fn from(row: ApplicationJobRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            resume_url: row.resume_url,
            cover_letter: row.cover_letter,
            created_at: row.created_at,
            job: JobSummary {
                id: row.job_id,
                title: row.job_title,
                company: row.job_company,
                location: row.job_location,
                status: row.job_status,
            },
        }
    }
}

/// Applicant data embedded in the employer's per-job view.
#[derive(Debug, Serialize)]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationWithApplicant {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub resume_url: String,
    pub cover_letter: Option<String>,
    pub created_at: OffsetDateTime,
    pub applicant: ApplicantSummary,
}

impl From<ApplicationApplicantRow> for ApplicationWithApplicant {
    fn from(row: ApplicationApplicantRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            resume_url: row.resume_url,
            cover_letter: row.cover_letter,
            created_at: row.created_at,
            applicant: ApplicantSummary {
                id: row.applicant_id,
                full_name: row.applicant_name,
                email: row.applicant_email,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_with_job_nests_the_listing() {
        let row = ApplicationJobRow {
            id: Uuid::new_v4(),
            status: ApplicationStatus::Pending,
            resume_url: "https://files.local/resumes/x.pdf".into(),
            cover_letter: Some("Hello".into()),
            created_at: OffsetDateTime::now_utc(),
            job_id: Uuid::new_v4(),
            job_title: "Backend Engineer".into(),
            job_company: "Acme".into(),
            job_location: "Remote".into(),
            job_status: JobStatus::Open,
        };
        let dto: ApplicationWithJob = row.into();
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.contains(r#""status":"pending""#));
        assert!(json.contains(r#""title":"Backend Engineer""#));
        assert!(json.contains(r#""job":"#));
    }
}
