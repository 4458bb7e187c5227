use anyhow::anyhow;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::auth::{Session, User, UserRole};
use crate::error::ApiError;
use crate::jobs::JobListing;
use crate::mailer::{notify_new_application, notify_status_change};
use crate::state::AppState;
use crate::uploads::{self, StoredResume};

use super::repo::{ApplicationStatus, JobApplication};

/// Everything a submission carries, parsed out of the multipart body before
/// the workflow runs.
pub struct SubmitApplication {
    pub job_id: Uuid,
    pub cover_letter: Option<String>,
    /// File bytes plus declared content type.
    pub resume: Option<(Bytes, String)>,
}

/// Submission protocol. The résumé is uploaded first; every failure after
/// that point deletes it again before surfacing. Once the row is committed
/// only the notification can fail, and that failure is surfaced without
/// rolling anything back.
pub async fn submit_application(
    st: &AppState,
    applicant_id: Uuid,
    input: SubmitApplication,
) -> Result<JobApplication, ApiError> {
    let Some((file, content_type)) = input.resume.clone() else {
        return Err(ApiError::bad_request("Resume file is required"));
    };
    if let Some(cover) = input.cover_letter.as_deref() {
        if cover.chars().count() > 5000 {
            return Err(ApiError::bad_request(
                "Cover letter must not exceed 5000 characters",
            ));
        }
    }

    let stored = uploads::store_resume(st, applicant_id, file, &content_type).await?;

    let (application, job, applicant) =
        match persist_application(st, applicant_id, &input, &stored).await {
            Ok(parts) => parts,
            Err(e) => {
                uploads::delete_resume_best_effort(st, &stored.key).await;
                return Err(e);
            }
        };

    let employer = User::find_by_id(&st.db, job.employer_id)
        .await?
        .ok_or_else(|| {
            ApiError::Internal(anyhow!(
                "employer {} missing for listing {}",
                job.employer_id,
                job.id
            ))
        })?;
    notify_new_application(
        st.mailer.as_ref(),
        &employer,
        &job.title,
        &applicant.full_name,
    )
    .await
    .map_err(ApiError::Internal)?;

    info!(application_id = %application.id, job_id = %job.id, %applicant_id, "application submitted");
    Ok(application)
}

async fn persist_application(
    st: &AppState,
    applicant_id: Uuid,
    input: &SubmitApplication,
    stored: &StoredResume,
) -> Result<(JobApplication, JobListing, User), ApiError> {
    let job = JobListing::find_open(&st.db, input.job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found or closed"))?;

    // Pre-check gives the friendly 400; the unique index on
    // (job_id, applicant_id) catches whatever races past it.
    if JobApplication::find_by_job_and_applicant(&st.db, input.job_id, applicant_id)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("Already applied to this job"));
    }

    let applicant = User::find_by_id(&st.db, applicant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Applicant not found"))?;

    let application = JobApplication::insert(
        &st.db,
        input.job_id,
        applicant_id,
        &stored.url,
        &stored.key,
        input.cover_letter.as_deref(),
    )
    .await?;

    Ok((application, job, applicant))
}

/// Status-update protocol. The caller must own the listing the application
/// targets; the new status is written as supplied, with no transition table.
pub async fn update_status(
    st: &AppState,
    employer_id: Uuid,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<JobApplication, ApiError> {
    let application = JobApplication::find_by_id(&st.db, application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let job = JobListing::find_by_id(&st.db, application.job_id)
        .await?
        .ok_or_else(|| {
            ApiError::Internal(anyhow!(
                "listing {} missing for application {}",
                application.job_id,
                application.id
            ))
        })?;
    if job.employer_id != employer_id {
        return Err(ApiError::forbidden("Not authorized"));
    }

    let updated = JobApplication::set_status(&st.db, application_id, status).await?;

    let applicant = User::find_by_id(&st.db, application.applicant_id)
        .await?
        .ok_or_else(|| {
            ApiError::Internal(anyhow!(
                "applicant {} missing for application {}",
                application.applicant_id,
                application.id
            ))
        })?;
    notify_status_change(st.mailer.as_ref(), &applicant, &job.title, status)
        .await
        .map_err(ApiError::Internal)?;

    info!(application_id = %application_id, %status, "application status updated");
    Ok(updated)
}

/// Withdrawal: only the applicant finds their own row; the résumé delete is
/// cleanup, the row delete is the contract.
pub async fn withdraw(st: &AppState, user_id: Uuid, application_id: Uuid) -> Result<(), ApiError> {
    let application = JobApplication::find_owned(&st.db, application_id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    uploads::delete_resume_best_effort(st, &application.resume_key).await;
    JobApplication::delete(&st.db, application_id).await?;

    info!(application_id = %application_id, %user_id, "application withdrawn");
    Ok(())
}

/// Short-lived download link for a stored résumé. Visible to the applicant
/// and to the employer owning the listing; everyone else sees NotFound.
pub async fn resume_download_url(
    st: &AppState,
    session: &Session,
    application_id: Uuid,
) -> Result<String, ApiError> {
    let application = JobApplication::find_by_id(&st.db, application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let authorized = application.applicant_id == session.user_id
        || (session.role == UserRole::Employer
            && JobListing::find_owned(&st.db, application.job_id, session.user_id)
                .await?
                .is_some());
    if !authorized {
        return Err(ApiError::not_found("Application not found"));
    }

    st.storage
        .presign_get(&application.resume_key, 600)
        .await
        .map_err(ApiError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::Mailer;
    use crate::storage::StorageClient;
    use axum::async_trait;
    use std::sync::Arc;

    /// Storage that fails the test if the workflow ever touches it.
    struct UnreachableStorage;

    #[async_trait]
    impl StorageClient for UnreachableStorage {
        async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            panic!("blob store must not be called");
        }
        async fn delete_object(&self, _k: &str) -> anyhow::Result<()> {
            panic!("blob store must not be called");
        }
        async fn presign_get(&self, _k: &str, _s: u64) -> anyhow::Result<String> {
            panic!("blob store must not be called");
        }
        fn object_url(&self, k: &str) -> String {
            format!("https://unreachable.local/{k}")
        }
    }

    struct UnreachableMailer;

    #[async_trait]
    impl Mailer for UnreachableMailer {
        async fn send(&self, _to: &str, _subject: &str, _html: &str) -> anyhow::Result<()> {
            panic!("mailer must not be called");
        }
    }

    fn guarded_state() -> AppState {
        let base = AppState::fake();
        AppState::from_parts(
            base.db.clone(),
            base.config.clone(),
            Arc::new(UnreachableStorage),
            Arc::new(UnreachableMailer),
        )
    }

    #[tokio::test]
    async fn submission_without_a_resume_never_reaches_the_blob_store() {
        let st = guarded_state();
        let err = submit_application(
            &st,
            Uuid::new_v4(),
            SubmitApplication {
                job_id: Uuid::new_v4(),
                cover_letter: None,
                resume: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn oversized_cover_letter_is_rejected_before_upload() {
        let st = guarded_state();
        let err = submit_application(
            &st,
            Uuid::new_v4(),
            SubmitApplication {
                job_id: Uuid::new_v4(),
                cover_letter: Some("x".repeat(5001)),
                resume: Some((Bytes::from_static(b"%PDF-1.7"), "application/pdf".into())),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unsupported_resume_type_is_rejected_before_upload() {
        let st = guarded_state();
        let err = submit_application(
            &st,
            Uuid::new_v4(),
            SubmitApplication {
                job_id: Uuid::new_v4(),
                cover_letter: None,
                resume: Some((Bytes::from_static(b"GIF89a"), "image/gif".into())),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMediaType(_)));
    }
}
