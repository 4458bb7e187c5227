use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "application/pdf" => Some("pdf"),
        "application/msword" => Some("doc"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("docx"),
        _ => None,
    }
}

#[derive(Debug)]
pub struct StoredResume {
    pub url: String,
    pub key: String,
}

/// Upload a résumé to the blob store. Content type and size are checked
/// before the store is touched.
pub async fn store_resume(
    st: &AppState,
    applicant_id: Uuid,
    body: Bytes,
    content_type: &str,
) -> Result<StoredResume, ApiError> {
    let ext = ext_from_mime(content_type).ok_or_else(|| {
        ApiError::unsupported_media_type(
            "Invalid file type. Only PDF and Word documents are allowed.",
        )
    })?;
    if body.len() > MAX_RESUME_BYTES {
        return Err(ApiError::payload_too_large("Resume file exceeds the 5MB limit"));
    }

    let key = format!("resumes/{}/{}.{}", applicant_id, Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, body, content_type)
        .await
        .map_err(ApiError::Internal)?;
    let url = st.storage.object_url(&key);
    Ok(StoredResume { url, key })
}

/// Cleanup step, not part of any contract: failures are logged and
/// swallowed so they never mask the primary outcome.
pub async fn delete_resume_best_effort(st: &AppState, key: &str) {
    if let Err(e) = st.storage.delete_object(key).await {
        warn!(error = %e, key, "resume cleanup failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(super::ext_from_mime("application/pdf"), Some("pdf"));
        assert_eq!(super::ext_from_mime("application/msword"), Some("doc"));
        assert_eq!(
            super::ext_from_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some("docx")
        );
        assert_eq!(super::ext_from_mime("image/png"), None);
        assert_eq!(super::ext_from_mime("application/octet-stream"), None);
    }

    #[tokio::test]
    async fn store_resume_rejects_unknown_content_type() {
        let state = AppState::fake();
        let err = store_resume(
            &state,
            Uuid::new_v4(),
            Bytes::from_static(b"plain text"),
            "text/plain",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn store_resume_rejects_oversized_payload() {
        let state = AppState::fake();
        let body = Bytes::from(vec![0u8; MAX_RESUME_BYTES + 1]);
        let err = store_resume(&state, Uuid::new_v4(), body, "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn store_resume_returns_url_and_deletion_key() {
        let state = AppState::fake();
        let applicant = Uuid::new_v4();
        let stored = store_resume(
            &state,
            applicant,
            Bytes::from_static(b"%PDF-1.7"),
            "application/pdf",
        )
        .await
        .unwrap();
        assert!(stored.key.starts_with(&format!("resumes/{applicant}/")));
        assert!(stored.key.ends_with(".pdf"));
        assert!(stored.url.contains(&stored.key));
    }
}
