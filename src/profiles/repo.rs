use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::ProfilePayload;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub linkedin: Option<String>,
}

/// One per user, keyed on the owning user id.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub contact_info: Json<ContactInfo>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const PROFILE_COLUMNS: &str =
    "user_id, bio, skills, experience, education, contact_info, created_at, updated_at";

impl Profile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<Profile>> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"#
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Create-or-replace: omitted optional fields are written as NULL, not
    /// merged with what was stored before.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        payload: &ProfilePayload,
    ) -> sqlx::Result<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (user_id, bio, skills, experience, education, contact_info)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
            SET bio = EXCLUDED.bio, skills = EXCLUDED.skills,
                experience = EXCLUDED.experience, education = EXCLUDED.education,
                contact_info = EXCLUDED.contact_info, updated_at = now()
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&payload.bio)
        .bind(&payload.skills)
        .bind(&payload.experience)
        .bind(&payload.education)
        .bind(Json(ContactInfo::from(&payload.contact_info)))
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_info_serializes_inline() {
        let profile = Profile {
            user_id: Uuid::new_v4(),
            bio: Some("Rust developer".into()),
            skills: vec!["Rust".into(), "SQL".into()],
            experience: None,
            education: None,
            contact_info: Json(ContactInfo {
                phone: Some("+1 555 010 0200".into()),
                address: None,
                linkedin: Some("https://linkedin.com/in/jane".into()),
            }),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains(r#""contact_info":{"#));
        assert!(json.contains("linkedin.com/in/jane"));
    }
}
