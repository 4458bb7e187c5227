use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{JobPayload, JobSearchParams, JobStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobListing {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary_range: String,
    pub location: String,
    pub employer_id: Uuid,
    pub status: JobStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const JOB_COLUMNS: &str = "id, title, company, description, requirements, salary_range, \
                           location, employer_id, status, created_at, updated_at";

// Numeric bounds parsed out of the salary_range text, e.g.
// "$100,000 - $130,000" -> 100000 / 130000. A single value is both bounds.
const SALARY_LOWER: &str =
    "NULLIF(regexp_replace(split_part(salary_range, '-', 1), '[^0-9]', '', 'g'), '')::BIGINT";
const SALARY_UPPER: &str = "NULLIF(regexp_replace(CASE WHEN position('-' in salary_range) > 0 \
     THEN split_part(salary_range, '-', 2) ELSE salary_range END, '[^0-9]', '', 'g'), '')::BIGINT";

fn push_search_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &JobSearchParams) {
    qb.push(" WHERE status = 'open'");

    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        qb.push(" AND (title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR company ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if let Some(location) = params.location.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND location ILIKE ");
        qb.push_bind(format!("%{location}%"));
    }

    // A listing qualifies when its advertised range overlaps the requested
    // bounds.
    if let Some(min) = params.salary_min {
        qb.push(" AND ");
        qb.push(SALARY_UPPER);
        qb.push(" >= ");
        qb.push_bind(min);
    }
    if let Some(max) = params.salary_max {
        qb.push(" AND ");
        qb.push(SALARY_LOWER);
        qb.push(" <= ");
        qb.push_bind(max);
    }
}

impl JobListing {
    pub async fn create(
        db: &PgPool,
        employer_id: Uuid,
        payload: &JobPayload,
    ) -> sqlx::Result<JobListing> {
        sqlx::query_as::<_, JobListing>(&format!(
            r#"
            INSERT INTO job_listings
                (title, company, description, requirements, salary_range, location, employer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(&payload.title)
        .bind(&payload.company)
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(&payload.salary_range)
        .bind(&payload.location)
        .bind(employer_id)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<JobListing>> {
        sqlx::query_as::<_, JobListing>(&format!(
            r#"SELECT {JOB_COLUMNS} FROM job_listings WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Lookup used by the submission flow: closed or missing listings are
    /// indistinguishable.
    pub async fn find_open(db: &PgPool, id: Uuid) -> sqlx::Result<Option<JobListing>> {
        sqlx::query_as::<_, JobListing>(&format!(
            r#"SELECT {JOB_COLUMNS} FROM job_listings WHERE id = $1 AND status = 'open'"#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Owner check folded into the lookup: a non-owner sees nothing, so the
    /// caller reports NotFound rather than Forbidden.
    pub async fn find_owned(
        db: &PgPool,
        id: Uuid,
        employer_id: Uuid,
    ) -> sqlx::Result<Option<JobListing>> {
        sqlx::query_as::<_, JobListing>(&format!(
            r#"SELECT {JOB_COLUMNS} FROM job_listings WHERE id = $1 AND employer_id = $2"#
        ))
        .bind(id)
        .bind(employer_id)
        .fetch_optional(db)
        .await
    }

    pub async fn update_owned(
        db: &PgPool,
        id: Uuid,
        employer_id: Uuid,
        payload: &JobPayload,
    ) -> sqlx::Result<Option<JobListing>> {
        sqlx::query_as::<_, JobListing>(&format!(
            r#"
            UPDATE job_listings
            SET title = $3, company = $4, description = $5, requirements = $6,
                salary_range = $7, location = $8, updated_at = now()
            WHERE id = $1 AND employer_id = $2
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(employer_id)
        .bind(&payload.title)
        .bind(&payload.company)
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(&payload.salary_range)
        .bind(&payload.location)
        .fetch_optional(db)
        .await
    }

    /// One-way transition; there is no reopen operation.
    pub async fn close_owned(
        db: &PgPool,
        id: Uuid,
        employer_id: Uuid,
    ) -> sqlx::Result<Option<JobListing>> {
        sqlx::query_as::<_, JobListing>(&format!(
            r#"
            UPDATE job_listings
            SET status = 'closed', updated_at = now()
            WHERE id = $1 AND employer_id = $2
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(employer_id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_by_employer(db: &PgPool, employer_id: Uuid) -> sqlx::Result<Vec<JobListing>> {
        sqlx::query_as::<_, JobListing>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM job_listings
            WHERE employer_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(employer_id)
        .fetch_all(db)
        .await
    }

    /// Open listings matching the filters, newest first, plus the unpaged
    /// total for the pagination block.
    pub async fn search(
        db: &PgPool,
        params: &JobSearchParams,
    ) -> sqlx::Result<(Vec<JobListing>, i64)> {
        let (page, limit) = params.page_and_limit();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM job_listings");
        push_search_filters(&mut count_qb, params);
        let total: i64 = count_qb.build_query_scalar().fetch_one(db).await?;

        let mut qb = QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM job_listings"));
        push_search_filters(&mut qb, params);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind((page - 1) * limit);

        let jobs = qb.build_query_as::<JobListing>().fetch_all(db).await?;
        Ok((jobs, total))
    }

    pub async fn stats(db: &PgPool, employer_id: Uuid) -> sqlx::Result<JobStats> {
        let active_jobs: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM job_listings WHERE employer_id = $1 AND status = 'open'"#,
        )
        .bind(employer_id)
        .fetch_one(db)
        .await?;

        let total_applications: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM job_applications a
            JOIN job_listings j ON j.id = a.job_id
            WHERE j.employer_id = $1
            "#,
        )
        .bind(employer_id)
        .fetch_one(db)
        .await?;

        let recent_applications: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM job_applications a
            JOIN job_listings j ON j.id = a.job_id
            WHERE j.employer_id = $1 AND a.created_at >= now() - interval '7 days'
            "#,
        )
        .bind(employer_id)
        .fetch_one(db)
        .await?;

        Ok(JobStats {
            active_jobs,
            total_applications,
            recent_applications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> JobSearchParams {
        JobSearchParams {
            search: None,
            location: None,
            salary_min: None,
            salary_max: None,
            page: 1,
            limit: 10,
        }
    }

    #[test]
    fn bare_search_filters_to_open_listings_only() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM job_listings");
        push_search_filters(&mut qb, &params());
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM job_listings WHERE status = 'open'"
        );
    }

    #[test]
    fn text_search_spans_title_company_description() {
        let mut p = params();
        p.search = Some("engineer".into());
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM job_listings");
        push_search_filters(&mut qb, &p);
        let sql = qb.sql();
        assert!(sql.contains("title ILIKE"));
        assert!(sql.contains("company ILIKE"));
        assert!(sql.contains("description ILIKE"));
    }

    #[test]
    fn empty_strings_do_not_add_filters() {
        let mut p = params();
        p.search = Some(String::new());
        p.location = Some(String::new());
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM job_listings");
        push_search_filters(&mut qb, &p);
        assert!(!qb.sql().contains("ILIKE"));
    }

    #[test]
    fn salary_bounds_compare_against_parsed_range() {
        let mut p = params();
        p.salary_min = Some(90_000);
        p.salary_max = Some(120_000);
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM job_listings");
        push_search_filters(&mut qb, &p);
        let sql = qb.sql();
        assert!(sql.contains("split_part(salary_range, '-', 1)"));
        assert!(sql.contains("position('-' in salary_range)"));
    }

    #[test]
    fn job_status_wire_format_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Open).unwrap(),
            r#""open""#
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Closed).unwrap(),
            r#""closed""#
        );
    }
}
