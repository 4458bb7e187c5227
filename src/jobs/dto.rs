use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::jobs::repo::JobListing;

/// Body for create and full-overwrite update; both operations accept the
/// same field set.
#[derive(Debug, Deserialize, Validate)]
pub struct JobPayload {
    #[validate(length(min = 3, max = 100, message = "Job title must be between 3 and 100 characters"))]
    pub title: String,
    #[validate(length(min = 2, max = 100, message = "Company name must be between 2 and 100 characters"))]
    pub company: String,
    #[validate(length(min = 50, max = 5000, message = "Description must be between 50 and 5000 characters"))]
    pub description: String,
    #[validate(
        length(min = 1, message = "At least one requirement is required"),
        custom = "validate_requirements"
    )]
    pub requirements: Vec<String>,
    #[validate(custom = "validate_salary_range")]
    pub salary_range: String,
    #[validate(length(min = 2, max = 100, message = "Location must be between 2 and 100 characters"))]
    pub location: String,
}

fn validate_requirements(requirements: &Vec<String>) -> Result<(), ValidationError> {
    for requirement in requirements {
        let len = requirement.trim().chars().count();
        if !(1..=200).contains(&len) {
            let mut err = ValidationError::new("length");
            err.message = Some("Each requirement must be between 1 and 200 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

fn validate_salary_range(salary_range: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref SALARY_RE: Regex = Regex::new(
            r"^[\$£€]?\d{1,3}(,\d{3})*(\s*-\s*[\$£€]?\d{1,3}(,\d{3})*)?$"
        )
        .unwrap();
    }
    if SALARY_RE.is_match(salary_range.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("salary_range");
        err.message = Some("Invalid salary range format".into());
        Err(err)
    }
}

#[derive(Debug, Deserialize)]
pub struct JobSearchParams {
    pub search: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

impl JobSearchParams {
    /// 1-based page, page size capped to keep OFFSET math sane.
    pub fn page_and_limit(&self) -> (i64, i64) {
        (self.page.max(1), self.limit.clamp(1, 100))
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub pages: i64,
    pub page: i64,
    pub limit: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            pages: (total + limit - 1) / limit,
            page,
            limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobSearchResponse {
    pub jobs: Vec<JobListing>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct EmployerListings {
    pub jobs: Vec<JobListing>,
}

#[derive(Debug, Serialize)]
pub struct JobStats {
    pub active_jobs: i64,
    pub total_applications: i64,
    pub recent_applications: i64,
}
