use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::repo::ContactInfo;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContactInfoPayload {
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Address must not exceed 200 characters"))]
    pub address: Option<String>,
    #[validate(url(message = "Invalid LinkedIn URL"))]
    pub linkedin: Option<String>,
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[\d\s\-()]{10,20}$").unwrap();
    }
    if PHONE_RE.is_match(phone.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Invalid phone number format".into());
        Err(err)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfilePayload {
    #[validate(length(max = 1000, message = "Bio must not exceed 1000 characters"))]
    pub bio: Option<String>,
    #[validate(custom = "validate_skills")]
    pub skills: Vec<String>,
    #[validate(length(max = 2000, message = "Experience must not exceed 2000 characters"))]
    pub experience: Option<String>,
    #[validate(length(max = 2000, message = "Education must not exceed 2000 characters"))]
    pub education: Option<String>,
    #[validate]
    #[serde(default)]
    pub contact_info: ContactInfoPayload,
}

fn validate_skills(skills: &Vec<String>) -> Result<(), ValidationError> {
    for skill in skills {
        let len = skill.trim().chars().count();
        if !(2..=50).contains(&len) {
            let mut err = ValidationError::new("length");
            err.message = Some("Each skill must be between 2 and 50 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

impl From<&ContactInfoPayload> for ContactInfo {
    fn from(payload: &ContactInfoPayload) -> Self {
        Self {
            phone: payload.phone.clone(),
            address: payload.address.clone(),
            linkedin: payload.linkedin.clone(),
        }
    }
}
