//! Field validation for contact input.
//!
//! Names and jobs may only contain English letters and whitespace; phone
//! numbers must follow the `+X XXX-XXX-XX-XX` mask exactly.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static NAME_JOB: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

static PHONE_MASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[0-9] [0-9]{3}-[0-9]{3}-[0-9]{2}-[0-9]{2}$").unwrap());

/// Which free-text field failed the letters-only check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Job,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => f.write_str("Name"),
            Field::Job => f.write_str("Job"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields must be filled!")]
    EmptyField,
    #[error("{0} must contain only English letters and spaces")]
    InvalidNameOrJob(Field),
    #[error("Phone format must be +X XXX-XXX-XX-XX")]
    InvalidPhoneFormat,
}

/// Check the three user-supplied fields. Inputs are trimmed before any rule
/// is applied; nothing else is normalized.
pub fn validate(name: &str, job: &str, phone: &str) -> Result<(), ValidationError> {
    let (name, job, phone) = (name.trim(), job.trim(), phone.trim());

    if name.is_empty() || job.is_empty() || phone.is_empty() {
        return Err(ValidationError::EmptyField);
    }
    if !NAME_JOB.is_match(name) {
        return Err(ValidationError::InvalidNameOrJob(Field::Name));
    }
    if !NAME_JOB.is_match(job) {
        return Err(ValidationError::InvalidNameOrJob(Field::Job));
    }
    if !PHONE_MASK.is_match(phone) {
        return Err(ValidationError::InvalidPhoneFormat);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: &str = "+1 234-567-89-01";

    #[test]
    fn test_accepts_well_formed_contact() {
        assert_eq!(validate("John Doe", "Engineer", PHONE), Ok(()));
        assert_eq!(validate("  John Doe ", " Engineer ", " +1 234-567-89-01 "), Ok(()));
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(validate("", "Engineer", PHONE), Err(ValidationError::EmptyField));
        assert_eq!(validate("John", "   ", PHONE), Err(ValidationError::EmptyField));
        assert_eq!(validate("John", "Engineer", ""), Err(ValidationError::EmptyField));
    }

    #[test]
    fn test_empty_wins_over_other_failures() {
        assert_eq!(validate("John3", "", "bogus"), Err(ValidationError::EmptyField));
    }

    #[test]
    fn test_name_and_job_letters_only() {
        assert_eq!(
            validate("John3", "Engineer", PHONE),
            Err(ValidationError::InvalidNameOrJob(Field::Name))
        );
        assert_eq!(
            validate("John", "Engineer-in-chief", PHONE),
            Err(ValidationError::InvalidNameOrJob(Field::Job))
        );
        assert_eq!(
            validate("Jörg", "Engineer", PHONE),
            Err(ValidationError::InvalidNameOrJob(Field::Name))
        );
        // name is reported before job
        assert_eq!(
            validate("J0hn", "Eng1neer", PHONE),
            Err(ValidationError::InvalidNameOrJob(Field::Name))
        );
    }

    #[test]
    fn test_phone_mask() {
        assert_eq!(
            validate("John Doe", "Engineer", "1234567890"),
            Err(ValidationError::InvalidPhoneFormat)
        );
        assert_eq!(
            validate("John Doe", "Engineer", "+12 234-567-89-01"),
            Err(ValidationError::InvalidPhoneFormat)
        );
        assert_eq!(
            validate("John Doe", "Engineer", "+1 234-567-89-0"),
            Err(ValidationError::InvalidPhoneFormat)
        );
        assert_eq!(
            validate("John Doe", "Engineer", "+1 234 567 89 01"),
            Err(ValidationError::InvalidPhoneFormat)
        );
        // non-ASCII digits are rejected
        assert_eq!(
            validate("John Doe", "Engineer", "+١ 234-567-89-01"),
            Err(ValidationError::InvalidPhoneFormat)
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::EmptyField.to_string(), "All fields must be filled!");
        assert_eq!(
            ValidationError::InvalidNameOrJob(Field::Job).to_string(),
            "Job must contain only English letters and spaces"
        );
        assert_eq!(
            ValidationError::InvalidPhoneFormat.to_string(),
            "Phone format must be +X XXX-XXX-XX-XX"
        );
    }
}
