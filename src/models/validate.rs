//! Field-length validation for record models.

use std::fmt;

use thiserror::Error;

/// Declared maximum length of a string column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimit {
    pub field: &'static str,
    pub max_len: usize,
}

impl FieldLimit {
    pub const fn new(field: &'static str, max_len: usize) -> Self {
        Self { field, max_len }
    }

    /// Absent values always pass. Length is counted in characters.
    pub fn check(&self, value: Option<&str>) -> Result<(), ValidationError> {
        let Some(value) = value else {
            return Ok(());
        };
        let actual = value.chars().count();
        if actual > self.max_len {
            return Err(ValidationError::TooLong {
                field: self.field,
                max_len: self.max_len,
                actual,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}'s length must be {max_len} characters or less")]
    TooLong {
        field: &'static str,
        max_len: usize,
        actual: usize,
    },
}

/// Every violation found on one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check each `(limit, value)` pair, collecting all failures.
pub fn check_all<'a, I>(fields: I) -> Result<(), ValidationErrors>
where
    I: IntoIterator<Item = (&'static FieldLimit, Option<&'a str>)>,
{
    let errors: Vec<ValidationError> = fields
        .into_iter()
        .filter_map(|(limit, value)| limit.check(value).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
