//! Field-level input validation shared by the administration services.
//!
//! Every check runs before the first repository call and all failures are
//! reported together as [`AppError::InvalidFields`].

use rolegate_core::{AppError, AppResult, FieldViolation, NonEmptyString};
use rolegate_domain::PermissionId;

/// Converts a typed or transport identifier. Services call this only after
/// the permission check.
pub(crate) fn resolve_id<T>(value: impl TryInto<T, Error: Into<AppError>>) -> AppResult<T> {
    value.try_into().map_err(Into::into)
}

/// Collects violations while a payload is validated.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// Records a failed domain constructor under `field` and keeps the value
    /// otherwise.
    pub(crate) fn check<T>(&mut self, field: &str, result: AppResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(field, violation_message(error));
                None
            }
        }
    }

    /// Requires a non-blank text value.
    pub(crate) fn require_text(&mut self, field: &str, value: String) -> Option<NonEmptyString> {
        match NonEmptyString::new(value) {
            Ok(value) => Some(value),
            Err(_) => {
                self.push(field, format!("{field} is required"));
                None
            }
        }
    }

    /// Validates an optional replacement text value.
    pub(crate) fn optional_text(
        &mut self,
        field: &str,
        value: Option<String>,
    ) -> Option<NonEmptyString> {
        value.and_then(|value| self.require_text(field, value))
    }

    /// Parses a list of permission ids, requiring at least one.
    pub(crate) fn permission_ids(&mut self, field: &str, values: &[String]) -> Vec<PermissionId> {
        if values.is_empty() {
            self.push(field, "at least one permission is required");
            return Vec::new();
        }

        self.optional_permission_ids(field, values)
    }

    /// Parses a list of permission ids that may be empty.
    pub(crate) fn optional_permission_ids(
        &mut self,
        field: &str,
        values: &[String],
    ) -> Vec<PermissionId> {
        values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| {
                self.check(&format!("{field}[{index}]"), PermissionId::parse(value))
            })
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the collected violations as an error.
    pub(crate) fn into_error(self) -> AppError {
        AppError::InvalidFields(self.0)
    }

    /// Fails when anything was collected.
    pub(crate) fn finish(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

/// Normalises an optional description: blank becomes absent.
pub(crate) fn normalize_description(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn violation_message(error: AppError) -> String {
    match error {
        AppError::Validation(message) => message,
        other => other.to_string(),
    }
}
