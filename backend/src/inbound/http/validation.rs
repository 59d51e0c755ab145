//! Shared validation helpers for inbound HTTP adapters.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use serde_json::json;

use crate::domain::{Error, IdentifierValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidIdentifier,
    DuplicateMember,
    MalformedBody,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidIdentifier => "invalid_identifier",
            Self::DuplicateMember => "duplicate_member",
            Self::MalformedBody => "malformed_body",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_identifier_error(
    field: FieldName,
    value: &str,
    error: &IdentifierValidationError,
) -> Error {
    ValidationError::new(field, error.to_string()).with_value(ErrorCode::InvalidIdentifier, value)
}

pub(crate) fn duplicate_member_error(field: FieldName, index: usize, value: &str) -> Error {
    ValidationError::new(field, format!("user {value} is listed more than once")).with_index(
        ErrorCode::DuplicateMember,
        index,
        value,
    )
}

/// Require a present, non-blank string.
pub(crate) fn required_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Require a present flag.
pub(crate) fn required_flag(value: Option<bool>, field: FieldName) -> Result<bool, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Require a present, non-blank string and parse it into an identifier.
pub(crate) fn parse_identifier<T, F>(
    value: Option<String>,
    field: FieldName,
    parse: F,
) -> Result<T, Error>
where
    F: FnOnce(String) -> Result<T, IdentifierValidationError>,
{
    let raw = required_text(value, field)?;
    parse(raw.clone()).map_err(|err| invalid_identifier_error(field, &raw, &err))
}

fn malformed_body(message: String) -> Error {
    Error::invalid_request(message).with_details(json!({ "code": ErrorCode::MalformedBody.as_str() }))
}

/// JSON extractor configuration reporting body errors as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        malformed_body(format!("invalid request body: {err}")).into()
    })
}

/// Query extractor configuration reporting query errors as `invalid_request`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        malformed_body(format!("invalid query string: {err}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, UserId};
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("user_id");

    #[rstest]
    #[case::absent(None)]
    #[case::empty(Some(String::new()))]
    #[case::blank(Some("   ".to_owned()))]
    fn blank_values_are_missing_fields(#[case] value: Option<String>) {
        let error = required_text(value, FIELD).expect_err("missing");
        assert_eq!(error.code(), DomainCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "user_id", "code": "missing_field" }))
        );
    }

    #[rstest]
    fn identifiers_with_padding_are_rejected() {
        let error = parse_identifier(Some(" u1".to_owned()), FIELD, UserId::new)
            .expect_err("padded id");
        let details = error.details().expect("details");
        assert_eq!(details["code"], "invalid_identifier");
        assert_eq!(details["value"], " u1");
    }

    #[rstest]
    fn valid_identifiers_parse() {
        let id = parse_identifier(Some("u1".to_owned()), FIELD, UserId::new).expect("valid id");
        assert_eq!(id.as_str(), "u1");
    }

    #[rstest]
    fn duplicate_members_report_their_index() {
        let error = duplicate_member_error(FieldName::new("members.user_id"), 2, "u1");
        let details = error.details().expect("details");
        assert_eq!(details["index"], 2);
        assert_eq!(details["code"], "duplicate_member");
    }
}
