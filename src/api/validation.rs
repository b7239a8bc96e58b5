use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web::PathConfig;
use validator::ValidationErrors;

use crate::api::error::{ErrorMessage, ErrorResponse};

/// Flatten validator output into `field: message` lines, sorted by field
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code));
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();
    messages
}

fn describe_deserialize_error(err_string: String) -> String {
    if err_string.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload".to_string()
    } else {
        err_string
    }
}

fn bad_request(err: actix_web_validator::Error) -> actix_web::Error {
    let message = match &err {
        actix_web_validator::Error::Validate(validation_errors) => {
            ErrorMessage::from(validation_messages(validation_errors))
        }
        actix_web_validator::Error::Deserialize(de_err) => {
            ErrorMessage::from(describe_deserialize_error(de_err.to_string()))
        }
        other => ErrorMessage::from(describe_deserialize_error(other.to_string())),
    };

    InternalError::from_response(
        "",
        ErrorResponse::new(StatusCode::BAD_REQUEST, message).into_http(),
    )
    .into()
}

/// JSON body config: every parse or validation failure becomes a 400 in the
/// shared error envelope
pub fn json_config(limit: usize) -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| bad_request(err))
}

/// Query string config: unknown keys and unparsable values become a 400
pub fn query_config() -> actix_web_validator::QueryConfig {
    actix_web_validator::QueryConfig::default().error_handler(|err, _req| bad_request(err))
}

/// Path config: a segment that does not parse (e.g. a non-numeric id) names
/// no record, so it is reported as 404
pub fn path_config() -> PathConfig {
    PathConfig::default().error_handler(|_err, req| {
        InternalError::from_response(
            "",
            ErrorResponse::new(
                StatusCode::NOT_FOUND,
                format!("No resource found at {}", req.path()),
            )
            .into_http(),
        )
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_validation_messages_are_prefixed_and_sorted() {
        let mut errors = ValidationErrors::new();
        let mut salary = ValidationError::new("range");
        salary.message = Some("salary must be at least 0".into());
        errors.add("salary", salary);
        errors.add("equity", ValidationError::new("equity_range"));

        let messages = validation_messages(&errors);

        assert_eq!(
            messages,
            vec![
                "equity: invalid value (equity_range)".to_string(),
                "salary: salary must be at least 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_body_message() {
        assert_eq!(
            describe_deserialize_error("EOF while parsing a value at line 1 column 0".into()),
            "Request body is empty. Expected JSON payload"
        );
        assert_eq!(
            describe_deserialize_error("unknown field `badKey`".into()),
            "unknown field `badKey`"
        );
    }
}
