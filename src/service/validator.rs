//! Caller input validation.
//!
//! Presence and shape checks only; existence is left to the upstream.

use crate::error::{GatewayResult, NormalizedError};

pub const POST_ID_REQUIRED: &str = "postId is required";
pub const POST_ID_NOT_INTEGER: &str = "postId must be a valid integer";

/// Check that a caller-supplied post id is present and a base-10 `i32`.
pub fn validate_post_id(raw: Option<&str>) -> GatewayResult<()> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return Err(NormalizedError::bad_request(POST_ID_REQUIRED)),
    };

    raw.parse::<i32>()
        .map(|_| ())
        .map_err(|_| NormalizedError::bad_request(POST_ID_NOT_INTEGER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_missing_post_id() {
        for raw in [None, Some(""), Some(" "), Some("\t\n")] {
            let err = validate_post_id(raw).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.detail, POST_ID_REQUIRED);
        }
    }

    #[test]
    fn test_non_integer_post_id() {
        for raw in ["abc", "1.5", "12abc", " 12", "0x10", "99999999999"] {
            let err = validate_post_id(Some(raw)).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.detail, POST_ID_NOT_INTEGER, "input {:?}", raw);
        }
    }

    #[test]
    fn test_valid_post_ids() {
        assert!(validate_post_id(Some("123")).is_ok());
        assert!(validate_post_id(Some("-5")).is_ok());
        assert!(validate_post_id(Some("+7")).is_ok());
        assert!(validate_post_id(Some("0")).is_ok());
    }
}
