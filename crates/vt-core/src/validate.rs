//! Stateless request checks run before any data operation.

use uuid::Uuid;

use crate::error::{AppError, Result};

/// Parses an identifier, naming the offending parameter on failure.
pub fn parse_id(raw: &str, name: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidIdentifier(format!("Invalid {name}")))
}

/// Returns the trimmed value, or `ValidationFailed(message)` when it is
/// missing or blank.
pub fn required_text(value: Option<&str>, message: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::ValidationFailed(message.to_string())),
    }
}

/// Trimmed optional text; blank becomes the empty string.
pub fn optional_text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

pub fn require_actor(actor: Option<Uuid>) -> Result<Uuid> {
    actor.ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_names_the_parameter() {
        let err = parse_id("not-an-id", "videoId").unwrap_err();
        assert_eq!(err, AppError::InvalidIdentifier("Invalid videoId".into()));
        let id = Uuid::now_v7();
        assert_eq!(parse_id(&id.to_string(), "videoId").unwrap(), id);
    }

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text(Some("  hi  "), "m").unwrap(), "hi");
        assert!(matches!(required_text(Some("   "), "m"), Err(AppError::ValidationFailed(_))));
        assert!(matches!(required_text(None, "m"), Err(AppError::ValidationFailed(_))));
    }

    #[test]
    fn optional_text_defaults_to_empty() {
        assert_eq!(optional_text(None), "");
        assert_eq!(optional_text(Some(" d ")), "d");
    }

    #[test]
    fn missing_actor_is_unauthorized() {
        assert_eq!(require_actor(None).unwrap_err().status_code(), 401);
    }
}
