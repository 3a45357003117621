//! User-friendly error message mappings

use bop_http::{ClientError, ErrorCategory};

/// Shown for every failed password login
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

/// Shown when the backend cannot be reached at all
pub const SERVER_UNREACHABLE: &str = "Unable to reach the server. Please try again later.";

/// Message for a caller-facing error: the server's structured message when it
/// sent one, otherwise `Error {status}: {fallback}`, otherwise `fallback`
pub fn user_message(error: &ClientError, fallback: &str) -> String {
    if let Some(message) = error.server_message() {
        return message.to_string();
    }
    match error.category() {
        ErrorCategory::Transport => SERVER_UNREACHABLE.to_string(),
        ErrorCategory::Authentication if matches!(error, ClientError::SessionExpired(_)) => {
            "Your session has expired. Please log in again.".to_string()
        }
        _ => error.status().map_or_else(
            || fallback.to_string(),
            |status| format!("Error {status}: {fallback}"),
        ),
    }
}

/// Message for a failed login; credential problems are never detailed
pub fn login_failure(error: &ClientError) -> String {
    match error.category() {
        ErrorCategory::Transport => SERVER_UNREACHABLE.to_string(),
        _ => LOGIN_FAILED.to_string(),
    }
}

/// Message for a failed role rename
pub fn role_update_failure(error: &ClientError) -> String {
    match error.status() {
        Some(403) => "You don't have permission to update this role. Some roles like 'Admin' may be protected.".to_string(),
        Some(409) => "A role with this name already exists.".to_string(),
        _ => user_message(error, "Failed to update role"),
    }
}

/// Message for a failed role deletion
pub fn role_delete_failure(error: &ClientError) -> String {
    match error.status() {
        Some(403) => "Cannot delete this role. Some roles like 'Admin' cannot be deleted.".to_string(),
        Some(400) => "Cannot delete this role because it is currently assigned to users.".to_string(),
        _ => user_message(error, "Failed to delete role"),
    }
}

/// Blocking message for deleting a built-in role
pub fn protected_role(name: &str) -> String {
    format!("Cannot delete the \"{name}\" role as it is a protected system role.")
}

/// Blocking message for deleting a built-in currency
pub fn protected_currency(code: &str) -> String {
    format!("Cannot delete the \"{code}\" currency as it is a protected system currency.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bop_http::{ApiErrorBody, StatusCode};

    fn status_error(status: u16, raw: &str) -> ClientError {
        ClientError::from_status(StatusCode::from_u16(status).unwrap(), raw.to_string())
    }

    #[test]
    fn test_structured_message_wins() {
        let err = status_error(422, r#"{"message":"Email already registered"}"#);
        assert_eq!(user_message(&err, "Failed to create user"), "Email already registered");
    }

    #[test]
    fn test_status_fallback() {
        let err = status_error(500, "boom");
        assert_eq!(
            user_message(&err, "Failed to load users"),
            "Error 500: Failed to load users"
        );
    }

    #[test]
    fn test_role_overrides() {
        assert_eq!(
            role_update_failure(&status_error(409, "{}")),
            "A role with this name already exists."
        );
        assert_eq!(
            role_delete_failure(&status_error(400, r#"{"message":"in use"}"#)),
            "Cannot delete this role because it is currently assigned to users."
        );
        assert_eq!(
            role_delete_failure(&status_error(404, r#"{"error":"Role not found"}"#)),
            "Role not found"
        );
    }

    #[test]
    fn test_login_failure_hides_server_detail() {
        let err = ClientError::AuthenticationFailed(ApiErrorBody::parse(
            401,
            r#"{"message":"user disabled"}"#.to_string(),
        ));
        assert_eq!(login_failure(&err), LOGIN_FAILED);
    }
}
