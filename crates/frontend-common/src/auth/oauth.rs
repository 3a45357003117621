//! Google OAuth callback handling

use thiserror::Error;
use url::form_urlencoded;

/// Why an OAuth callback could not be completed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthCallbackError {
    #[error("Authentication failed: Missing parameters")]
    MissingParameters,

    #[error("Authentication failed: No token received")]
    NoToken,

    /// Code exchange rejected or unreachable
    #[error("{0}")]
    Exchange(String),
}

/// Parameters the provider appends to the callback URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

impl CallbackParams {
    /// Parse a callback URL, path with query, or bare query string
    ///
    /// # Errors
    ///
    /// Returns [`OAuthCallbackError::MissingParameters`] unless both `code`
    /// and `state` are present and non-empty
    pub fn parse(callback: &str) -> Result<Self, OAuthCallbackError> {
        let query = callback
            .split_once('?')
            .map_or(callback, |(_, query)| query);
        let query = query.split('#').next().unwrap_or_default();

        let mut code = None;
        let mut state = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" if !value.is_empty() => code = Some(value.into_owned()),
                "state" if !value.is_empty() => state = Some(value.into_owned()),
                _ => {}
            }
        }

        match (code, state) {
            (Some(code), Some(state)) => Ok(Self { code, state }),
            _ => Err(OAuthCallbackError::MissingParameters),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_callback_url() {
        let params = CallbackParams::parse(
            "http://localhost:3000/auth/google/callback?code=4%2F0Ab&state=s1",
        )
        .unwrap();
        assert_eq!(params.code, "4/0Ab");
        assert_eq!(params.state, "s1");
    }

    #[test]
    fn test_parse_bare_query() {
        let params = CallbackParams::parse("state=s1&code=c1").unwrap();
        assert_eq!(params.code, "c1");
    }

    #[test]
    fn test_missing_state_rejected() {
        assert_eq!(
            CallbackParams::parse("/auth/google/callback?code=c1"),
            Err(OAuthCallbackError::MissingParameters)
        );
        assert_eq!(
            CallbackParams::parse("/auth/google/callback?code=&state=s"),
            Err(OAuthCallbackError::MissingParameters)
        );
    }
}
