//! Currency API client methods

use bop_core::{Currency, CurrencyUpdate, UserCurrency};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ClientError};

/// Body naming a single currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyCodeRequest {
    pub currency_code: String,
}

/// `/currencies/{code}` for a code that is safe as a single path segment
fn currency_path(code: &str) -> Result<String, ClientError> {
    Currency::normalize_code(code)
        .map(|code| format!("/currencies/{code}"))
        .ok_or_else(|| ClientError::InvalidInput(format!("invalid currency code {code:?}")))
}

/// Body naming a single, normalized currency
fn code_body(code: &str) -> Result<CurrencyCodeRequest, ClientError> {
    Currency::normalize_code(code)
        .map(|currency_code| CurrencyCodeRequest { currency_code })
        .ok_or_else(|| ClientError::InvalidInput(format!("invalid currency code {code:?}")))
}

impl ApiClient {
    /// Every currency known to the platform
    pub async fn list_currencies(&self) -> Result<Vec<Currency>, ClientError> {
        let request = self.request(Method::GET, "/currencies");
        self.execute(request).await
    }

    pub async fn get_currency(&self, code: &str) -> Result<Currency, ClientError> {
        let request = self.request(Method::GET, &currency_path(code)?);
        self.execute(request).await
    }

    pub async fn create_currency(&self, currency: &Currency) -> Result<Currency, ClientError> {
        let request = self.request(Method::POST, "/currencies").json(currency)?;
        self.execute(request).await
    }

    /// Update name, symbol and active flag; the code is immutable
    pub async fn update_currency(
        &self,
        code: &str,
        update: &CurrencyUpdate,
    ) -> Result<Currency, ClientError> {
        let request = self
            .request(Method::PUT, &currency_path(code)?)
            .json(update)?;
        self.execute(request).await
    }

    pub async fn delete_currency(&self, code: &str) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &currency_path(code)?);
        self.execute_empty(request).await
    }

    /// Currencies assigned to the logged-in user
    pub async fn my_currencies(&self) -> Result<Vec<UserCurrency>, ClientError> {
        let request = self.request(Method::GET, "/currencies/user");
        self.execute(request).await
    }

    /// Change the logged-in user's default currency
    pub async fn set_default_currency(&self, code: &str) -> Result<(), ClientError> {
        let request = self
            .request(Method::PUT, "/currencies/user/default")
            .json(&code_body(code)?)?;
        self.execute_empty(request).await
    }

    /// Currencies assigned to another user (admin only)
    pub async fn user_currencies(&self, user_id: i64) -> Result<Vec<UserCurrency>, ClientError> {
        let request = self.request(Method::GET, &format!("/currencies/users/{user_id}"));
        self.execute(request).await
    }

    /// Assign a currency to a user (admin only)
    pub async fn assign_currency(&self, user_id: i64, code: &str) -> Result<(), ClientError> {
        let request = self
            .request(Method::POST, &format!("/currencies/users/{user_id}"))
            .json(&code_body(code)?)?;
        self.execute_empty(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_path_is_a_single_segment() {
        assert_eq!(currency_path(" usd ").unwrap(), "/currencies/USD");
        for code in ["../users/5", "SGD/", "..", "", "S D"] {
            assert!(
                matches!(currency_path(code), Err(ClientError::InvalidInput(_))),
                "{code:?} should be rejected"
            );
        }
    }
}
