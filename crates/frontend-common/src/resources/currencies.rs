use bop_core::access::is_protected_currency;
use bop_core::validation::{Validate, validators::validate_currency_code};
use bop_core::{Currency, CurrencyUpdate, UserCurrency, ValidationErrors};
use bop_http::ApiClient;
use tracing::{debug, warn};

use super::{ActionError, ListState};
use crate::auth::error_messages::{protected_currency, user_message};

/// Trimmed upper-case code, or the validation error a form would show
fn normalized(code: &str) -> Result<String, ActionError> {
    Currency::normalize_code(code).ok_or_else(|| {
        let mut errors = ValidationErrors::default();
        errors.check(validate_currency_code(code, "code"));
        ActionError::Invalid(errors)
    })
}

/// Backs the currency list, create and edit pages
#[derive(Debug)]
pub struct CurrenciesController {
    client: ApiClient,
    state: ListState<Currency>,
}

impl CurrenciesController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: ListState::default(),
        }
    }

    pub const fn state(&self) -> &ListState<Currency> {
        &self.state
    }

    pub fn currencies(&self) -> &[Currency] {
        &self.state.items
    }

    pub async fn refetch(&mut self) -> &ListState<Currency> {
        self.state.begin();
        let result = self
            .client
            .list_currencies()
            .await
            .map_err(|err| user_message(&err, "Failed to fetch currencies"));
        if let Err(message) = &result {
            warn!("Loading currencies failed: {message}");
        }
        self.state.finish(result);
        &self.state
    }

    pub async fn get(&self, code: &str) -> Result<Currency, ActionError> {
        let code = normalized(code)?;
        self.client
            .get_currency(&code)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to fetch currency")))
    }

    /// Codes are stored upper-case
    pub async fn create(&mut self, currency: &Currency) -> Result<Currency, ActionError> {
        let currency = Currency {
            code: Currency::normalize_code(&currency.code)
                .unwrap_or_else(|| currency.code.clone()),
            name: currency.name.trim().to_string(),
            symbol: currency.symbol.trim().to_string(),
            is_active: currency.is_active,
        };
        currency.validate().map_err(ActionError::Invalid)?;

        let created = self
            .client
            .create_currency(&currency)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to create currency")))?;
        debug!(code = %created.code, "Currency created");
        self.refetch().await;
        Ok(created)
    }

    pub async fn update(
        &mut self,
        code: &str,
        update: &CurrencyUpdate,
    ) -> Result<Currency, ActionError> {
        let code = normalized(code)?;
        update.validate().map_err(ActionError::Invalid)?;

        let updated = self
            .client
            .update_currency(&code, update)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to update currency")))?;
        self.refetch().await;
        Ok(updated)
    }

    /// Delete a currency unless it is a built-in one
    pub async fn delete(&mut self, code: &str) -> Result<(), ActionError> {
        let code = normalized(code)?;
        if is_protected_currency(&code) {
            debug!(code = %code, "Refusing to delete protected currency");
            return Err(ActionError::Blocked(protected_currency(&code)));
        }

        self.client
            .delete_currency(&code)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to delete currency")))?;
        self.refetch().await;
        Ok(())
    }

    /// Currencies assigned to the logged-in user
    pub async fn mine(&self) -> Result<Vec<UserCurrency>, ActionError> {
        self.client
            .my_currencies()
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to fetch currencies")))
    }

    pub async fn set_default(&self, code: &str) -> Result<(), ActionError> {
        let code = normalized(code)?;
        self.client.set_default_currency(&code).await.map_err(|err| {
            ActionError::Failed(user_message(&err, "Failed to set default currency"))
        })
    }

    pub async fn for_user(&self, user_id: i64) -> Result<Vec<UserCurrency>, ActionError> {
        self.client.user_currencies(user_id).await.map_err(|err| {
            ActionError::Failed(user_message(&err, "Failed to fetch user currencies"))
        })
    }

    pub async fn assign(&self, user_id: i64, code: &str) -> Result<(), ActionError> {
        let code = normalized(code)?;
        self.client
            .assign_currency(user_id, &code)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to assign currency")))
    }
}
