use bop_core::validation::Validate;
use bop_core::{
    Currency, CurrencyAssignment, NewUser, Pagination, Role, User, UserCurrency, UserUpdate,
};
use bop_http::ApiClient;
use tracing::{debug, warn};

use super::{ActionError, ListState};
use crate::auth::error_messages::user_message;

/// Everything the user edit page needs, loaded together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEditContext {
    pub user: User,
    pub roles: Vec<Role>,
    pub currencies: Vec<Currency>,
    pub assigned: Vec<UserCurrency>,
}

impl UserEditContext {
    /// Code of the user's default currency, if one is assigned
    pub fn default_currency(&self) -> Option<&str> {
        self.assigned
            .iter()
            .find(|assignment| assignment.is_default)
            .map(|assignment| assignment.currency_code.as_str())
    }
}

/// Backs the user list, detail, create and edit pages
#[derive(Debug)]
pub struct UsersController {
    client: ApiClient,
    state: ListState<User>,
    pagination: Option<Pagination>,
}

impl UsersController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: ListState::default(),
            pagination: None,
        }
    }

    pub const fn state(&self) -> &ListState<User> {
        &self.state
    }

    pub const fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub async fn refetch(&mut self) -> &ListState<User> {
        self.state.begin();
        let result = match self.client.list_users().await {
            Ok(page) => {
                self.pagination = page.pagination;
                Ok(page.items)
            }
            Err(err) => {
                warn!("Loading users failed: {err}");
                Err(user_message(&err, "Failed to fetch users"))
            }
        };
        self.state.finish(result);
        &self.state
    }

    pub async fn get(&self, user_id: i64) -> Result<User, ActionError> {
        self.client
            .get_user(user_id)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to fetch user data")))
    }

    /// Load the user, the role and currency choices, and current assignments
    pub async fn load_edit_context(&self, user_id: i64) -> Result<UserEditContext, ActionError> {
        let (user, roles, currencies, assigned) = futures::try_join!(
            self.client.get_user(user_id),
            self.client.list_roles(),
            self.client.list_currencies(),
            self.client.user_currencies(user_id),
        )
        .map_err(|err| ActionError::Failed(user_message(&err, "Failed to fetch user data")))?;

        Ok(UserEditContext {
            user,
            roles,
            currencies,
            assigned,
        })
    }

    pub async fn create(&mut self, user: &NewUser) -> Result<User, ActionError> {
        user.validate().map_err(ActionError::Invalid)?;

        let created = self
            .client
            .create_user(user)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to create user")))?;
        debug!(user_id = created.id, "User created");
        self.refetch().await;
        Ok(created)
    }

    /// Update profile fields, then replace currency assignments when given
    pub async fn update(
        &mut self,
        user_id: i64,
        update: UserUpdate,
        currencies: Option<CurrencyAssignment>,
    ) -> Result<User, ActionError> {
        update.validate().map_err(ActionError::Invalid)?;
        let inconsistent = currencies.as_ref().is_some_and(|a| {
            !a.currency_codes.is_empty() && !a.currency_codes.contains(&a.default_currency)
        });
        if inconsistent {
            return Err(ActionError::Blocked(
                "The default currency must be one of the selected currencies.".to_string(),
            ));
        }

        let updated = self
            .client
            .update_user(user_id, update)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to update user")))?;

        if let Some(assignment) = currencies.filter(|a| !a.currency_codes.is_empty()) {
            self.client
                .update_user_currencies(user_id, &assignment)
                .await
                .map_err(|err| {
                    ActionError::Failed(user_message(&err, "Failed to update user currencies"))
                })?;
        }

        self.refetch().await;
        Ok(updated)
    }

    pub async fn delete(&mut self, user_id: i64) -> Result<(), ActionError> {
        self.client
            .delete_user(user_id)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to delete user")))?;
        self.refetch().await;
        Ok(())
    }
}
