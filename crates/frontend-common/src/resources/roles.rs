use bop_core::access::is_protected_role;
use bop_core::validation::Validate;
use bop_core::{Role, RoleInput};
use bop_http::ApiClient;
use tracing::{debug, warn};

use super::{ActionError, ListState};
use crate::auth::error_messages::{
    protected_role, role_delete_failure, role_update_failure, user_message,
};

/// Backs the role list page
#[derive(Debug)]
pub struct RolesController {
    client: ApiClient,
    state: ListState<Role>,
}

impl RolesController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: ListState::default(),
        }
    }

    pub const fn state(&self) -> &ListState<Role> {
        &self.state
    }

    pub fn roles(&self) -> &[Role] {
        &self.state.items
    }

    /// Reload the list; failures end up in `state().error`
    pub async fn refetch(&mut self) -> &ListState<Role> {
        self.state.begin();
        let result = self
            .client
            .list_roles()
            .await
            .map_err(|err| user_message(&err, "Failed to fetch roles"));
        if let Err(message) = &result {
            warn!("Loading roles failed: {message}");
        }
        self.state.finish(result);
        &self.state
    }

    pub async fn create(&mut self, name: &str) -> Result<Role, ActionError> {
        let input = RoleInput::new(name.trim());
        input.validate().map_err(ActionError::Invalid)?;

        let role = self
            .client
            .create_role(&input)
            .await
            .map_err(|err| ActionError::Failed(user_message(&err, "Failed to create role")))?;
        debug!(role_id = role.id, name = %role.name, "Role created");
        self.refetch().await;
        Ok(role)
    }

    pub async fn rename(&mut self, role_id: i64, name: &str) -> Result<Role, ActionError> {
        let input = RoleInput::new(name.trim());
        input.validate().map_err(ActionError::Invalid)?;

        let role = self
            .client
            .update_role(role_id, &input)
            .await
            .map_err(|err| ActionError::Failed(role_update_failure(&err)))?;
        self.refetch().await;
        Ok(role)
    }

    /// Delete a role unless it is a built-in one
    pub async fn delete(&mut self, role: &Role) -> Result<(), ActionError> {
        if is_protected_role(&role.name) {
            debug!(name = %role.name, "Refusing to delete protected role");
            return Err(ActionError::Blocked(protected_role(&role.name)));
        }

        self.client
            .delete_role(role.id)
            .await
            .map_err(|err| ActionError::Failed(role_delete_failure(&err)))?;
        self.refetch().await;
        Ok(())
    }
}
