//! Role management API client methods

use bop_core::{Role, RoleInput};
use reqwest::Method;

use super::{ApiClient, ClientError};

const ROLES_PATH: &str = "/users/roles";

impl ApiClient {
    pub async fn list_roles(&self) -> Result<Vec<Role>, ClientError> {
        let request = self.request(Method::GET, ROLES_PATH);
        self.execute(request).await
    }

    pub async fn create_role(&self, role: &RoleInput) -> Result<Role, ClientError> {
        let request = self.request(Method::POST, ROLES_PATH).json(role)?;
        self.execute(request).await
    }

    /// Rename a role
    pub async fn update_role(&self, role_id: i64, role: &RoleInput) -> Result<Role, ClientError> {
        let request = self
            .request(Method::PUT, &format!("{ROLES_PATH}/{role_id}"))
            .json(role)?;
        self.execute(request).await
    }

    pub async fn delete_role(&self, role_id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("{ROLES_PATH}/{role_id}"));
        self.execute_empty(request).await
    }
}
