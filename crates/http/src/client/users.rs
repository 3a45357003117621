//! User management API client methods

use bop_core::{CurrencyAssignment, NewUser, User, UserPage, UserUpdate};
use reqwest::Method;
use serde::Deserialize;

use super::{ApiClient, ClientError};

/// `GET /users/` answers with a page object on current backends and a bare
/// array on older ones
#[derive(Deserialize)]
#[serde(untagged)]
enum UserListResponse {
    Page(UserPage),
    Bare(Vec<User>),
}

impl From<UserListResponse> for UserPage {
    fn from(response: UserListResponse) -> Self {
        match response {
            UserListResponse::Page(page) => page,
            UserListResponse::Bare(items) => Self {
                items,
                pagination: None,
            },
        }
    }
}

impl ApiClient {
    /// List users (admin only)
    pub async fn list_users(&self) -> Result<UserPage, ClientError> {
        let request = self.request(Method::GET, "/users/");
        let response: UserListResponse = self.execute(request).await?;
        Ok(response.into())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, ClientError> {
        let request = self.request(Method::GET, &format!("/users/{user_id}"));
        self.execute(request).await
    }

    /// Register a new user (admin only)
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        let request = self.request(Method::POST, "/users/register").json(user)?;
        self.execute(request).await
    }

    /// Update a user; a blank password keeps the stored one
    pub async fn update_user(&self, user_id: i64, update: UserUpdate) -> Result<User, ClientError> {
        let request = self
            .request(Method::PUT, &format!("/users/{user_id}"))
            .json(&update.without_blank_password())?;
        self.execute(request).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("/users/{user_id}"));
        self.execute_empty(request).await
    }

    /// Replace every currency assignment of a user
    pub async fn update_user_currencies(
        &self,
        user_id: i64,
        assignment: &CurrencyAssignment,
    ) -> Result<(), ClientError> {
        let request = self
            .request(Method::PUT, &format!("/users/{user_id}/currencies"))
            .json(assignment)?;
        self.execute_empty(request).await
    }
}
