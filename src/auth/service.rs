use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use super::types::{default_avatar, AuthResponse, LoginRequest, User};
use crate::constants::api_endpoints::auth as endpoints;
use crate::errors::{ApiError, HttpStatus};
use crate::http::HttpClient;
use crate::store::AppStore;
use crate::validation::{LoginForm, ValidationErrors};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid form: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid access token: {0}")]
    Token(String),
}

/// Session owner: the client carries the bearer token, the store the user
pub struct AuthService {
    client: HttpClient,
    store: AppStore,
}

impl AuthService {
    pub fn new(client: HttpClient, store: AppStore) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut HttpClient {
        &mut self.client
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AppStore {
        &mut self.store
    }

    pub fn into_parts(self) -> (HttpClient, AppStore) {
        (self.client, self.store)
    }

    /// Validate the form, exchange the credentials for a token and install
    /// the session. `is_loading` is cleared on every exit path after the
    /// request was issued.
    pub async fn login(&mut self, form: &LoginForm) -> Result<AuthResponse, AuthError> {
        form.validate()?;

        self.store.set_loading(true);
        let request = LoginRequest {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };

        let response = match self
            .client
            .post::<AuthResponse, _>(endpoints::LOGIN, Some(&request), None)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.store.set_loading(false);
                warn!(code = e.code, "Login failed: {}", e.message);
                return Err(e.into());
            }
        };

        let AuthResponse { token, user } = response.data;
        if let Err(e) = self.client.set_auth(&token) {
            self.store.set_loading(false);
            return Err(AuthError::Token(e.to_string()));
        }

        let user = self.install_user(user);
        self.store.set_loading(false);
        info!(user_id = %user.id, "Logged in");

        Ok(AuthResponse { token, user })
    }

    /// Tell the backend (best effort), then drop the token and the user
    pub async fn logout(&mut self) {
        if self.client.is_authenticated() {
            if let Err(e) = self
                .client
                .post::<Value, ()>(endpoints::LOGOUT, None, None)
                .await
            {
                warn!(code = e.code, "Logout request failed: {}", e.message);
            }
        }

        self.client.remove_auth();
        self.store.logout();
        info!("Logged out");
    }

    /// Reload the current user; a 401 ends the session
    pub async fn refresh_profile(&mut self) -> Result<User, AuthError> {
        match self.client.get::<User>(endpoints::PROFILE, None).await {
            Ok(response) => Ok(self.install_user(response.data)),
            Err(e) if e.code == HttpStatus::Unauthorized.code() => {
                warn!("Session rejected by backend, clearing it");
                self.client.remove_auth();
                self.store.logout();
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Swap the current token for a fresh one and return it
    pub async fn refresh_token(&mut self) -> Result<String, AuthError> {
        let response = self
            .client
            .post::<AuthResponse, ()>(endpoints::REFRESH, None, None)
            .await?;

        let AuthResponse { token, user } = response.data;
        self.client
            .set_auth(&token)
            .map_err(|e| AuthError::Token(e.to_string()))?;
        self.install_user(user);
        Ok(token)
    }

    /// Store the signed-in user, filling the avatar when the backend has none
    fn install_user(&mut self, mut user: User) -> User {
        if user.avatar.is_none() {
            user.avatar = Some(default_avatar(&user.email));
        }
        self.store.set_user(Some(user.clone()));
        user
    }
}
