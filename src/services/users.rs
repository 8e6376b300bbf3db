//! Signup, login, profile lookup/deletion and address management.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::auth::{hash_password, verify_password, AuthError, TokenIssuer, TokenPair};
use crate::domain::{Address, AddressFields, AddressRole, Email, User, UserUpdate};
use crate::error::{EcommerceError, Result};
use crate::store::Store;

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 2, max = 30))]
    pub first_name: String,
    #[validate(length(min = 2, max = 30))]
    pub last_name: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
}

impl SignUpRequest {
    /// Trim everything except the password, so length rules apply to what
    /// is stored.
    fn trimmed(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            password: self.password,
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct UserService {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Register a new user with empty cart, favorites, addresses and orders.
    ///
    /// The existence checks give friendly messages; the store's own
    /// uniqueness constraint settles concurrent signups.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<User> {
        let request = request.trimmed();
        request.validate()?;
        let email = Email::parse(&request.email)?;
        let phone = request.phone;

        if self.store.email_exists(&email).await? {
            return Err(EcommerceError::conflict("User already exists"));
        }
        if self.store.phone_exists(&phone).await? {
            return Err(EcommerceError::conflict("Phone is already in use"));
        }

        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|_| AuthError::PasswordHash)??;

        let mut user = User::new(Uuid::now_v7(), request.first_name, request.last_name, email, phone, password_hash);
        let TokenPair { token, refresh_token } = self.tokens.issue(user.email.as_str(), &user.first_name, &user.last_name, user.user_id)?;
        user.set_tokens(token, refresh_token);

        self.store.insert_user(&user).await?;
        tracing::info!(user_id = %user.user_id, "user signed up");
        Ok(user)
    }

    /// Verify credentials and return the user carrying freshly issued tokens.
    ///
    /// Persisting the new tokens is best-effort and happens in the background.
    pub async fn login(&self, request: LoginRequest) -> Result<User> {
        let email = Email::parse(&request.email).map_err(|_| AuthError::InvalidCredentials)?;
        let mut user = self.store.find_user_by_email(&email).await?.ok_or(AuthError::InvalidCredentials)?;

        let password = request.password;
        let hash = user.password_hash.clone();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|_| AuthError::PasswordHash)??;

        let tokens = self.tokens.issue(user.email.as_str(), &user.first_name, &user.last_name, user.user_id)?;
        user.set_tokens(tokens.token.clone(), tokens.refresh_token.clone());
        self.persist_tokens(user.user_id, tokens);

        tracing::info!(user_id = %user.user_id, "user logged in");
        Ok(user)
    }

    fn persist_tokens(&self, user_id: Uuid, tokens: TokenPair) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let update = UserUpdate::SetTokens { token: tokens.token, refresh_token: tokens.refresh_token };
            if let Err(err) = store.update_user(user_id, update).await {
                tracing::warn!(target: "storefront_api::token_refresh", %user_id, error = %err, "failed to persist refreshed tokens");
            }
        });
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        self.store.find_user(user_id).await?.ok_or_else(|| EcommerceError::not_found("user"))
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        if !self.store.delete_user(user_id).await? {
            return Err(EcommerceError::not_found("user"));
        }
        tracing::info!(%user_id, "user deleted");
        Ok(())
    }

    /// Add an address; a user holds at most one home and one work address.
    pub async fn add_address(&self, user_id: Uuid, fields: AddressFields) -> Result<Address> {
        fields.validate()?;
        let user = self.store.update_user(user_id, UserUpdate::AddAddress(fields)).await?;
        user.addresses.last().cloned().ok_or_else(|| EcommerceError::not_found("address"))
    }

    /// Replace the address in `role`. Fails with `NotFound` if there is none.
    pub async fn edit_address(&self, user_id: Uuid, role: AddressRole, fields: AddressFields) -> Result<Address> {
        fields.validate()?;
        let user = self.store.update_user(user_id, UserUpdate::SetAddress(role, fields)).await?;
        user.address(role).cloned().ok_or_else(|| EcommerceError::not_found(format!("{role} address")))
    }

    pub async fn clear_addresses(&self, user_id: Uuid) -> Result<()> {
        self.store.update_user(user_id, UserUpdate::ClearAddresses).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::testing::{issuer, seed_user, store};

    fn signup(email: &str, phone: &str) -> SignUpRequest {
        SignUpRequest {
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            password: "wonderland".into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    fn address(house: &str) -> AddressFields {
        AddressFields { house: house.into(), street: "Main St".into(), city: "Springfield".into(), pin_code: "12345".into(), role: None }
    }

    #[tokio::test]
    async fn test_sign_up_initialises_empty_documents() {
        let service = UserService::new(store(), issuer());
        let user = service.sign_up(signup("alice@example.com", "5550100")).await.unwrap();
        assert!(user.cart.is_empty() && user.favorites.is_empty() && user.addresses.is_empty() && user.orders.is_empty());
        assert_ne!(user.password_hash, "wonderland");
        assert_eq!(issuer().validate_access(&user.token).unwrap().uid, user.user_id);
        assert_eq!(service.get_user(user.user_id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email_or_phone() {
        let service = UserService::new(store(), issuer());
        service.sign_up(signup("alice@example.com", "5550100")).await.unwrap();
        let err = service.sign_up(signup("ALICE@example.com", "5550199")).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Conflict(ref m) if m == "User already exists"));
        let err = service.sign_up(signup("bob@example.com", "5550100")).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Conflict(ref m) if m == "Phone is already in use"));
        service.sign_up(signup("bob@example.com", "5550199")).await.unwrap();
    }

    #[tokio::test]
    async fn test_sign_up_validates_fields() {
        let service = UserService::new(store(), issuer());
        let mut bad = signup("not-an-email", "5550100");
        assert!(matches!(service.sign_up(bad).await, Err(EcommerceError::Validation(_))));
        bad = signup("alice@example.com", "5550100");
        bad.password = "123".into();
        assert!(matches!(service.sign_up(bad).await, Err(EcommerceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_blank_padded_fields() {
        let store = store();
        let service = UserService::new(Arc::clone(&store), issuer());

        let mut blank = signup("alice@example.com", "5550100");
        blank.first_name = "  ".into();
        blank.last_name = "  ".into();
        assert!(matches!(service.sign_up(blank).await, Err(EcommerceError::Validation(_))));

        let blank_phone = signup("alice@example.com", "        ");
        assert!(matches!(service.sign_up(blank_phone).await, Err(EcommerceError::Validation(_))));

        // Padding alone must not stretch a one-letter name past the minimum.
        let mut padded = signup("alice@example.com", "5550100");
        padded.first_name = " A ".into();
        assert!(matches!(service.sign_up(padded).await, Err(EcommerceError::Validation(_))));
        assert!(!store.phone_exists("").await.unwrap());

        let mut spaced = signup(" alice@example.com ", " 5550100 ");
        spaced.first_name = "  Alice ".into();
        let user = service.sign_up(spaced).await.unwrap();
        assert_eq!(user.first_name, "Alice");
        assert_eq!(user.phone, "5550100");
        assert_eq!(user.email.as_str(), "alice@example.com");
    }

    #[tokio::test]
    async fn test_login() {
        let store = store();
        let service = UserService::new(Arc::clone(&store), issuer());
        let created = service.sign_up(signup("alice@example.com", "5550100")).await.unwrap();

        let err = service.login(LoginRequest { email: "alice@example.com".into(), password: "wrong-password".into() }).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Auth(AuthError::InvalidCredentials)));
        let err = service.login(LoginRequest { email: "nobody@example.com".into(), password: "wonderland".into() }).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Auth(AuthError::InvalidCredentials)));

        let user = service.login(LoginRequest { email: "Alice@Example.com".into(), password: "wonderland".into() }).await.unwrap();
        let claims = issuer().validate_access(&user.token).unwrap();
        assert_eq!(claims.uid, created.user_id);
        assert!(claims.exp > chrono::Utc::now().timestamp());

        // Token persistence runs in the background.
        let mut persisted = false;
        for _ in 0..50 {
            if store.find_user(created.user_id).await.unwrap().unwrap().token == user.token {
                persisted = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(persisted);
    }

    #[tokio::test]
    async fn test_address_cap_and_roles() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let service = UserService::new(store, issuer());

        assert_eq!(service.add_address(user.user_id, address("1")).await.unwrap().role, AddressRole::Home);
        assert_eq!(service.add_address(user.user_id, address("2")).await.unwrap().role, AddressRole::Work);
        let err = service.add_address(user.user_id, address("3")).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Conflict(_)));

        let edited = service.edit_address(user.user_id, AddressRole::Work, address("22")).await.unwrap();
        assert_eq!(edited.house, "22");
        assert_eq!(service.get_user(user.user_id).await.unwrap().addresses.len(), 2);

        service.clear_addresses(user.user_id).await.unwrap();
        let err = service.edit_address(user.user_id, AddressRole::Home, address("1")).await.unwrap_err();
        assert!(matches!(err, EcommerceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_adds_respect_cap() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let user_id = user.user_id;
        let service = Arc::new(UserService::new(store, issuer()));
        let tasks: Vec<_> = (0..5)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.add_address(user_id, address(&i.to_string())).await })
            })
            .collect();
        let mut ok = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 2);
        assert_eq!(service.get_user(user.user_id).await.unwrap().addresses.len(), 2);
    }

    #[tokio::test]
    async fn test_get_and_delete_unknown_user() {
        let service = UserService::new(store(), issuer());
        assert!(matches!(service.get_user(Uuid::now_v7()).await, Err(EcommerceError::NotFound(_))));
        assert!(matches!(service.delete_user(Uuid::now_v7()).await, Err(EcommerceError::NotFound(_))));
    }
}
