//! User lifecycle: registration, credentials, addresses and tokens.

use ecommerce_harness_core::{
    AddressId, CredentialId, ResourceKey, ResourceKind, UserId, VerificationTokenId,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::{FlowError, Steps, id_field};
use crate::client::ApiClient;
use crate::generators::DataGenerator;
use crate::payloads::{NewAddress, NewCredential, NewUser};
use crate::registry::CleanupRegistry;

/// Records produced by [`UserFlow::complete_user_setup`].
#[derive(Debug, Clone, PartialEq)]
pub struct UserSetup {
    pub user: Value,
    pub credential: Value,
    pub address: Option<Value>,
}

/// Operations on user-service.
#[derive(Debug, Clone)]
pub struct UserFlow<'a> {
    steps: Steps<'a>,
    generator: DataGenerator,
}

impl<'a> UserFlow<'a> {
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            steps: Steps::new(client, None),
            generator: DataGenerator::from_config(client.config()),
        }
    }

    /// Track every created resource in `registry`.
    #[must_use]
    pub fn with_registry(mut self, registry: &'a CleanupRegistry) -> Self {
        self.steps.registry = Some(registry);
        self
    }

    /// Register a user; a random one when `user` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip_all)]
    pub async fn register_user(&self, user: Option<NewUser>) -> Result<Value, FlowError> {
        let user = user.unwrap_or_else(|| self.generator.user());
        let record = self
            .steps
            .create("register_user", ResourceKind::User, &user)
            .await?;
        info!(email = %user.email, "Registered user");
        Ok(record)
    }

    /// Create credentials for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self, password))]
    pub async fn create_credentials(
        &self,
        user_id: UserId,
        username: &str,
        password: &str,
    ) -> Result<Value, FlowError> {
        let mut credential = self.generator.credential(user_id);
        credential.username = username.to_string();
        credential.password = password.to_string();
        self.steps
            .create("create_credentials", ResourceKind::Credential, &credential)
            .await
    }

    /// Add an address; a random one when `address` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self, address))]
    pub async fn add_address(
        &self,
        user_id: UserId,
        address: Option<NewAddress>,
    ) -> Result<Value, FlowError> {
        let address = address.unwrap_or_else(|| self.generator.address(user_id));
        self.steps
            .create("add_address", ResourceKind::Address, &address)
            .await
    }

    /// Issue a verification token for a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn create_verification_token(
        &self,
        credential_id: CredentialId,
    ) -> Result<Value, FlowError> {
        self.steps
            .create(
                "create_verification_token",
                ResourceKind::VerificationToken,
                &self.generator.verification_token(credential_id),
            )
            .await
    }

    /// Update a user with `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_user(&self, user: &Value, changes: Value) -> Result<Value, FlowError> {
        self.steps
            .update("update_user", ResourceKind::User, user, changes)
            .await
    }

    /// `PUT` `fields` on `api/users/{user_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_user_by_id(
        &self,
        user_id: UserId,
        fields: &Value,
    ) -> Result<Value, FlowError> {
        self.steps
            .update_by_id(
                "update_user_by_id",
                ResourceKind::User,
                &user_id.into(),
                fields,
            )
            .await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), FlowError> {
        self.steps
            .delete("delete_user", ResourceKind::User, &ResourceKey::from(user_id))
            .await
    }

    /// Update an address with `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_address(&self, address: &Value, changes: Value) -> Result<Value, FlowError> {
        self.steps
            .update("update_address", ResourceKind::Address, address, changes)
            .await
    }

    /// `PUT` `fields` on `api/address/{address_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_address_by_id(
        &self,
        address_id: AddressId,
        fields: &Value,
    ) -> Result<Value, FlowError> {
        self.steps
            .update_by_id(
                "update_address_by_id",
                ResourceKind::Address,
                &address_id.into(),
                fields,
            )
            .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, address_id: AddressId) -> Result<(), FlowError> {
        self.steps
            .delete("delete_address", ResourceKind::Address, &address_id.into())
            .await
    }

    /// Update a credential with `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_credential(
        &self,
        credential: &Value,
        changes: Value,
    ) -> Result<Value, FlowError> {
        self.steps
            .update("update_credential", ResourceKind::Credential, credential, changes)
            .await
    }

    /// `PUT` `fields` on `api/credentials/{credential_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_credential_by_id(
        &self,
        credential_id: CredentialId,
        fields: &Value,
    ) -> Result<Value, FlowError> {
        self.steps
            .update_by_id(
                "update_credential_by_id",
                ResourceKind::Credential,
                &credential_id.into(),
                fields,
            )
            .await
    }

    /// Delete a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_credential(&self, credential_id: CredentialId) -> Result<(), FlowError> {
        self.steps
            .delete("delete_credential", ResourceKind::Credential, &credential_id.into())
            .await
    }

    /// Update a verification token with `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_verification_token(
        &self,
        token: &Value,
        changes: Value,
    ) -> Result<Value, FlowError> {
        self.steps
            .update(
                "update_verification_token",
                ResourceKind::VerificationToken,
                token,
                changes,
            )
            .await
    }

    /// `PUT` `fields` on `api/verificationTokens/{token_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_verification_token_by_id(
        &self,
        token_id: VerificationTokenId,
        fields: &Value,
    ) -> Result<Value, FlowError> {
        self.steps
            .update_by_id(
                "update_verification_token_by_id",
                ResourceKind::VerificationToken,
                &token_id.into(),
                fields,
            )
            .await
    }

    /// Delete a verification token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_verification_token(
        &self,
        token_id: VerificationTokenId,
    ) -> Result<(), FlowError> {
        self.steps
            .delete(
                "delete_verification_token",
                ResourceKind::VerificationToken,
                &token_id.into(),
            )
            .await
    }

    /// Look up a user by the username of one of its credentials. Any non-2xx
    /// status yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or decode failure.
    #[instrument(skip(self))]
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<Value>, FlowError> {
        self.steps
            .find_by_username(ResourceKind::User, username)
            .await
    }

    /// Look up a credential by username. Any non-2xx status yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or decode failure.
    #[instrument(skip(self))]
    pub async fn find_credential_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Value>, FlowError> {
        self.steps
            .find_by_username(ResourceKind::Credential, username)
            .await
    }

    /// Register a user, create credentials and optionally add an address.
    ///
    /// # Errors
    ///
    /// Returns the first step's error.
    #[instrument(skip_all)]
    pub async fn complete_user_setup(
        &self,
        user: Option<NewUser>,
        credential: Option<NewCredential>,
        with_address: bool,
    ) -> Result<UserSetup, FlowError> {
        let user = self.register_user(user).await?;
        let user_id: UserId = id_field("register_user", &user, "userId")?;

        let credential = credential.unwrap_or_else(|| self.generator.credential(user_id));
        let credential = self
            .create_credentials(user_id, &credential.username, &credential.password)
            .await?;

        let address = if with_address {
            Some(self.add_address(user_id, None).await?)
        } else {
            None
        };

        info!(%user_id, "User setup completed");
        Ok(UserSetup {
            user,
            credential,
            address,
        })
    }
}
