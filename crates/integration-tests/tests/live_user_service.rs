//! Live suite for user-service: users, addresses, credentials and
//! verification tokens.
//!
//! These tests require a deployed platform.
//!
//! Run with: cargo test -p ecommerce-harness-integration-tests -- --ignored

use ecommerce_harness::assertions::{
    JsonType, assert_contains_keys, assert_entity_values, assert_status, validate_schema,
};
use ecommerce_harness::flows::UserFlow;
use ecommerce_harness::generators::DataGenerator;
use ecommerce_harness_core::{
    AddressId, CredentialId, ResourceKind, ServiceName, UserId, VerificationTokenId,
};
use ecommerce_harness_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

fn id<T: From<i32>>(record: &Value, field: &str) -> T {
    record[field]
        .as_i64()
        .and_then(|id| i32::try_from(id).ok())
        .map(T::from)
        .unwrap_or_else(|| panic!("missing {field} in {record}"))
}

fn user_id(record: &Value) -> UserId {
    id(record, "userId")
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_user_find_all() {
    let ctx = TestContext::from_env().expect("config");

    let response = ctx
        .client
        .get(ServiceName::UserService, "api/users")
        .await
        .expect("request");

    assert_status(&response, StatusCode::OK).expect("status");
    validate_schema(
        &response.record().expect("json"),
        &[
            ("userId", JsonType::Integer),
            ("firstName", JsonType::String),
            ("email", JsonType::String),
        ],
    )
    .expect("schema");
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_user_create_echoes_input() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let generator = DataGenerator::from_config(ctx.client.config());
            let input = generator.user();

            let created = UserFlow::new(&ctx.client)
                .with_registry(&ctx.registry)
                .register_user(Some(input.clone()))
                .await
                .expect("create");

            let expected = json!({
                "firstName": input.first_name,
                "lastName": input.last_name,
                "email": input.email,
            });
            assert_entity_values(&created, expected.as_object().expect("object")).expect("echo");

            let key = ResourceKind::User.key_from_record(&created).expect("key");
            let fetched = ctx
                .client
                .find(ResourceKind::User, &key)
                .await
                .expect("request")
                .expect("user exists");
            assert_eq!(fetched["email"], created["email"]);
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_user_update_and_delete() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let user = flow.register_user(None).await.expect("create");
            let updated = flow
                .update_user(&user, json!({"firstName": "Updated"}))
                .await
                .expect("update");
            assert_eq!(updated["firstName"], "Updated");
            assert_eq!(updated["email"], user["email"]);

            flow.delete_user(user_id(&user)).await.expect("delete");
            let key = ResourceKind::User.key_from_record(&user).expect("key");
            assert!(
                ctx.client
                    .find(ResourceKind::User, &key)
                    .await
                    .expect("request")
                    .is_none()
            );
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_address_belongs_to_user() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let user = flow.register_user(None).await.expect("user");
            let address = flow.add_address(user_id(&user), None).await.expect("address");

            assert_contains_keys(&address, &["addressId", "fullAddress", "postalCode", "city"])
                .expect("keys");
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_credential_lookup_by_username() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let setup = flow
                .complete_user_setup(None, None, false)
                .await
                .expect("setup");
            let username = setup.credential["username"].as_str().expect("username");

            let found = flow
                .find_credential_by_username(username)
                .await
                .expect("lookup")
                .expect("credential exists");
            assert_eq!(found["credentialId"], setup.credential["credentialId"]);
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_verification_token_for_credential() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let setup = flow
                .complete_user_setup(None, None, false)
                .await
                .expect("setup");
            let credential_id: CredentialId = id(&setup.credential, "credentialId");

            let token = flow
                .create_verification_token(credential_id)
                .await
                .expect("token");
            assert_contains_keys(&token, &["verificationTokenId", "token", "expireDate"]).expect("keys");
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_user_update_by_id_and_find_by_username() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let setup = flow
                .complete_user_setup(None, None, false)
                .await
                .expect("setup");
            let updated = flow
                .update_user_by_id(
                    user_id(&setup.user),
                    &json!({
                        "firstName": "UpdatedById",
                        "lastName": setup.user["lastName"],
                        "email": setup.user["email"],
                        "phone": setup.user["phone"],
                    }),
                )
                .await
                .expect("update by id");
            assert_eq!(updated["firstName"], "UpdatedById");

            let username = setup.credential["username"].as_str().expect("username");
            let found = flow
                .find_user_by_username(username)
                .await
                .expect("lookup")
                .expect("user exists");
            assert_eq!(found["userId"], setup.user["userId"]);
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_address_update_and_delete() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let user = flow.register_user(None).await.expect("user");
            let address = flow.add_address(user_id(&user), None).await.expect("address");
            let address_id: AddressId = id(&address, "addressId");

            let updated = flow
                .update_address(&address, json!({"city": "Updated City"}))
                .await
                .expect("update");
            assert_eq!(updated["city"], "Updated City");
            assert_eq!(updated["postalCode"], address["postalCode"]);

            let by_id = flow
                .update_address_by_id(
                    address_id,
                    &json!({
                        "fullAddress": "456 Updated Street",
                        "postalCode": address["postalCode"],
                        "city": "Updated City",
                    }),
                )
                .await
                .expect("update by id");
            assert_eq!(by_id["fullAddress"], "456 Updated Street");

            flow.delete_address(address_id).await.expect("delete");
            assert!(
                ctx.client
                    .find(ResourceKind::Address, &address_id.into())
                    .await
                    .expect("request")
                    .is_none()
            );
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_credential_update_and_delete() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let setup = flow
                .complete_user_setup(None, None, false)
                .await
                .expect("setup");
            let credential_id: CredentialId = id(&setup.credential, "credentialId");

            let disabled = flow
                .update_credential(&setup.credential, json!({"isEnabled": false}))
                .await
                .expect("update");
            assert_eq!(disabled["isEnabled"], false);
            assert_eq!(disabled["username"], setup.credential["username"]);

            let admin = flow
                .update_credential_by_id(
                    credential_id,
                    &json!({
                        "username": setup.credential["username"],
                        "password": setup.credential["password"],
                        "roleBasedAuthority": "ROLE_ADMIN",
                        "isEnabled": true,
                        "isAccountNonExpired": true,
                        "isAccountNonLocked": true,
                        "isCredentialsNonExpired": true,
                    }),
                )
                .await
                .expect("update by id");
            assert_eq!(admin["roleBasedAuthority"], "ROLE_ADMIN");

            flow.delete_credential(credential_id).await.expect("delete");
            assert!(
                ctx.client
                    .find(ResourceKind::Credential, &credential_id.into())
                    .await
                    .expect("request")
                    .is_none()
            );
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_verification_token_update_and_delete() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let setup = flow
                .complete_user_setup(None, None, false)
                .await
                .expect("setup");
            let token = flow
                .create_verification_token(id(&setup.credential, "credentialId"))
                .await
                .expect("token");
            let token_id: VerificationTokenId = id(&token, "verificationTokenId");

            let updated = flow
                .update_verification_token(&token, json!({"expireDate": "28-02-2025"}))
                .await
                .expect("update");
            assert_eq!(updated["expireDate"], "28-02-2025");
            assert_eq!(updated["token"], token["token"]);

            let by_id = flow
                .update_verification_token_by_id(
                    token_id,
                    &json!({"token": "updated_token", "expireDate": "30-06-2025"}),
                )
                .await
                .expect("update by id");
            assert_eq!(by_id["expireDate"], "30-06-2025");

            flow.delete_verification_token(token_id)
                .await
                .expect("delete");
            assert!(
                ctx.client
                    .find(ResourceKind::VerificationToken, &token_id.into())
                    .await
                    .expect("request")
                    .is_none()
            );
        })
        .await;
}
