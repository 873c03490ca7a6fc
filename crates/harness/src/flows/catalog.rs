//! Catalog operations: categories, products and favourites.

use ecommerce_harness_core::{CategoryId, ProductId, ResourceKey, ResourceKind, UserId};
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::{FlowError, Steps, id_field};
use crate::client::{ApiClient, collection_items};
use crate::generators::{DataGenerator, like_date_now};
use crate::payloads::{NewCategory, NewProduct};
use crate::registry::CleanupRegistry;

/// Records produced by [`CatalogFlow::complete_product_lifecycle`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLifecycle {
    pub category_id: CategoryId,
    pub created: Value,
    pub updated: Value,
}

/// Operations on product-service and favourite-service.
#[derive(Debug, Clone)]
pub struct CatalogFlow<'a> {
    steps: Steps<'a>,
    generator: DataGenerator,
}

impl<'a> CatalogFlow<'a> {
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

    /// Create a category; a random one when `category` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip_all)]
    pub async fn create_category(&self, category: Option<NewCategory>) -> Result<Value, FlowError> {
        let category = category.unwrap_or_else(|| self.generator.category());
        self.steps
            .create("create_category", ResourceKind::Category, &category)
            .await
    }

    /// Create a product; a random one in `category_id` when `product` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self, product))]
    pub async fn create_product(
        &self,
        category_id: CategoryId,
        product: Option<NewProduct>,
    ) -> Result<Value, FlowError> {
        let product = product.unwrap_or_else(|| self.generator.product(category_id));
        self.steps
            .create("create_product", ResourceKind::Product, &product)
            .await
    }

    /// Update a product with `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_product(&self, product: &Value, changes: Value) -> Result<Value, FlowError> {
        self.steps
            .update("update_product", ResourceKind::Product, product, changes)
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<(), FlowError> {
        self.steps
            .delete(
                "delete_product",
                ResourceKind::Product,
                &ResourceKey::from(product_id),
            )
            .await
    }

    /// Mark a product as a user's favourite, liked now.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn add_favourite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Value, FlowError> {
        self.steps
            .create(
                "add_favourite",
                ResourceKind::Favourite,
                &self.generator.favourite(user_id, product_id),
            )
            .await
    }

    /// Re-like a favourite with the current timestamp.
    ///
    /// The `likeDate` is part of the key, so the tracked key is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_favourite(&self, favourite: &Value) -> Result<Value, FlowError> {
        self.steps
            .update(
                "update_favourite",
                ResourceKind::Favourite,
                favourite,
                json!({"likeDate": like_date_now()}),
            )
            .await
    }

    /// Remove a favourite by its record.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::MissingField` if the record lacks its key, or an
    /// error if the request fails or returns non-2xx.
    #[instrument(skip_all)]
    pub async fn remove_favourite(&self, favourite: &Value) -> Result<(), FlowError> {
        let kind = ResourceKind::Favourite;
        let key = kind
            .key_from_record(favourite)
            .ok_or(FlowError::MissingField {
                operation: "remove_favourite",
                field: "likeDate",
            })?;
        self.steps.delete("remove_favourite", kind, &key).await
    }

    /// Products whose `categoryDto.categoryId` is `category_id`.
    ///
    /// Filters the full collection locally; the service ignores query filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Value>, FlowError> {
        let kind = ResourceKind::Product;
        let category = category_id.to_string();
        let response = self
            .steps
            .client
            .get_with_params(
                kind.service(),
                kind.endpoint(),
                &[("categoryId", category.as_str())],
            )
            .await?;
        let record = Steps::expect_success("products_in_category", &response)?;

        let wanted = i64::from(category_id.as_i32());
        Ok(collection_items(record)
            .into_iter()
            .filter(|product| {
                product
                    .pointer("/categoryDto/categoryId")
                    .and_then(Value::as_i64)
                    == Some(wanted)
            })
            .collect())
    }

    /// Create (optionally) a category, then create, update and delete a
    /// product in it.
    ///
    /// # Errors
    ///
    /// Returns the first step's error.
    #[instrument(skip(self))]
    pub async fn complete_product_lifecycle(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<ProductLifecycle, FlowError> {
        let category_id = match category_id {
            Some(id) => id,
            None => {
                let category = self.create_category(None).await?;
                id_field("create_category", &category, "categoryId")?
            }
        };

        let created = self.create_product(category_id, None).await?;
        let product_id: ProductId = id_field("create_product", &created, "productId")?;

        let title = created
            .get("productTitle")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let quantity = created
            .get("quantity")
            .and_then(Value::as_i64)
            .unwrap_or_default();
        let updated = self
            .update_product(
                &created,
                json!({
                    "productTitle": format!("{title} (updated)"),
                    "quantity": quantity + 5,
                }),
            )
            .await?;

        self.delete_product(product_id).await?;

        info!(%product_id, %category_id, "Product lifecycle completed");
        Ok(ProductLifecycle {
            category_id,
            created,
            updated,
        })
    }
}
