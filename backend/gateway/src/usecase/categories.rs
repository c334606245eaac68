use std::sync::Arc;

use serde::de::IgnoredAny;

use crate::domain::category::{Category, CreateCategory, UpdateCategory};
use crate::domain::envelope::Envelope;
use crate::domain::listing::Listing;
use crate::usecase::client::ApiClient;

#[derive(Clone)]
pub struct CategoriesApi {
    client: Arc<ApiClient>,
}

impl CategoriesApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Envelope<Vec<Category>> {
        let result = self
            .client
            .get::<Listing<Category>>("/category")
            .await
            .map(Listing::into_items);
        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to fetch categories");
        }
        Envelope::from_result(result, "Failed to load categories")
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Envelope<Category> {
        let result = self.client.get(&format!("/category/{id}")).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, category_id = id, "failed to fetch category");
        }
        Envelope::from_result(result, "Failed to load category")
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: &CreateCategory) -> Envelope<Category> {
        let result = self.client.post_json::<Category, _>("/category", draft).await;
        match &result {
            Ok(category) => tracing::info!(category_id = category.id, "category created"),
            Err(e) => tracing::error!(error = %e, "failed to create category"),
        }
        Envelope::from_result(result, "Failed to create category")
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn update(&self, id: i64, draft: &UpdateCategory) -> Envelope<Category> {
        let result = self
            .client
            .patch_json::<Category, _>(&format!("/category/{id}"), draft)
            .await;
        match &result {
            Ok(_) => tracing::info!(category_id = id, "category updated"),
            Err(e) => tracing::error!(error = %e, category_id = id, "failed to update category"),
        }
        Envelope::from_result(result, "Failed to update category")
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Envelope<()> {
        let result = self
            .client
            .delete::<IgnoredAny>(&format!("/category/{id}"))
            .await
            .map(|_| ());
        match &result {
            Ok(()) => tracing::info!(category_id = id, "category deleted"),
            Err(e) => tracing::error!(error = %e, category_id = id, "failed to delete category"),
        }
        Envelope::from_result(result, "Failed to delete category")
    }
}
