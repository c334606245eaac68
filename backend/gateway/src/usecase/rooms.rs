use std::sync::Arc;

use serde::de::IgnoredAny;

use crate::domain::envelope::Envelope;
use crate::domain::listing::Listing;
use crate::domain::room::{CreateRoom, Room, UpdateRoom};
use crate::usecase::client::ApiClient;
use crate::usecase::error::ApiError;

#[derive(Clone)]
pub struct RoomsApi {
    client: Arc<ApiClient>,
}

impl RoomsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Envelope<Vec<Room>> {
        let result = self
            .client
            .get::<Listing<Room>>("/rooms")
            .await
            .map(Listing::into_items);
        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to fetch rooms");
        }
        Envelope::from_result(result, "Failed to load rooms")
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Envelope<Room> {
        let result = self.client.get::<Room>(&format!("/rooms/{id}")).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, room_id = id, "failed to fetch room");
        }
        Envelope::from_result(result, "Failed to load room")
    }

    /// Sends JSON when the draft has no files, `multipart/form-data` otherwise.
    #[tracing::instrument(skip(self, draft), fields(title = %draft.title, files = draft.files.len()))]
    pub async fn create(&self, draft: &CreateRoom) -> Envelope<Room> {
        let result: Result<Room, ApiError> = if draft.files.is_empty() {
            self.client.post_json("/rooms", draft).await
        } else {
            self.client
                .post_multipart("/rooms", draft.to_multipart())
                .await
        };

        match &result {
            Ok(room) => tracing::info!(room_id = room.id, "room created"),
            Err(e) => tracing::error!(error = %e, "failed to create room"),
        }
        Envelope::from_result(result, "Failed to create room")
    }

    #[tracing::instrument(skip(self, draft), fields(files = draft.files.len()))]
    pub async fn update(&self, id: i64, draft: &UpdateRoom) -> Envelope<Room> {
        let endpoint = format!("/rooms/{id}");
        let result: Result<Room, ApiError> = if draft.files.is_empty() {
            self.client.patch_json(&endpoint, draft).await
        } else {
            self.client
                .patch_multipart(&endpoint, draft.to_multipart())
                .await
        };

        match &result {
            Ok(_) => tracing::info!(room_id = id, "room updated"),
            Err(e) => tracing::error!(error = %e, room_id = id, "failed to update room"),
        }
        Envelope::from_result(result, "Failed to update room")
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Envelope<()> {
        let result = self
            .client
            .delete::<IgnoredAny>(&format!("/rooms/{id}"))
            .await
            .map(|_| ());

        match &result {
            Ok(()) => tracing::info!(room_id = id, "room deleted"),
            Err(e) => tracing::error!(error = %e, room_id = id, "failed to delete room"),
        }
        Envelope::from_result(result, "Failed to delete room")
    }
}
