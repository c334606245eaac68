use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::upload::{FileAttachment, MultipartForm};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    pub category_id: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<RoomImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomImage {
    pub id: i64,
    pub url: String,
    pub room_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoomImage {
    pub fn proxy_path(&self) -> String {
        proxy_image_path(&self.url)
    }
}

/// Maps a backend upload URL onto the site's `/api/images` proxy.
/// Absolute `http(s)` URLs are returned unchanged.
pub fn proxy_image_path(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("/uploads/") {
        return format!("/api/images/{rest}");
    }
    if url.starts_with("http") {
        return url.to_string();
    }
    match url.split_once("uploads/") {
        Some((_, rest)) => format!("/api/images/{rest}"),
        None => url.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub title: String,
    pub description: String,
    pub price: String,
    pub category_id: i64,
    pub amenities: Vec<String>,
    #[serde(skip)]
    pub files: Vec<FileAttachment>,
}

impl CreateRoom {
    pub fn to_multipart(&self) -> MultipartForm {
        let form = MultipartForm::new()
            .text("title", &self.title)
            .text("description", &self.description)
            .text("price", &self.price)
            .text("categoryId", self.category_id.to_string());
        let form = self
            .amenities
            .iter()
            .fold(form, |form, amenity| form.text("amenities[]", amenity));
        attach_files(form, &self.files)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    /// Image ids to remove, sent next to any new uploads.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delete_images: Vec<i64>,
    #[serde(skip)]
    pub files: Vec<FileAttachment>,
}

impl UpdateRoom {
    pub fn to_multipart(&self) -> MultipartForm {
        let mut form = MultipartForm::new();
        if let Some(title) = &self.title {
            form = form.text("title", title);
        }
        if let Some(description) = &self.description {
            form = form.text("description", description);
        }
        if let Some(price) = &self.price {
            form = form.text("price", price);
        }
        if let Some(category_id) = self.category_id {
            form = form.text("categoryId", category_id.to_string());
        }
        for amenity in self.amenities.iter().flatten() {
            form = form.text("amenities[]", amenity);
        }
        for image_id in &self.delete_images {
            form = form.text("deleteImages[]", image_id.to_string());
        }
        attach_files(form, &self.files)
    }
}

fn attach_files(form: MultipartForm, files: &[FileAttachment]) -> MultipartForm {
    files
        .iter()
        .cloned()
        .fold(form, |form, file| form.file("files", file))
}
