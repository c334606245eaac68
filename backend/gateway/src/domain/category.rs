use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCategory {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_backend_json() {
        let category: Category = serde_json::from_str(
            r#"{"id": 3, "name": "Lux", "createdAt": "2024-05-01T10:00:00.000Z", "updatedAt": "2024-05-02T10:00:00.000Z"}"#,
        )
        .unwrap();

        assert_eq!(category.id, 3);
        assert_eq!(category.name, "Lux");
        assert!(category.updated_at > category.created_at);
    }

    #[test]
    fn test_empty_update_serializes_to_empty_object() {
        let body = serde_json::to_value(UpdateCategory::default()).unwrap();

        assert_eq!(body, serde_json::json!({}));
    }
}
