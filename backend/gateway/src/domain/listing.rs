use serde::Deserialize;

/// `{ "data": [...] }` wrapper the backend puts around collection responses.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    data: Option<Vec<T>>,
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;

    #[test]
    fn test_missing_or_null_data_is_empty() {
        let missing: Listing<i64> = serde_json::from_str("{}").unwrap();
        let null: Listing<i64> = serde_json::from_str(r#"{"data": null}"#).unwrap();
        let items: Listing<i64> = serde_json::from_str(r#"{"data": [1, 2]}"#).unwrap();

        assert!(missing.into_items().is_empty());
        assert!(null.into_items().is_empty());
        assert_eq!(items.into_items(), vec![1, 2]);
    }

    #[test]
    fn test_items_without_default_impl() {
        let listing: Listing<Category> =
            serde_json::from_str(r#"{"data": [{"id": 1, "name": "Standard"}]}"#).unwrap();
        let empty: Listing<Category> = serde_json::from_str("{}").unwrap();

        assert_eq!(listing.into_items()[0].name, "Standard");
        assert!(empty.into_items().is_empty());
    }
}
