use crate::domain::envelope::Envelope;
use crate::domain::stats::DashboardStats;
use crate::usecase::rooms::RoomsApi;

const STATS_FAILED: &str = "Failed to load statistics";

#[derive(Clone)]
pub struct StatsApi {
    rooms: RoomsApi,
}

impl StatsApi {
    pub fn new(rooms: RoomsApi) -> Self {
        Self { rooms }
    }

    #[tracing::instrument(skip(self))]
    pub async fn dashboard(&self) -> Envelope<DashboardStats> {
        match self.rooms.list().await.into_result() {
            Ok(rooms) => {
                let stats = DashboardStats::from_room_count(rooms.len());
                tracing::debug!(total_rooms = stats.total_rooms, "dashboard stats computed");
                Envelope::ok(stats)
            }
            Err(message) => {
                tracing::error!(error = %message, "failed to compute dashboard stats");
                Envelope::failure(STATS_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::GatewayConfig;
    use crate::usecase::auth_store::AuthStore;
    use crate::usecase::client::ApiClient;

    fn stats_api(server: &MockServer) -> StatsApi {
        let config = GatewayConfig {
            api_base_url: format!("{}/api", server.uri()),
            ..GatewayConfig::default()
        };
        let client = ApiClient::new(&config, Arc::new(AuthStore::in_memory())).unwrap();
        client
            .store()
            .set_tokens("access", "refresh", Duration::from_secs(7200), None);
        StatsApi::new(RoomsApi::new(Arc::new(client)))
    }

    #[tokio::test]
    async fn test_dashboard_from_room_list() {
        let server = MockServer::start().await;
        let rooms: Vec<_> = (1..=10)
            .map(|id| json!({"id": id, "title": "Room", "price": "100", "categoryId": 1}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/api/rooms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": rooms})))
            .mount(&server)
            .await;

        let envelope = stats_api(&server).dashboard().await;

        assert_eq!(envelope.data(), Some(&DashboardStats {
            total_rooms: 10,
            available_rooms: 7,
            occupied_rooms: 2,
            maintenance_rooms: 1,
            occupancy_rate: 20,
        }));
    }

    #[tokio::test]
    async fn test_room_failure_gives_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/rooms"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
            .mount(&server)
            .await;

        let envelope = stats_api(&server).dashboard().await;

        assert_eq!(envelope.error(), Some(STATS_FAILED));
    }
}
