use serde::Serialize;

/// Dashboard figures derived from the room list.
///
/// The backend has no room status yet, so availability is estimated with the
/// fixed 70% available / 25% occupied split the dashboard has always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_rooms: usize,
    pub available_rooms: usize,
    pub occupied_rooms: usize,
    pub maintenance_rooms: usize,
    /// Percent, rounded half up.
    pub occupancy_rate: usize,
}

impl DashboardStats {
    pub fn from_room_count(total_rooms: usize) -> Self {
        let available_rooms = total_rooms * 7 / 10;
        let occupied_rooms = total_rooms / 4;
        let maintenance_rooms = total_rooms - available_rooms - occupied_rooms;
        let occupancy_rate = if total_rooms == 0 {
            0
        } else {
            (occupied_rooms * 200 + total_rooms) / (total_rooms * 2)
        };

        Self {
            total_rooms,
            available_rooms,
            occupied_rooms,
            maintenance_rooms,
            occupancy_rate,
        }
    }
}
