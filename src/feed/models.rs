use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopRow {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    /// Textual float-array literal, e.g. "[0.12, -0.5, ...]"
    pub embedding: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CalendarDateRow {
    pub service_id: String,
    pub date: u32,
    pub exception_type: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TripRow {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub stop_headsign: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct OperationRow {
    pub operation_date_time: String,
    pub trip_id: String,
    pub corridor_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct AttributionRow {
    pub trip_id: String,
    pub delay_code: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct DelayCodeRow {
    pub delay_code: String,
    pub delay_reason: String,
}
