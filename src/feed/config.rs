pub struct Config {
    pub stops_path: String,
    pub calendar_dates_path: String,
    pub trips_path: String,
    pub stop_times_path: String,
    pub operations_path: String,
    pub attributions_path: String,
    pub delay_codes_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // stops carry a pre-computed embedding column, hence .csv
            stops_path: "stops.csv".into(),
            calendar_dates_path: "calendar_dates.txt".into(),
            trips_path: "trips.txt".into(),
            stop_times_path: "stop_times.txt".into(),
            operations_path: "L101.csv".into(),
            attributions_path: "L102.csv".into(),
            delay_codes_path: "DelayCodeInfo.csv".into(),
        }
    }
}
