// Signal strength normalization to 0..=100

/// Used when a tool reports something that is not a dBm value.
pub const WEAKEST_DBM: i32 = -100;

/// Linear map: -90 dBm → 0 %, -30 dBm → 100 %, clamped.
pub fn dbm_to_percent(dbm: i32) -> u8 {
    ((i64::from(dbm) + 90) * 100 / 60).clamp(0, 100) as u8
}

/// Parse a raw dBm column; garbage lands in the weakest bucket.
pub fn parse_dbm_percent(raw: &str) -> u8 {
    let dbm = raw.trim().parse::<i32>().unwrap_or(WEAKEST_DBM);
    dbm_to_percent(dbm)
}

/// Parse a column that is already a percentage; garbage → 0.
pub fn parse_percent(raw: &str) -> u8 {
    raw.trim()
        .parse::<i64>()
        .map(|v| v.clamp(0, 100) as u8)
        .unwrap_or(0)
}
