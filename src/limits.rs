use chrono::Weekday;

/// Minimum number of calendar days between today and a bookable date.
pub const MIN_LEAD_DAYS: i64 = 2;

/// No bookings are taken on this weekday.
pub const EXCLUDED_WEEKDAY: Weekday = Weekday::Sun;

/// Day/month/year, the only accepted textual date pattern.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EVENT_NAME_LEN: usize = 200;
pub const MAX_INPUT_LINE_LEN: usize = 1024;

pub const MAX_CLIENTS: usize = 100_000;
pub const MAX_ROOMS: usize = 10_000;
pub const MAX_BOOKINGS: usize = 1_000_000;
