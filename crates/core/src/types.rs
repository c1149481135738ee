/// Primary keys are PostgreSQL BIGSERIAL values.
pub type DbId = i64;

/// Timestamps are always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
