/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Owners are opaque ids issued by the identity provider (JWT `sub`).
pub type OwnerId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
