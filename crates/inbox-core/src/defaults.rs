//! Centralized default values.
//!
//! Every tunable that has a fallback lives here so the API, the repositories
//! and the dashboard client agree on the same numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for inbox and document listings.
pub const PAGE_LIMIT: i64 = 20;

/// Largest page size a caller may request.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// Default number of results returned by inbox search.
pub const SEARCH_LIMIT: i64 = 10;

// =============================================================================
// VALIDATION
// =============================================================================

/// Minimum team name length (characters, after trimming).
pub const TEAM_NAME_MIN_LEN: usize = 2;

/// Maximum team name length (characters, after trimming).
pub const TEAM_NAME_MAX_LEN: usize = 64;

/// Maximum length of an inbox display name.
pub const DISPLAY_NAME_MAX_LEN: usize = 255;

/// Maximum length of a document tag name.
pub const TAG_NAME_MAX_LEN: usize = 100;

/// Maximum number of attachments accepted in one processing batch.
pub const ATTACHMENT_BATCH_MAX: usize = 100;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP port.
pub const SERVER_PORT: u16 = 3000;

/// Default database URL when `DATABASE_URL` is unset.
pub const DATABASE_URL: &str = "postgres://localhost/inbox";

/// Default CORS origin (the dashboard dev server).
pub const ALLOWED_ORIGINS: &str = "http://localhost:3001";

/// CORS preflight cache lifetime.
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size.
pub const MAX_BODY_SIZE_BYTES: usize = 1024 * 1024;

/// Default maximum number of pooled database connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// DASHBOARD
// =============================================================================

/// Path the dashboard navigates to after switching teams.
pub const DASHBOARD_ROOT: &str = "/";

/// Currency preselected in the team form when none can be detected.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Timeout for dashboard procedure calls.
pub const CLIENT_TIMEOUT_SECS: u64 = 30;
