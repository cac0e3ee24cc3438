//! Fixed paths, cookie names and defaults of the Service Layer API

/// Login endpoint, relative to the base URL
pub const LOGIN_PATH: &str = "Login";

/// Logout endpoint, relative to the base URL
pub const LOGOUT_PATH: &str = "Logout";

/// Path suffix returning the bare record count of a resource
pub const COUNT_SUFFIX: &str = "/$count";

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "B1SESSION";

/// Load-balancer affinity cookie some deployments set at login
pub const ROUTE_COOKIE: &str = "ROUTEID";

/// Language code sent when the options leave it unset
pub const DEFAULT_LANGUAGE: i32 = 25;

/// Added to the login timestamp to absorb latency and clock drift
pub const LOGIN_SKEW_SECS: i64 = 1;

/// Date/time literal format used in filters and key predicates
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
