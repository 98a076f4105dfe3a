/// Prefix for all versioned API routes.
pub const API_PREFIX: &str = "/api/v0";

/// Upper bound for `GET /tokens?length=`.
pub const MAX_TOKEN_LENGTH: usize = 1024;

/// Token length when the query omits one.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;
