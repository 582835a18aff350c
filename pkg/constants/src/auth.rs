//! Authentication and RBAC constants.

/// API group carried by every roleRef entry.
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Lifetime requested for service-account tokens issued via the TokenRequest
/// subresource, in seconds.
pub const TOKEN_TTL_SECONDS: i64 = 3600;
