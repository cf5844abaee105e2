/// Router Module Index
///
/// Splits the API by who may call it. The split is for readability: the identity
/// middleware runs on every route, and the access gate inside each engine is what
/// actually allows or rejects a call.

/// Routes open to anonymous callers.
pub mod public;

/// Routes whose operations require a resolved principal.
pub mod authenticated;

/// Routes restricted to admins, nested under `/admin`.
pub mod admin;
