/// Router Module Index
///
/// Routes are split by who may call them. Access control is attached per module
/// in `create_router`, so a handler cannot end up public by accident.

/// Read-only endpoints for the public site. Repository queries only ever return
/// published rows here.
pub mod public;

/// Login, refresh, logout and token verification for the admin panel.
pub mod auth;

/// Content management. Wrapped in `require_admin`.
pub mod admin;
