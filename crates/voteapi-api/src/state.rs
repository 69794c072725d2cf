//! Shared application state handed to every handler.

use voteapi_db::Store;

use crate::auth::AdminCredentials;

/// What handlers and middleware need per request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The data layer.
    pub store: Store,
    /// Credentials required for mutations.
    pub admin: AdminCredentials,
}

impl AppState {
    /// Bundle a store with the admin credentials.
    pub const fn new(store: Store, admin: AdminCredentials) -> Self {
        Self { store, admin }
    }
}
