//! Typed client for the RoleFit hardware benchmarking backend.
//!
//! - [`ApiClient`]: shared transport (base URL, bearer token, error mapping)
//! - [`api`]: one module per backend resource, reached through accessors
//!   such as [`ApiClient::devices`]
//! - [`guard`]: token-presence route guard
//! - [`config`] / [`session`]: settings file and persisted token

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod pagination;
pub mod session;
pub mod timestamp;
pub mod transport;

pub use config::{ClientConfig, ConfigError, TokenStoreKind};
pub use error::{ApiError, SessionError};
pub use guard::{AuthGuard, AuthState, Navigation, RouteName};
pub use pagination::{Listing, Page};
pub use session::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use transport::ApiClient;
