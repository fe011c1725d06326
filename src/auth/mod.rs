// Authentication module
// Manages session tokens: login, on-disk caching and invalidation

mod cache;
mod login;
mod manager;
mod types;

pub use cache::TokenCache;
pub use login::{login_url, normalize_addr, Authenticator};
pub use manager::SessionManager;
pub use types::{EndpointIdentity, LoginResponse, SessionToken, TOKEN_EXPIRE_BUFFER_SECS};
