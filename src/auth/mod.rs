//! Login flow tying the form, the store and the HTTP client together

pub mod service;
pub mod types;

pub use service::{AuthError, AuthService};
pub use types::{default_avatar, AuthResponse, LoginRequest, User};
