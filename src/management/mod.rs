mod auth;
mod links;

pub use auth::Credentials;
pub use auth::TokenManager;
pub use links::LinkCache;
pub use links::LinkStore;
