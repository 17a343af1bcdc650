pub mod factory;
pub mod principal;
pub mod token;

pub use factory::build_token_service;
pub use principal::{Principal, PrincipalError, Role};
pub use token::{SigningKey, TokenError, TokenService};
