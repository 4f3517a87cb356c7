pub mod account_service;
pub mod account_service_impl;
pub mod auth_service;
pub mod auth_service_impl;
pub mod authorization;
pub mod credentials;

pub use account_service::{AccountError, AccountService, Registration, VerifiedAccount};
pub use account_service_impl::SeaOrmAccountService;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::SeaOrmAuthService;
pub use authorization::{Action, Verdict, authorize};
