//! Identity: sign-up, login and profile management

pub mod service;

pub use service::{password_strength, AuthResult, IdentityService, PasswordStrength, SignUp};
