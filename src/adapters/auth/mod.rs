//! Authentication adapters.
//!
//! Implementations of the `TokenService` and `PasswordHasher` ports:
//!
//! - `jwt` - HS256 bearer tokens signed with a shared secret
//! - `password` - Bcrypt password hashing on the blocking pool

mod jwt;
mod password;

pub use jwt::JwtTokenService;
pub use password::BcryptPasswordHasher;
