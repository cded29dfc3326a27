//! Access control: session tokens, password hashing and role extractors.

pub mod extract;
pub mod jwt;
pub mod password;

pub use extract::{AuthAdmin, RequireSuperadmin};
pub use jwt::{Claims, JwtConfig};
