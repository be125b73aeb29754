/// Authentication module
///
/// Credential hashing, token encoding/decoding, the token service used by
/// the public auth routes and the gate in front of protected ones.

mod claims;
mod clock;
mod gate;
mod jwt;
mod password;
mod service;

pub use claims::{Claims, TokenKind, TokenPair};
pub use clock::{Clock, SystemClock};
pub use gate::AuthGate;
pub use jwt::{TokenCodec, TokenError};
pub use password::{validate_password_strength, CredentialHasher};
pub use service::{AuthService, LoginRequest, RefreshRequest, RegisterRequest};
