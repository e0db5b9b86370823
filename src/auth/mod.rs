//! Bearer-token authentication: credential check, token issuance and the
//! request gate that guards protected routes.

pub mod credentials;
pub mod gate;
pub mod token;

pub use credentials::Credentials;
pub use gate::{check, gate, require_bearer};
pub use token::{Claims, TokenService};

pub const NO_VALID_HEADER: &str = "No valid authorization header found";
pub const INVALID_TOKEN: &str = "Invalid token";

/// Why a request was turned away by the gate.
///
/// Clients only ever see two messages: header problems and token problems
/// are each collapsed into one. The variants exist so the logs can tell
/// them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingHeader,
    MalformedHeader,
    InvalidSignature,
    Expired,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Rejection::MissingHeader | Rejection::MalformedHeader => NO_VALID_HEADER,
            Rejection::InvalidSignature | Rejection::Expired => INVALID_TOKEN,
        }
    }

    fn reason(self) -> &'static str {
        match self {
            Rejection::MissingHeader => "missing authorization header",
            Rejection::MalformedHeader => "authorization header is not a bearer token",
            Rejection::InvalidSignature => "token failed to decode or verify",
            Rejection::Expired => "token expired",
        }
    }
}

/// Result of checking a request: the verified claims, or why it was refused.
pub type AuthOutcome = Result<Claims, Rejection>;
