//! Caller identity. Tokens are issued by the identity service; this crate only
//! verifies them.

mod extractors;

pub use extractors::AuthUser;

#[cfg(test)]
pub(crate) use extractors::{test_tokens, TokenKind};
