//! Session join codes.
//!
//! A code is what players type (or scan) to find this process through
//! the directory service. It is regenerated on every successful load.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

/// Number of characters in a session code.
pub const CODE_LEN: usize = 5;

/// A 5-letter lowercase join code, e.g. `"qzkta"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionCode(String);

impl SessionCode {
    /// Draw a fresh code uniformly from `a..=z`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LEN)
            .map(|_| rng.gen_range(b'a'..=b'z') as char)
            .collect();
        SessionCode(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a code received from elsewhere (e.g. a directory record).
/// Only exactly [`CODE_LEN`] lowercase ASCII letters are accepted.
impl FromStr for SessionCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == CODE_LEN && s.bytes().all(|b| b.is_ascii_lowercase()) {
            Ok(SessionCode(s.to_string()))
        } else {
            Err(())
        }
    }
}
