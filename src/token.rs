use std::fmt;

use rand::{distributions::Alphanumeric, Rng};

use crate::error::Error;

/// Total wire length of a token, brackets included.
pub const TOKEN_LEN: usize = 10;

const BODY_LEN: usize = TOKEN_LEN - 2;

/// Per-session end-of-message delimiter: `<` + 8 alphanumeric chars + `>`,
/// e.g. `<KfOVnVMV>`. Appended to every framed message so the receiver can
/// find the message boundary in the byte stream. Not a secret; the only
/// requirement is that it is unlikely to show up at the tail of payload
/// data within one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EofToken(String);

impl EofToken {
    /// Generate a fresh token for a new session.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut token = String::with_capacity(TOKEN_LEN);

        token.push('<');
        for _ in 0..BODY_LEN {
            token.push(char::from(rng.sample(Alphanumeric)));
        }
        token.push('>');

        Self(token)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EofToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&[u8]> for EofToken {
    type Error = Error;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        if raw.len() != TOKEN_LEN {
            return Err(Error::MalformedToken);
        }

        let text = std::str::from_utf8(raw).map_err(|_| Error::MalformedToken)?;
        let body = text
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .ok_or(Error::MalformedToken)?;

        if !body.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::MalformedToken);
        }

        Ok(Self(text.to_owned()))
    }
}
