//! This module implements contract bytecode as found in compiled artifacts.
//! Bytecode is kept as a hex string since it may contain placeholders for
//! libraries that have not been linked yet, which makes it impossible to
//! represent as raw bytes.

use crate::errors::{BytecodeError, LinkError};
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::{Formatter, Result as FmtResult};
use web3::types::Bytes;

/// The length of a library placeholder in a bytecode hex string.
const PLACEHOLDER_LEN: usize = 40;

/// The string representation of the byte code. Note that this must be a
/// `String` since it may contain link placeholders.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Bytecode(String);

impl Bytecode {
    /// Reads hex bytecode representation from a string slice. The string may
    /// start with an optional `"0x"` prefix.
    pub fn from_hex_str(s: &str) -> Result<Self, BytecodeError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        verify(s)?;

        Ok(Bytecode(s.to_string()))
    }

    /// Convert the bytecode into bytes. Fails if there are any library
    /// placeholders left in the code.
    pub fn to_bytes(&self) -> Result<Bytes, LinkError> {
        if let Some(library) = self.undefined_libraries().next() {
            return Err(LinkError::UndefinedLibrary(library.to_string()));
        }

        let bytes = hex::decode(&self.0).map_err(BytecodeError::from)?;
        Ok(Bytes(bytes))
    }

    /// Returns an iterator over the names of libraries that still need to be
    /// linked. Each name is the placeholder with its `_` and `$` padding
    /// removed.
    pub fn undefined_libraries(&self) -> impl Iterator<Item = &str> + '_ {
        Placeholders(&self.0).map(|placeholder| placeholder.trim_matches(|c| c == '_' || c == '$'))
    }

    /// Returns true if the bytecode is an empty bytecode, as is the case for
    /// interfaces and abstract contracts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Verifies that a bytecode string, stripped of its `0x` prefix, is made up
/// of hex digit pairs and complete library placeholders.
fn verify(s: &str) -> Result<(), BytecodeError> {
    if s.len() % 2 != 0 {
        return Err(BytecodeError::InvalidLength);
    }

    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"__") {
            let placeholder = bytes
                .get(i..i + PLACEHOLDER_LEN)
                .ok_or(BytecodeError::PlaceholderTooShort)?;
            if let Some(&b) = placeholder
                .iter()
                .find(|&&b| !(b.is_ascii_alphanumeric() || b == b'_' || b == b'$'))
            {
                return Err(BytecodeError::InvalidPlaceholder(b as char));
            }
            i += PLACEHOLDER_LEN;
            continue;
        }

        for &b in &bytes[i..i + 2] {
            let c = b as char;
            if !c.is_ascii_hexdigit() {
                return Err(BytecodeError::InvalidHexDigit(c));
            }
        }
        i += 2;
    }

    Ok(())
}

/// Iterator over the library placeholders of a verified bytecode string.
struct Placeholders<'a>(&'a str);

impl<'a> Iterator for Placeholders<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.0.is_empty() {
            if self.0.starts_with("__") {
                let end = PLACEHOLDER_LEN.min(self.0.len());
                let (placeholder, rest) = self.0.split_at(end);
                self.0 = rest;
                return Some(placeholder);
            }

            // NOTE: Skip a whole byte at a time so that placeholders are only
            //   ever matched on byte boundaries.
            let end = 2.min(self.0.len());
            self.0 = &self.0[end..];
        }

        None
    }
}

impl<'de> Deserialize<'de> for Bytecode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(BytecodeVisitor)
    }
}

/// A serde visitor for deserializing bytecode.
struct BytecodeVisitor;

impl<'de> Visitor<'de> for BytecodeVisitor {
    type Value = Bytecode;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "valid EVM bytecode string representation")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Bytecode::from_hex_str(v).map_err(E::custom)
    }
}
