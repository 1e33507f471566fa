//! Resource identities
//!
//! Every object stored in the registry is addressed by an [`ID`]. Mutable
//! objects (orgs, projects, services, ...) get their ID once, at creation
//! time, from a hash of their body mixed with a fresh nonce. The body may
//! change later; the ID never does.
//!
//! # Wire format
//!
//! An ID is 18 bytes: a format version byte, the resource type byte and a
//! 16 byte digest. On the wire it is a 29 character lowercase base32 string.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::api::error::ApiError;

/// Current ID format version
const ID_VERSION: u8 = 0x01;

/// Raw byte length of an ID
pub const ID_LEN: usize = 18;

/// Length of the digest part of an ID
const DIGEST_LEN: usize = ID_LEN - 2;

/// Length of the nonce mixed into every mutable ID
pub const NONCE_LEN: usize = 16;

/// Length of the encoded string form
const ENCODED_LEN: usize = (ID_LEN * 8 + 4) / 5;

/// Lowercase base32 alphabet (no i, l, o, s)
const ALPHABET: &[u8; 32] = b"0123456789abcdefghjkmnpqrtuvwxyz";

/// Resource type byte embedded in an ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResourceType {
    User = 0x01,
    Org = 0x03,
    Project = 0x05,
    Environment = 0x06,
    Service = 0x07,
}

impl ResourceType {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::User),
            0x03 => Some(Self::Org),
            0x05 => Some(Self::Project),
            0x06 => Some(Self::Environment),
            0x07 => Some(Self::Service),
            _ => None,
        }
    }
}

/// A body that can be given a mutable identity
pub trait MutableBody: Serialize {
    fn resource_type(&self) -> ResourceType;
}

/// Errors from parsing the string form of an ID
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("invalid ID length: expected {ENCODED_LEN} characters, got {0}")]
    Length(usize),

    #[error("invalid character {0:?} in ID")]
    Character(char),

    #[error("unsupported ID version {0}")]
    Version(u8),

    #[error("unknown resource type {0:#04x}")]
    Type(u8),
}

/// Registry object identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ID([u8; ID_LEN]);

impl ID {
    /// Raw bytes of the ID
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Resource type encoded in the ID
    pub fn resource_type(&self) -> Option<ResourceType> {
        ResourceType::from_byte(self.0[1])
    }

    fn from_parts(resource_type: ResourceType, digest: &[u8]) -> Self {
        let mut bytes = [0u8; ID_LEN];
        bytes[0] = ID_VERSION;
        bytes[1] = resource_type as u8;
        bytes[2..].copy_from_slice(&digest[..DIGEST_LEN]);
        Self(bytes)
    }
}

impl fmt::Display for ID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(&self.0))
    }
}

impl fmt::Debug for ID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID({})", self)
    }
}

impl FromStr for ID {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode(s)?;
        if bytes[0] != ID_VERSION {
            return Err(IdError::Version(bytes[0]));
        }
        if ResourceType::from_byte(bytes[1]).is_none() {
            return Err(IdError::Type(bytes[1]));
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ID {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ID {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

fn encode(bytes: &[u8; ID_LEN]) -> String {
    let mut out = String::with_capacity(ENCODED_LEN);
    let mut buffer: u16 = 0;
    let mut bits = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u16;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    out
}

fn decode(s: &str) -> Result<[u8; ID_LEN], IdError> {
    let len = s.chars().count();
    if len != ENCODED_LEN {
        return Err(IdError::Length(len));
    }

    let mut bytes = [0u8; ID_LEN];
    let mut buffer: u16 = 0;
    let mut bits = 0;
    let mut written = 0;

    for c in s.chars() {
        let value = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(IdError::Character(c))?;
        buffer = (buffer << 5) | value as u16;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            if written < ID_LEN {
                bytes[written] = (buffer >> bits) as u8;
                written += 1;
            }
        }
    }

    // The trailing bits are padding and must be zero for a canonical string
    if buffer & ((1 << bits) - 1) != 0 {
        if let Some(c) = s.chars().last() {
            return Err(IdError::Character(c));
        }
    }

    Ok(bytes)
}

/// Source of the freshness nonce mixed into mutable IDs
pub trait EntropySource: Send + Sync {
    fn nonce(&self) -> [u8; NONCE_LEN];
}

/// Random nonces from UUIDv4
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn nonce(&self) -> [u8; NONCE_LEN] {
        Uuid::new_v4().into_bytes()
    }
}

/// Derives IDs for newly created mutable bodies
#[derive(Clone)]
pub struct IdentityGenerator {
    entropy: Arc<dyn EntropySource>,
}

impl IdentityGenerator {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    /// Generate a fresh ID for `body`
    ///
    /// The ID is SHA-256 over the body's canonical JSON followed by a nonce
    /// from the entropy source, so identical bodies still get distinct IDs
    /// unless the entropy source repeats itself.
    pub fn generate<B: MutableBody>(&self, body: &B) -> Result<ID, ApiError> {
        let canonical = serde_json::to_vec(body).map_err(ApiError::Encoding)?;
        let nonce = self.entropy.nonce();

        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        hasher.update(nonce);
        let digest = hasher.finalize();

        Ok(ID::from_parts(body.resource_type(), &digest))
    }
}

impl Default for IdentityGenerator {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl fmt::Debug for IdentityGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityGenerator").finish_non_exhaustive()
    }
}

/// Generate a mutable ID using the OS entropy source
pub fn new_mutable<B: MutableBody>(body: &B) -> Result<ID, ApiError> {
    IdentityGenerator::default().generate(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use std::sync::atomic::{AtomicU8, Ordering};

    #[derive(Serialize)]
    struct Named {
        name: String,
    }

    impl MutableBody for Named {
        fn resource_type(&self) -> ResourceType {
            ResourceType::Service
        }
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("no canonical form"))
        }
    }

    impl MutableBody for Unencodable {
        fn resource_type(&self) -> ResourceType {
            ResourceType::Service
        }
    }

    struct Fixed([u8; NONCE_LEN]);

    impl EntropySource for Fixed {
        fn nonce(&self) -> [u8; NONCE_LEN] {
            self.0
        }
    }

    struct Counter(AtomicU8);

    impl EntropySource for Counter {
        fn nonce(&self) -> [u8; NONCE_LEN] {
            [self.0.fetch_add(1, Ordering::SeqCst); NONCE_LEN]
        }
    }

    fn named(name: &str) -> Named {
        Named {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_same_content_and_nonce_is_deterministic() {
        let gen = IdentityGenerator::new(Arc::new(Fixed([7; NONCE_LEN])));
        let a = gen.generate(&named("web")).unwrap();
        let b = gen.generate(&named("web")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fresh_nonce_separates_identical_bodies() {
        let gen = IdentityGenerator::new(Arc::new(Counter(AtomicU8::new(0))));
        let a = gen.generate(&named("web")).unwrap();
        let b = gen.generate(&named("web")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_content_changes_id() {
        let gen = IdentityGenerator::new(Arc::new(Fixed([0; NONCE_LEN])));
        let a = gen.generate(&named("web")).unwrap();
        let b = gen.generate(&named("api")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_os_entropy_ids_differ() {
        let a = new_mutable(&named("web")).unwrap();
        let b = new_mutable(&named("web")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_header_bytes() {
        let id = new_mutable(&named("web")).unwrap();
        assert_eq!(id.as_bytes()[0], ID_VERSION);
        assert_eq!(id.resource_type(), Some(ResourceType::Service));
    }

    #[test]
    fn test_unencodable_body_is_encoding_error() {
        let err = new_mutable(&Unencodable).unwrap_err();
        assert!(matches!(err, ApiError::Encoding(_)));
    }

    #[test]
    fn test_string_form() {
        let id = new_mutable(&named("web")).unwrap();
        let s = id.to_string();
        assert_eq!(s.len(), ENCODED_LEN);
        assert!(s.starts_with('0'));
        assert_eq!(s.parse::<ID>().unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("abc".parse::<ID>(), Err(IdError::Length(3)));

        let id = new_mutable(&named("web")).unwrap().to_string();
        let bad: String = id.chars().take(ENCODED_LEN - 1).chain(['o']).collect();
        assert_eq!(bad.parse::<ID>(), Err(IdError::Character('o')));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let mut bytes = [0u8; ID_LEN];
        bytes[0] = ID_VERSION;
        bytes[1] = 0x7f;
        let s = encode(&bytes);
        assert_eq!(s.parse::<ID>(), Err(IdError::Type(0x7f)));
    }

    #[test]
    fn test_json_is_plain_string() {
        let id = new_mutable(&named("web")).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: ID = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
