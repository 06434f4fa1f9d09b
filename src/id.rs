//! Article identifiers.
//!
//! A 12-byte token generated by the store layer on insert, never supplied by
//! clients. On the wire it is 24 lowercase hex characters. The layout follows
//! the usual document-store convention: 4-byte big-endian unix seconds, then
//! 5 random bytes fixed for the process lifetime, then a 3-byte counter
//! seeded randomly at startup. Ids generated by one process therefore never
//! collide, and collisions across processes need the same second, the same
//! 5-byte random value and the same counter state.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The unique identifier of a persisted [`Article`](crate::model::Article).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ArticleId([u8; 12]);

/// Rejected identifier string: wrong length or non-hex characters.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("malformed article id (expected 24 hex characters)")]
pub struct ParseIdError;

struct Generator {
    process_random: [u8; 5],
    counter: AtomicU32,
}

fn generator() -> &'static Generator {
    static GENERATOR: OnceLock<Generator> = OnceLock::new();
    GENERATOR.get_or_init(|| Generator {
        process_random: rand::random(),
        counter: AtomicU32::new(rand::random()),
    })
}

impl ArticleId {
    /// Generates a fresh identifier. Called by store implementations on
    /// insert; clients never mint ids.
    pub fn generate() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let g = generator();
        let count = g.counter.fetch_add(1, Ordering::Relaxed).to_be_bytes();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&g.process_random);
        bytes[9..].copy_from_slice(&count[1..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ArticleId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseIdError)?;
        Ok(Self(bytes))
    }
}

impl Serialize for ArticleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
