use anyhow::{Result, bail};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Seed metadata used for batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    /// Original token when the seed came from text rather than a number.
    pub label: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, label: None }
    }

    #[must_use]
    pub fn from_phrase(phrase: &str) -> Self {
        Self {
            seed: hash_phrase(phrase),
            label: Some(phrase.to_string()),
        }
    }
}

/// First eight bytes of the SHA-256 digest, big-endian.
#[must_use]
pub fn hash_phrase(phrase: &str) -> u64 {
    let digest = Sha256::digest(phrase.as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Resolve CLI seed tokens into canonical seeds.
///
/// Accepts integers, the keyword `now` (current UTC milliseconds) and any
/// other text, which is hashed. Duplicates are dropped in order.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let info = if token.eq_ignore_ascii_case("now") {
            SeedInfo::from_numeric(Utc::now().timestamp_millis().unsigned_abs())
        } else if let Ok(value) = token.parse::<u64>() {
            SeedInfo::from_numeric(value)
        } else if let Ok(value) = token.parse::<i64>() {
            SeedInfo::from_numeric(value.unsigned_abs())
        } else {
            SeedInfo::from_phrase(token)
        };
        if seen.insert(info.seed) {
            resolved.push(info);
        }
    }

    if resolved.is_empty() {
        bail!("No seeds given");
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn numbers_and_phrases_resolve() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "lucky strike"])).unwrap();
        assert_eq!(seeds[0], SeedInfo::from_numeric(42));
        assert_eq!(seeds[1].seed, 7);
        assert_eq!(seeds[2].seed, hash_phrase("lucky strike"));
        assert_eq!(seeds[2].label.as_deref(), Some("lucky strike"));
    }

    #[test]
    fn duplicates_collapse() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "5", " 5 "])).unwrap();
        assert_eq!(seeds.len(), 1);
    }

    #[test]
    fn phrase_hash_is_stable() {
        assert_eq!(hash_phrase("menthol"), hash_phrase("menthol"));
        assert_ne!(hash_phrase("menthol"), hash_phrase("Menthol"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(resolve_seed_inputs(&tokens(&["", "  "])).is_err());
    }
}
