use crate::{
    config::{EntityType, GeneratorConfig},
    error::{OperationError, Result},
    token_parser::{parse_token, ORDER_TOKEN_LENGTH, SEGMENT_SEPARATOR},
};
use std::str::FromStr;

const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
// Largest multiple of 62 that fits in a byte; anything above is rejected
// so every symbol stays equally likely.
const REJECTION_BOUND: u8 = 248;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Mints opaque tokens and route aliases.
///
/// Tokens carry no information about the real value they stand in for;
/// the correspondence lives only in the [`MappingStore`](crate::MappingStore).
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    config: GeneratorConfig,
}

impl IdGenerator {
    pub fn new(config: GeneratorConfig) -> IdGenerator {
        Self { config }
    }

    /// Generates an alias for `real_id`.
    ///
    /// Orders get `ORDER_TOKEN_LENGTH` random characters with no structure.
    /// Every other entity gets `<entity>_<random>_<base36 millis>`. The real
    /// id is never embedded.
    pub fn generate_secure_id(&self, _real_id: &str, entity_type: EntityType) -> Result<String> {
        if entity_type == EntityType::Order {
            return random_string(ORDER_TOKEN_LENGTH);
        }

        let random = random_string(*self.config.random_part_length())?;
        let timestamp = base36(chrono::Utc::now().timestamp_millis().max(0) as u64);
        let entity = entity_type.as_str();

        let mut token =
            String::with_capacity(entity.len() + random.len() + timestamp.len() + 2);
        token.push_str(entity);
        token.push(SEGMENT_SEPARATOR);
        token.push_str(&random);
        token.push(SEGMENT_SEPARATOR);
        token.push_str(&timestamp);
        Ok(token)
    }

    /// Generates `/` followed by a random path segment.
    pub fn generate_secure_route(&self) -> Result<String> {
        let segment = random_string(*self.config.route_length())?;
        Ok(format!("/{}", segment))
    }

    /// Syntactic check only; the store is not consulted.
    pub fn is_valid_secure_id_format(token: &str) -> bool {
        parse_token(token).is_ok()
    }

    /// Recovers the entity type from a token's shape.
    ///
    /// Returns `None` for empty or malformed tokens and for labels that are
    /// not a known [`EntityType`].
    pub fn extract_entity_type(token: &str) -> Option<EntityType> {
        let (_, shape) = parse_token(token).ok()?;
        match shape.entity_tag() {
            None => Some(EntityType::Order),
            Some(tag) => EntityType::from_str(tag).ok(),
        }
    }
}

fn random_string(len: usize) -> Result<String> {
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 64];
    while out.len() < len {
        getrandom::fill(&mut buf).map_err(|e| {
            OperationError::Generation(format!("Failed to get random bytes: {}", e))
        })?;
        for &byte in buf.iter().filter(|&&b| b < REJECTION_BOUND) {
            out.push(ALPHABET[(byte % 62) as usize] as char);
            if out.len() == len {
                break;
            }
        }
    }
    Ok(out)
}

fn base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(13);
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}
