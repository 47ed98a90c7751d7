use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
/// Client-side identifier minting.
///
/// Ids are `<prefix>-<base36 millis><6 base36 chars>`, generated without a
/// server round-trip. The prefix names the entity kind so ids coming in from
/// older clients can still be classified at the boundary.
use std::sync::LazyLock;

use crate::types::EntityKind;

static KIND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(container|item)-").expect("static regex"));

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Classify an id by its kind prefix.
pub fn kind_from_id(id: &str) -> Option<EntityKind> {
    let caps = KIND_RE.captures(id)?;
    match &caps[1] {
        "container" => Some(EntityKind::Container),
        "item" => Some(EntityKind::Item),
        _ => None,
    }
}

/// Mint a fresh id for an entity of the given kind.
pub fn new_entity_id(kind: EntityKind) -> String {
    generate_id(kind.prefix())
}

/// Mint a fresh id with an arbitrary prefix.
/// The suffix combines the millisecond clock with six base36 characters drawn
/// from a SHA-256 of an atomic counter and the nanosecond clock.
pub fn generate_id(prefix: &str) -> String {
    use sha2::{Digest, Sha256};
    let now = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut hasher = Sha256::new();
    hasher.update(seq.to_le_bytes());
    hasher.update(now.as_nanos().to_le_bytes());
    let hash = hasher.finalize();
    let random: String = hash[..6]
        .iter()
        .map(|b| BASE36[(*b as usize) % 36] as char)
        .collect();
    format!("{}-{}{}", prefix, to_base36(now.as_millis()), random)
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
