//! Property name hashing
//!
//! Object property keys are stored as 32-bit lookup3 (`hashlittle`) hashes
//! of their names with a fixed seed. Names are recovered by hashing a known
//! catalogue and inverting the table.

use std::sync::OnceLock;

use ahash::AHashMap;

/// Seed used for every property name hash in the object container
pub const NAME_SEED: u32 = 123_456_789;

/// Property names known to appear in object containers
pub const KNOWN_PROPERTY_NAMES: &[&str] = &[
    "SPEED", "SPEED_X", "SPEED_Y", "DIRECTION", "DISTANCE", "DISTANCE_X", "DISTANCE_Y",
    "WAIT", "WAIT_TIME", "DELAY", "DURATION", "TIMER", "RANGE", "RADIUS", "ANGLE",
    "WIDTH", "HEIGHT", "FLIP", "FLIP_X", "FLIP_Y", "LAYER", "DEPTH", "TYPE", "SUBTYPE",
    "VARIANT", "ID", "NAME", "TARGET", "TARGET_ID", "LINK", "LINK_ID", "GROUP", "COUNT",
    "AMOUNT", "VALUE", "GEM_VALUE", "GEM_TYPE", "CONTENTS", "ITEM", "HEALTH", "DAMAGE",
    "MUSIC", "SOUND", "DIALOG", "DIALOG_ID", "TEXT", "SCRIPT", "EVENT", "TRIGGER",
    "ACTIVE", "ENABLED", "VISIBLE", "RESPAWN", "ONCE", "LOOP", "PATH", "NODE", "START",
    "END", "OFFSET_X", "OFFSET_Y", "SCALE", "COLOR", "PALETTE", "ROOM", "ZONE", "CAMERA",
    "LOCK_X", "LOCK_Y", "CHECKPOINT", "CHECKPOINT_ID", "BOSS", "SPAWN", "SPAWN_COUNT",
];

#[inline]
fn mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_sub(*c); *a ^= c.rotate_left(4);  *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a); *b ^= a.rotate_left(6);  *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b); *c ^= b.rotate_left(8);  *b = b.wrapping_add(*a);
    *a = a.wrapping_sub(*c); *a ^= c.rotate_left(16); *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a); *b ^= a.rotate_left(19); *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b); *c ^= b.rotate_left(4);  *b = b.wrapping_add(*a);
}

#[inline]
fn final_mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(14));
    *a ^= *c; *a = a.wrapping_sub(c.rotate_left(11));
    *b ^= *a; *b = b.wrapping_sub(a.rotate_left(25));
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(16));
    *a ^= *c; *a = a.wrapping_sub(c.rotate_left(4));
    *b ^= *a; *b = b.wrapping_sub(a.rotate_left(14));
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(24));
}

fn word(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// lookup3 `hashlittle` over arbitrary bytes
pub fn hash_bytes(key: &[u8], seed: u32) -> u32 {
    let init = 0xDEAD_BEEF_u32
        .wrapping_add(key.len() as u32)
        .wrapping_add(seed);
    let (mut a, mut b, mut c) = (init, init, init);

    let mut rest = key;
    while rest.len() > 12 {
        a = a.wrapping_add(word(&rest[0..4]));
        b = b.wrapping_add(word(&rest[4..8]));
        c = c.wrapping_add(word(&rest[8..12]));
        mix(&mut a, &mut b, &mut c);
        rest = &rest[12..];
    }

    if rest.is_empty() {
        return c;
    }

    let mut tail = [0u8; 12];
    tail[..rest.len()].copy_from_slice(rest);
    a = a.wrapping_add(word(&tail[0..4]));
    b = b.wrapping_add(word(&tail[4..8]));
    c = c.wrapping_add(word(&tail[8..12]));
    final_mix(&mut a, &mut b, &mut c);
    c
}

pub fn hash_name(name: &str, seed: u32) -> u32 {
    hash_bytes(name.as_bytes(), seed)
}

/// Placeholder label for a hash with no known name
pub fn placeholder(hash: u32) -> String {
    format!("0x{hash:08X}")
}

/// Immutable reverse lookup table: hash -> property name
#[derive(Debug, Clone, Default)]
pub struct NameCatalogue {
    names: AHashMap<u32, String>,
}

impl NameCatalogue {
    pub fn new<I, S>(names: I, seed: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = AHashMap::new();
        for name in names {
            let name = name.into();
            table.entry(hash_name(&name, seed)).or_insert(name);
        }
        Self { names: table }
    }

    /// Shared catalogue built from [`KNOWN_PROPERTY_NAMES`]
    pub fn builtin() -> &'static NameCatalogue {
        static CATALOGUE: OnceLock<NameCatalogue> = OnceLock::new();
        CATALOGUE.get_or_init(|| NameCatalogue::new(KNOWN_PROPERTY_NAMES.iter().copied(), NAME_SEED))
    }

    pub fn lookup(&self, hash: u32) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }

    /// Known name, or a hex placeholder
    pub fn resolve(&self, hash: u32) -> String {
        self.lookup(hash).map_or_else(|| placeholder(hash), str::to_owned)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vectors() {
        assert_eq!(hash_bytes(b"", 0), 0xDEADBEEF);
        assert_eq!(hash_bytes(b"", 0xDEADBEEF), 0xBD5B7DDE);
        assert_eq!(hash_name("Four score and seven years ago", 0), 0x17770551);
        assert_eq!(hash_name("Four score and seven years ago", 1), 0xCD628161);
    }

    #[test]
    fn test_deterministic() {
        let first = hash_name("SPEED", NAME_SEED);
        for _ in 0..4 {
            assert_eq!(hash_name("SPEED", NAME_SEED), first);
        }
        assert_ne!(first, hash_name("SPEED", NAME_SEED + 1));
        assert_ne!(first, hash_name("SPEEDS", NAME_SEED));
    }

    #[test]
    fn test_block_boundaries() {
        // 12 bytes takes the tail path, 13 bytes takes one mix round
        let twelve = hash_name("ABCDEFGHIJKL", NAME_SEED);
        let thirteen = hash_name("ABCDEFGHIJKLM", NAME_SEED);
        assert_ne!(twelve, thirteen);
        assert_eq!(hash_name("ABCDEFGHIJKLM", NAME_SEED), thirteen);
    }

    #[test]
    fn test_builtin_catalogue_resolves_known_names() {
        let catalogue = NameCatalogue::builtin();
        assert_eq!(catalogue.len(), KNOWN_PROPERTY_NAMES.len());
        for name in KNOWN_PROPERTY_NAMES {
            assert_eq!(catalogue.lookup(hash_name(name, NAME_SEED)), Some(*name));
        }
        assert_eq!(catalogue.resolve(hash_name("SPEED", NAME_SEED)), "SPEED");
    }

    #[test]
    fn test_unknown_hash_placeholder() {
        let catalogue = NameCatalogue::new(["ONLY"], NAME_SEED);
        assert_eq!(catalogue.lookup(0x1234ABCD), None);
        assert_eq!(catalogue.resolve(0x1234ABCD), "0x1234ABCD");
    }
}
