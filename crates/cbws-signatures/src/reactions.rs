//! Hit-reaction code catalog.
//!
//! A reaction code is the 4-byte word following the reaction marker in a
//! hit-volume, projectile, or grab function. The same catalog serves decode
//! (code → name) and encode (name → code).

use indexmap::IndexMap;
use std::collections::HashMap;

/// Reaction code for Slam Down, which carries a bounce/flatten discriminator.
pub const SLAM_DOWN: [u8; 4] = [0x45, 0x85, 0x69, 0x83];

/// Reaction code for Generic Light Reaction, which shares the Slam Down
/// discriminator position but never takes a suffix.
pub const GENERIC_LIGHT_REACTION: [u8; 4] = [0xC5, 0x72, 0xFE, 0x3F];

/// Bidirectional code⇄name catalog for hit reactions.
///
/// Insertion order is the display order used by selection menus.
#[derive(Debug, Clone)]
pub struct ReactionCatalog {
    by_code: IndexMap<[u8; 4], &'static str>,
    by_name: HashMap<&'static str, [u8; 4]>,
}

impl ReactionCatalog {
    /// Build the builtin catalog.
    pub fn builtin() -> Self {
        let mut by_code = IndexMap::new();
        by_code.insert([0x1C, 0x60, 0x17, 0xE5], "Bounce");
        by_code.insert([0x83, 0x20, 0xCD, 0xB7], "Crumple");
        by_code.insert([0xE2, 0xC9, 0xBD, 0x51], "Eject Roll");
        by_code.insert([0x01, 0x8F, 0x82, 0xBF], "Eject Spiral");
        by_code.insert([0xFD, 0x0B, 0x3D, 0x76], "Eject Tornado");
        by_code.insert([0x2F, 0xC9, 0x2C, 0x27], "Full Launch");
        by_code.insert([0xB0, 0xA5, 0x26, 0xB0], "Light Reaction Overhead");
        by_code.insert(GENERIC_LIGHT_REACTION, "Generic Light Reaction");
        by_code.insert([0xDD, 0xA0, 0xDD, 0xAE], "Mini Launch Lift");
        by_code.insert([0xB0, 0x5D, 0x0D, 0x35], "Mini Launch Sweep");
        by_code.insert([0xE9, 0xB0, 0xD6, 0x18], "Shock Stun");
        by_code.insert(SLAM_DOWN, "Slam Down");
        by_code.insert([0xE4, 0xD4, 0x6F, 0xCD], "Stagger Butt-drop");
        by_code.insert([0x69, 0x11, 0x80, 0x31], "Stagger Kneel");
        by_code.insert([0xCE, 0x2C, 0x3E, 0xE4], "Twitch");
        by_code.insert([0x80, 0x7B, 0xBD, 0x01], "No Reaction");
        by_code.insert([0xA8, 0x98, 0x43, 0xDA], "Jak Blaster");

        let by_name = by_code.iter().map(|(&code, &name)| (name, code)).collect();

        Self { by_code, by_name }
    }

    /// Resolve a reaction code to its name.
    pub fn name_for(&self, code: [u8; 4]) -> Option<&'static str> {
        self.by_code.get(&code).copied()
    }

    /// Resolve a reaction name to its code.
    pub fn code_for(&self, name: &str) -> Option<[u8; 4]> {
        self.by_name.get(name).copied()
    }

    /// Whether `code` needs the bounce/flatten discriminator inspected.
    pub fn is_ambiguous(code: [u8; 4]) -> bool {
        code == SLAM_DOWN || code == GENERIC_LIGHT_REACTION
    }

    /// Reaction names in display order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_code.values().copied()
    }

    /// Number of known reactions.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
