//! Numeric-attribute signature catalog.
//!
//! Each entry pairs a semantic name with the byte sequence that precedes the
//! attribute's f32 value in a function record. Every signature ends with the
//! generic numeric marker; the bytes before it identify which attribute the
//! marker is setting.

use crate::markers::NUMERIC_MARKER;
use indexmap::IndexMap;
use std::collections::HashMap;

// Signature prefixes; the numeric marker is appended at catalog build time.
const HIT_VOLUME_LENGTH_1: [u8; 7] = [0x00, 0x0D, 0x06, 0xD1, 0x9B, 0x84, 0x00];
const HIT_VOLUME_LENGTH_2: [u8; 5] = [0x11, 0xF7, 0x12, 0x95, 0x00];
const HIT_VOLUME_HEIGHT: [u8; 5] = [0xEC, 0xEE, 0x0E, 0x0C, 0x00];
const HITBOX_ANGLE: [u8; 5] = [0xD0, 0x0A, 0xFA, 0xA7, 0x00];
const HIT_VOLUME_X_OFFSET: [u8; 5] = [0xFE, 0x85, 0xD7, 0xC9, 0x00];
const HIT_VOLUME_Y_OFFSET: [u8; 5] = [0x89, 0x82, 0xE7, 0x5F, 0x00];
const HORIZONTAL_KNOCK_BACK: [u8; 5] = [0x0D, 0x1D, 0x81, 0x84, 0x00];
const VERTICAL_KNOCK_BACK: [u8; 5] = [0xC6, 0x41, 0x52, 0x21, 0x00];
const AP_SIPHON: [u8; 25] = [
    0x55, 0xF2, 0xB8, 0xEE, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x1C, 0x36, 0xEA, 0x83, 0x00,
    0x04, 0x9D, 0x80, 0x3E, 0xF0, 0x24, 0x20, 0xFD, 0xDB, 0x00,
];
const AP_GENERATION: [u8; 5] = [0x25, 0x76, 0xAB, 0x83, 0x00];
const PROJECTILE_LIFETIME: [u8; 47] = [
    0x7C, 0xD6, 0x28, 0xC0, 0x00, 0x01, 0x00, 0x5C, 0xC2, 0x50, 0xE5, 0x00, 0x01, 0x00, 0xE7,
    0xB2, 0x91, 0x2B, 0x00, 0x01, 0x01, 0x09, 0x8D, 0x71, 0xAD, 0x00, 0x01, 0x01, 0xD0, 0x69,
    0xFD, 0xDC, 0x00, 0x01, 0x01, 0x4B, 0xA2, 0x33, 0x8A, 0x00, 0x01, 0x01, 0xC4, 0x91, 0x52,
    0xDE, 0x00,
];
const HORIZONTAL_VELOCITY_1: [u8; 9] = [0xB5, 0x0E, 0xE7, 0xF1, 0x64, 0xD7, 0x60, 0x5E, 0x00];
const VERTICAL_VELOCITY_1: [u8; 19] = [
    0xB5, 0x0E, 0xE7, 0xF1, 0x64, 0xD7, 0x60, 0x5E, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x13,
    0xD0, 0x50, 0xC8, 0x00,
];
const BOOLEAN_ATTRIBUTE_1: [u8; 8] = [0x72, 0x67, 0x65, 0x87, 0xD4, 0x4E, 0x9E, 0x00];

/// Bidirectional name⇄signature catalog for numeric attributes.
///
/// The name→signature map is built once; the signature→name map is derived
/// from it at construction, so the two can never diverge.
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    by_name: IndexMap<&'static str, Vec<u8>>,
    by_bytes: HashMap<Vec<u8>, &'static str>,
}

impl SignatureCatalog {
    /// Build the builtin catalog.
    pub fn builtin() -> Self {
        let mut by_name = IndexMap::new();
        let mut add = |name: &'static str, prefix: &[u8]| {
            let mut sig = prefix.to_vec();
            sig.extend_from_slice(&NUMERIC_MARKER);
            by_name.insert(name, sig);
        };

        add("Hit Volume Length 1", &HIT_VOLUME_LENGTH_1);
        add("Hit Volume Length 2", &HIT_VOLUME_LENGTH_2);
        add("Hit Volume Height 1", &HIT_VOLUME_HEIGHT);
        add("Angle", &HITBOX_ANGLE);
        add("X Offset", &HIT_VOLUME_X_OFFSET);
        add("Y Offset", &HIT_VOLUME_Y_OFFSET);
        add("Horizontal Knock Back", &HORIZONTAL_KNOCK_BACK);
        add("Vertical Knock Back", &VERTICAL_KNOCK_BACK);
        add("AP Siphon", &AP_SIPHON);
        add("AP Generation", &AP_GENERATION);
        add("Projectile Lifetime (Seconds)", &PROJECTILE_LIFETIME);
        add("Horizontal Velocity 1", &HORIZONTAL_VELOCITY_1);
        add("Vertical Velocity 1", &VERTICAL_VELOCITY_1);
        add("Boolean Attribute 1", &BOOLEAN_ATTRIBUTE_1);

        let by_bytes = by_name
            .iter()
            .map(|(&name, sig)| (sig.clone(), name))
            .collect();

        Self { by_name, by_bytes }
    }

    /// Look up the signature bytes for an attribute name.
    pub fn signature_for(&self, name: &str) -> Option<&[u8]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    /// Find the attribute whose signature is the longest suffix of `probe`.
    ///
    /// `probe` is the function span from its start through the end of a
    /// numeric marker. Suffixes are tried longest-first, so when one
    /// signature embeds another the more specific entry wins.
    pub fn longest_suffix_match(&self, probe: &[u8]) -> Option<&'static str> {
        for start in 0..probe.len() {
            if let Some(&name) = self.by_bytes.get(&probe[start..]) {
                return Some(name);
            }
        }
        None
    }

    /// Iterate entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &[u8])> {
        self.by_name.iter().map(|(&name, sig)| (name, sig.as_slice()))
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
