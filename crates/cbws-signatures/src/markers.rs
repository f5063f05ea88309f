//! Marker byte-strings observed in CBWS function records.
//!
//! A marker introduces a typed value at the position immediately following
//! it. Values are byte sequences taken verbatim from real script files; none
//! of them is derived or documented by the engine.

/// Introduces a big-endian f32 value in most functions.
pub const NUMERIC_MARKER: [u8; 13] = [
    0x10, 0x58, 0xC7, 0xBA, 0x28, 0x00, 0x01, 0xDC, 0xB6, 0x77, 0x30, 0x00, 0x04,
];

/// Alternate numeric marker used by `PlayRate` functions.
pub const PLAY_RATE_MARKER: [u8; 4] = [0x90, 0x07, 0x00, 0x04];

/// Introduces a 4-byte hit-reaction code.
pub const REACTION_MARKER: [u8; 4] = [0x48, 0xA4, 0x00, 0x04];

/// Introduces the 4-byte custom-knock-back word.
pub const KNOCK_BACK_MARKER: [u8; 6] = [0x39, 0x66, 0x9D, 0x3A, 0x00, 0x04];

/// The knock-back word that means "custom knock back enabled".
pub const KNOCK_BACK_ENABLED: [u8; 4] = [0x9B, 0xCC, 0x9A, 0x4A];

/// Introduces the 1-byte guard-break flag.
pub const GUARD_BREAK: [u8; 4] = [0x0D, 0x94, 0x00, 0x01];

/// Introduces the AP-generation slot.
pub const AP_GENERATION_PREFIX: [u8; 5] = [0x25, 0x76, 0xAB, 0x83, 0x00];

/// Follows [`AP_GENERATION_PREFIX`] when no AP-generation value is set.
pub const AP_GENERATION_DEFAULT: [u8; 5] = [0x04, 0x00, 0x00, 0x00, 0x00];

/// The discriminator word that turns a Slam Down reaction into a bounce.
/// An all-zero word in the same position means flatten.
pub const BOUNCE_WORD: [u8; 4] = [0xD0, 0x4D, 0x67, 0x98];
