//! # cbws-signatures
//!
//! Byte-signature catalogs for the CBWS animation/script format.
//!
//! CBWS function records carry no field names or tags; an attribute is
//! recognized by the fixed byte sequence that precedes its value. This crate
//! holds that domain knowledge:
//! - marker byte-strings that introduce typed values ([`markers`]),
//! - the numeric-attribute catalog mapping signatures to semantic names
//!   ([`SignatureCatalog`]),
//! - the hit-reaction catalog mapping 4-byte reaction codes to names
//!   ([`ReactionCatalog`]).
//!
//! Catalogs are fixed domain knowledge, not user-extensible: build one with
//! [`Catalog::builtin`] at startup and pass it by reference into decoder and
//! encoder components.
//!
//! # Example
//!
//! ```
//! use cbws_signatures::Catalog;
//!
//! let catalog = Catalog::builtin();
//! let sig = catalog.numeric.signature_for("Angle").unwrap();
//! assert_eq!(catalog.numeric.longest_suffix_match(sig), Some("Angle"));
//! ```

pub mod markers;

mod catalog;
mod reactions;

pub use catalog::SignatureCatalog;
pub use reactions::{ReactionCatalog, GENERIC_LIGHT_REACTION, SLAM_DOWN};

/// The complete set of catalogs needed to decode and encode CBWS attributes.
///
/// Immutable after construction; decoder/encoder components borrow it.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Numeric-attribute signatures.
    pub numeric: SignatureCatalog,
    /// Hit-reaction codes.
    pub reactions: ReactionCatalog,
}

impl Catalog {
    /// Build the builtin catalogs.
    pub fn builtin() -> Self {
        Self {
            numeric: SignatureCatalog::builtin(),
            reactions: ReactionCatalog::builtin(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
