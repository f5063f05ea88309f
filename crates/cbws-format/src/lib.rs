//! # cbws-format
//!
//! Decoder, encoder, and patch engine for the CBWS animation/script format.
//!
//! A CBWS file describes a game character's attack sequence: timing, hit
//! volumes, reactions, and physics parameters. The format carries no record
//! lengths, counts, or separators; structure is recovered heuristically:
//! - a 16-byte fixed header ([`header`]),
//! - a tokenizer that splits function records on trailing zero-run shapes
//!   with a 4-byte lookahead ([`tokenizer`]),
//! - an attribute codec that recognizes typed values by the byte signatures
//!   preceding them ([`attributes`]),
//! - a document model that keeps the in-memory view consistent with the
//!   file on disk after every mutation ([`document`]).
//!
//! # Example
//!
//! ```no_run
//! use cbws_format::{AttributeEdit, Document, Group};
//!
//! # fn main() -> Result<(), cbws_format::CbwsError> {
//! let mut doc = Document::load("attack.cbws")?;
//! for function in doc.functions(Group::Intermediate) {
//!     println!("{} (frame {})", function.label(), function.local_frame());
//! }
//! doc.modify_attribute(Group::Intermediate, 0, 1, &AttributeEdit::Number(123.5))?;
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod document;
pub mod error;
pub mod function;
pub mod header;
pub mod hex;
pub mod tokenizer;

mod search;

pub use attributes::{Attribute, AttributeDecoder, AttributeEdit, AttributeEncoder, AttributeValue};
pub use document::Document;
pub use error::CbwsError;
pub use function::Function;
pub use header::Header;
pub use tokenizer::{tokenize, FunctionGroups, Group};

pub use cbws_signatures::Catalog;
