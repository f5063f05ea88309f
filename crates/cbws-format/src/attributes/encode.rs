//! Attribute mutation: rewriting the bytes behind one attribute.

use super::{Attribute, AttributeValue, DISCRIMINATOR_GAP};
use crate::function::Function;
use crate::{search, CbwsError};
use cbws_signatures::markers::{
    AP_GENERATION_DEFAULT, AP_GENERATION_PREFIX, BOUNCE_WORD, NUMERIC_MARKER, PLAY_RATE_MARKER,
    REACTION_MARKER,
};
use cbws_signatures::{Catalog, ReactionCatalog};

/// The caller's requested change to one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeEdit {
    /// A new f32 for a numeric attribute (including AP generation).
    Number(f32),
    /// A new flag for guard break.
    Flag(bool),
    /// A new hit reaction. `bounce` is consulted only when the new reaction
    /// carries the bounce/flatten discriminator (Slam Down and Generic
    /// Light Reaction).
    Reaction { name: String, bounce: bool },
}

/// Applies an [`AttributeEdit`] to a copy of a function span.
///
/// Replacement targets the **first** occurrence of the signature-plus-value
/// byte sequence. When that sequence is not unique within the span the
/// wrong occurrence may be rewritten; the limitation is inherited from the
/// format's lack of record structure and is deliberately not corrected.
pub struct AttributeEncoder<'a> {
    catalog: &'a Catalog,
}

impl<'a> AttributeEncoder<'a> {
    /// Create an encoder over the given catalogs.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Produce the edited span for `function` with attribute `index`
    /// changed per `edit`. The function itself is untouched; offsets in
    /// `attrs` become invalid for the returned span.
    pub fn apply(
        &self,
        function: &Function,
        attrs: &[Attribute],
        index: usize,
        edit: &AttributeEdit,
    ) -> Result<Vec<u8>, CbwsError> {
        let attr = attrs
            .get(index)
            .ok_or_else(|| CbwsError::invalid_index("attribute", index, attrs.len()))?;

        let mut span = function.raw_bytes().to_vec();
        match attr.name.as_str() {
            "Hit Reaction" => self.apply_reaction(&mut span, attr, edit)?,
            "Guard Break" => apply_guard_break(&mut span, attr, edit)?,
            "AP Generation" => self.apply_ap_generation(&mut span, function.label(), attr, edit)?,
            _ => self.apply_numeric(&mut span, function.label(), attr, edit)?,
        }
        Ok(span)
    }

    /// Replace signature + old value with signature + new value.
    fn apply_numeric(
        &self,
        span: &mut Vec<u8>,
        label: &str,
        attr: &Attribute,
        edit: &AttributeEdit,
    ) -> Result<(), CbwsError> {
        let AttributeEdit::Number(new_value) = edit else {
            return Err(CbwsError::UnexpectedByteSequence {
                context: "numeric attribute edit",
            });
        };
        let AttributeValue::Number(old_value) = attr.value else {
            return Err(CbwsError::UnexpectedByteSequence {
                context: "numeric attribute value",
            });
        };

        let signature: &[u8] = match label {
            "PlayRate" => &PLAY_RATE_MARKER,
            "SetArmor" => &NUMERIC_MARKER,
            _ => self
                .catalog
                .numeric
                .signature_for(&attr.name)
                .ok_or(CbwsError::UnexpectedByteSequence {
                    context: "numeric attribute signature",
                })?,
        };

        let old = [signature, old_value.to_be_bytes().as_slice()].concat();
        let new = [signature, new_value.to_be_bytes().as_slice()].concat();
        replace_first(span, &old, &new, "numeric attribute")
    }

    /// Replace marker + old code with marker + new code; for an ambiguous
    /// new code also set the discriminator word per the caller's choice.
    fn apply_reaction(
        &self,
        span: &mut Vec<u8>,
        attr: &Attribute,
        edit: &AttributeEdit,
    ) -> Result<(), CbwsError> {
        let AttributeEdit::Reaction { name, bounce } = edit else {
            return Err(CbwsError::UnexpectedByteSequence {
                context: "hit reaction edit",
            });
        };

        let old_name = base_reaction_name(&attr.value)?;
        let old_code =
            self.catalog
                .reactions
                .code_for(old_name)
                .ok_or_else(|| CbwsError::UnknownReaction {
                    name: old_name.to_string(),
                })?;
        let new_code =
            self.catalog
                .reactions
                .code_for(name)
                .ok_or_else(|| CbwsError::UnknownReaction {
                    name: name.clone(),
                })?;

        if ReactionCatalog::is_ambiguous(new_code) {
            let at = attr.byte_offset + REACTION_MARKER.len() + 4 + DISCRIMINATOR_GAP;
            let word = if *bounce { BOUNCE_WORD } else { [0u8; 4] };
            let slot = span
                .get_mut(at..at + 4)
                .ok_or(CbwsError::UnexpectedByteSequence {
                    context: "bounce discriminator",
                })?;
            slot.copy_from_slice(&word);
        }

        let old = [REACTION_MARKER.as_slice(), old_code.as_slice()].concat();
        let new = [REACTION_MARKER.as_slice(), new_code.as_slice()].concat();
        replace_first(span, &old, &new, "hit reaction")
    }

    /// A concrete AP-generation value follows the numeric path; an unset
    /// slot grows the span by splicing in marker + value after the prefix.
    fn apply_ap_generation(
        &self,
        span: &mut Vec<u8>,
        label: &str,
        attr: &Attribute,
        edit: &AttributeEdit,
    ) -> Result<(), CbwsError> {
        if matches!(attr.value, AttributeValue::Number(_)) {
            return self.apply_numeric(span, label, attr, edit);
        }
        let AttributeEdit::Number(new_value) = edit else {
            return Err(CbwsError::UnexpectedByteSequence {
                context: "AP generation edit",
            });
        };

        let idx = search::find(span, &AP_GENERATION_PREFIX, 0).ok_or(
            CbwsError::UnexpectedByteSequence {
                context: "AP generation prefix",
            },
        )?;
        // The unset slot must hold the default word; anything else means the
        // layout deviates from the assumed heuristic and the mutation would
        // corrupt the span.
        let after = idx + AP_GENERATION_PREFIX.len();
        if span.get(after..after + AP_GENERATION_DEFAULT.len()) != Some(&AP_GENERATION_DEFAULT[..])
        {
            return Err(CbwsError::UnexpectedByteSequence {
                context: "AP generation default word",
            });
        }

        let old = [&AP_GENERATION_PREFIX[..], &AP_GENERATION_DEFAULT[..]].concat();
        let new = [
            &AP_GENERATION_PREFIX[..],
            &NUMERIC_MARKER[..],
            &new_value.to_be_bytes()[..],
        ]
        .concat();
        replace_first(span, &old, &new, "AP generation")
    }
}

/// Overwrite the guard-break flag byte in place.
fn apply_guard_break(
    span: &mut [u8],
    attr: &Attribute,
    edit: &AttributeEdit,
) -> Result<(), CbwsError> {
    let AttributeEdit::Flag(enabled) = edit else {
        return Err(CbwsError::UnexpectedByteSequence {
            context: "guard break edit",
        });
    };
    let byte = span
        .get_mut(attr.byte_offset)
        .ok_or(CbwsError::UnexpectedByteSequence {
            context: "guard break flag",
        })?;
    *byte = u8::from(*enabled);
    Ok(())
}

/// The reaction name with any bounce/flatten suffix stripped.
fn base_reaction_name(value: &AttributeValue) -> Result<&str, CbwsError> {
    let AttributeValue::Text(text) = value else {
        return Err(CbwsError::UnknownReaction {
            name: value.to_string(),
        });
    };
    Ok(text
        .strip_suffix(" - Flatten")
        .or_else(|| text.strip_suffix(" - Bounce"))
        .unwrap_or(text))
}

/// Splice `new` over the first occurrence of `old`.
fn replace_first(
    span: &mut Vec<u8>,
    old: &[u8],
    new: &[u8],
    context: &'static str,
) -> Result<(), CbwsError> {
    let idx = search::find(span, old, 0).ok_or(CbwsError::UnexpectedByteSequence { context })?;
    span.splice(idx..idx + old.len(), new.iter().copied());
    Ok(())
}
