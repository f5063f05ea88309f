//! Attribute extraction from function spans.

use super::{Attribute, AttributeValue, DISCRIMINATOR_GAP};
use crate::function::Function;
use crate::search;
use cbws_signatures::markers::{
    AP_GENERATION_PREFIX, GUARD_BREAK, KNOCK_BACK_ENABLED, KNOCK_BACK_MARKER, NUMERIC_MARKER,
    PLAY_RATE_MARKER, REACTION_MARKER,
};
use cbws_signatures::{Catalog, SLAM_DOWN};

/// Labels that carry hit reactions and the other hit-volume extras.
const HIT_VOLUME_LABELS: [&str; 3] = ["EnableHitVolume", "SpawnProjectile", "UnlockPuppets"];

/// Scans a function span and produces its attributes, sorted by offset.
///
/// Borrows the immutable catalogs; construct one per document and reuse it.
pub struct AttributeDecoder<'a> {
    catalog: &'a Catalog,
}

impl<'a> AttributeDecoder<'a> {
    /// Create a decoder over the given catalogs.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Decode every attribute of `function`, sorted ascending by offset.
    pub fn decode(&self, function: &Function) -> Vec<Attribute> {
        let label = function.label();
        let bytes = function.raw_bytes();
        let mut attrs = Vec::new();

        self.scan_numeric(label, bytes, &mut attrs);
        scan_strings(label, bytes, &mut attrs);

        if HIT_VOLUME_LABELS.contains(&label) {
            self.scan_reactions(bytes, &mut attrs);
            if label != "UnlockPuppets" {
                scan_guard_break(bytes, &mut attrs);
            }
            synthesize_ap_generation(bytes, &mut attrs);
            scan_knock_back(bytes, &mut attrs);
        }

        attrs.sort_by_key(|attr| attr.byte_offset);
        attrs
    }

    /// Repeatedly locate the numeric marker and read the f32 that follows.
    ///
    /// `PlayRate` uses the alternate marker and always names "Play Rate";
    /// `SetArmor` always names "Super Armor"; every other label is named by
    /// the longest catalog signature that suffixes the span up to the end of
    /// the marker.
    fn scan_numeric(&self, label: &str, bytes: &[u8], attrs: &mut Vec<Attribute>) {
        let marker: &[u8] = match label {
            "PlayRate" => &PLAY_RATE_MARKER,
            _ => &NUMERIC_MARKER,
        };

        let mut from = 0;
        while let Some(idx) = search::find(bytes, marker, from) {
            let value_start = idx + marker.len();
            let Some(word) = read_word(bytes, value_start) else {
                break;
            };
            let name = match label {
                "PlayRate" => "Play Rate".to_string(),
                "SetArmor" => "Super Armor".to_string(),
                _ => self
                    .catalog
                    .numeric
                    .longest_suffix_match(&bytes[..value_start])
                    .unwrap_or("Unknown")
                    .to_string(),
            };
            attrs.push(Attribute {
                name,
                value: AttributeValue::Number(f32::from_be_bytes(word)),
                byte_offset: idx,
            });
            from = value_start + 4;
        }
    }

    /// One "Hit Reaction" attribute per reaction-marker occurrence; attacks
    /// that cause several reactions encode several markers.
    fn scan_reactions(&self, bytes: &[u8], attrs: &mut Vec<Attribute>) {
        let mut from = 0;
        while let Some(idx) = search::find(bytes, &REACTION_MARKER, from) {
            let code_start = idx + REACTION_MARKER.len();
            let Some(code) = read_word(bytes, code_start) else {
                break;
            };

            let value = match self.catalog.reactions.name_for(code) {
                Some(name) if code == SLAM_DOWN => {
                    // The word past the discriminator gap selects bounce or
                    // flatten. A truncated window leaves the name plain.
                    match read_word(bytes, code_start + 4 + DISCRIMINATOR_GAP) {
                        Some([0, 0, 0, 0]) => AttributeValue::Text(format!("{name} - Flatten")),
                        Some(_) => AttributeValue::Text(format!("{name} - Bounce")),
                        None => AttributeValue::Text(name.to_string()),
                    }
                }
                Some(name) => AttributeValue::Text(name.to_string()),
                None => AttributeValue::Unknown,
            };

            attrs.push(Attribute {
                name: "Hit Reaction".to_string(),
                value,
                byte_offset: idx,
            });
            from = code_start + 4;
        }
    }
}

/// Maximal runs of `[A-Za-z0-9_ /*]` bytes. Runs of length >= 5 are
/// counted; a counted run other than the function's own label becomes
/// "String Attribute {k}", where `k` indexes all counted runs, so the label
/// run consumes an index without emitting.
fn scan_strings(label: &str, bytes: &[u8], attrs: &mut Vec<Attribute>) {
    let mut counted = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if !is_text_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_text_byte(bytes[i]) {
            i += 1;
        }
        if i - start < 5 {
            continue;
        }
        let text = String::from_utf8_lossy(&bytes[start..i]).into_owned();
        if text != label {
            attrs.push(Attribute {
                name: format!("String Attribute {counted}"),
                value: AttributeValue::Text(text),
                byte_offset: start,
            });
        }
        counted += 1;
    }
}

fn is_text_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b' ' | b'/' | b'*')
}

/// The byte after the guard-break signature: `01` means enabled.
fn scan_guard_break(bytes: &[u8], attrs: &mut Vec<Attribute>) {
    let Some(idx) = search::find(bytes, &GUARD_BREAK, 0) else {
        return;
    };
    let offset = idx + GUARD_BREAK.len();
    if let Some(&flag) = bytes.get(offset) {
        attrs.push(Attribute {
            name: "Guard Break".to_string(),
            value: AttributeValue::Flag(flag == 0x01),
            byte_offset: offset,
        });
    }
}

/// The AP-generation slot exists in every hit volume even when no value is
/// set; surface it as an Unknown-valued attribute so it can be populated.
fn synthesize_ap_generation(bytes: &[u8], attrs: &mut Vec<Attribute>) {
    if attrs.iter().any(|attr| attr.name == "AP Generation") {
        return;
    }
    if let Some(idx) = search::find(bytes, &AP_GENERATION_PREFIX, 0) {
        attrs.push(Attribute {
            name: "AP Generation".to_string(),
            value: AttributeValue::Unknown,
            byte_offset: idx + AP_GENERATION_PREFIX.len(),
        });
    }
}

/// The word after the knock-back marker against the enabled pattern.
fn scan_knock_back(bytes: &[u8], attrs: &mut Vec<Attribute>) {
    let Some(idx) = search::find(bytes, &KNOCK_BACK_MARKER, 0) else {
        return;
    };
    let offset = idx + KNOCK_BACK_MARKER.len();
    if let Some(word) = read_word(bytes, offset) {
        attrs.push(Attribute {
            name: "Custom Knock Back".to_string(),
            value: AttributeValue::Flag(word == KNOCK_BACK_ENABLED),
            byte_offset: offset,
        });
    }
}

/// Read 4 bytes at `at`, if the span is long enough.
fn read_word(bytes: &[u8], at: usize) -> Option<[u8; 4]> {
    let slice = bytes.get(at..at + 4)?;
    let mut word = [0u8; 4];
    word.copy_from_slice(slice);
    Some(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbws_signatures::markers::AP_GENERATION_DEFAULT;
    use cbws_signatures::GENERIC_LIGHT_REACTION;

    fn decode(function: &Function) -> Vec<Attribute> {
        let catalog = Catalog::builtin();
        AttributeDecoder::new(&catalog).decode(function)
    }

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    /// Minimal hit-volume span: label, angle attribute, reaction, guard
    /// break, AP-generation default, knock back.
    fn hit_volume_span(reaction_code: [u8; 4], discriminator: [u8; 4]) -> Vec<u8> {
        let catalog = catalog();
        let mut span = b"\x0FEnableHitVolume".to_vec();
        span.extend_from_slice(catalog.numeric.signature_for("Angle").unwrap());
        span.extend_from_slice(&45.0f32.to_be_bytes());
        span.extend_from_slice(&REACTION_MARKER);
        span.extend_from_slice(&reaction_code);
        span.extend_from_slice(&[0x11; DISCRIMINATOR_GAP]);
        span.extend_from_slice(&discriminator);
        span.extend_from_slice(&GUARD_BREAK);
        span.push(0x01);
        span.extend_from_slice(&AP_GENERATION_PREFIX);
        span.extend_from_slice(&AP_GENERATION_DEFAULT);
        span.extend_from_slice(&KNOCK_BACK_MARKER);
        span.extend_from_slice(&KNOCK_BACK_ENABLED);
        span.push(0x02);
        span
    }

    #[test]
    fn named_numeric_attribute() {
        let catalog = catalog();
        let mut span = b"\x10SpawnHitVolume\x00".to_vec();
        span.extend_from_slice(catalog.numeric.signature_for("Hit Volume Height 1").unwrap());
        span.extend_from_slice(&2.5f32.to_be_bytes());

        let attrs = decode(&Function::new(span));
        let height: Vec<_> = attrs
            .iter()
            .filter(|a| a.name == "Hit Volume Height 1")
            .collect();
        assert_eq!(height.len(), 1);
        assert_eq!(height[0].value, AttributeValue::Number(2.5));
    }

    #[test]
    fn unmatched_marker_is_unknown() {
        let mut span = b"\x0CSomeFunction\xAB\xCD".to_vec();
        let offset = span.len();
        span.extend_from_slice(&NUMERIC_MARKER);
        span.extend_from_slice(&1.0f32.to_be_bytes());

        let attrs = decode(&Function::new(span));
        assert_eq!(attrs.len(), 1);
        let numeric = attrs.iter().find(|a| a.name == "Unknown").unwrap();
        assert_eq!(numeric.byte_offset, offset);
        assert_eq!(numeric.value, AttributeValue::Number(1.0));
    }

    #[test]
    fn play_rate_uses_alternate_marker() {
        let mut span = b"\x08PlayRate".to_vec();
        span.extend_from_slice(&PLAY_RATE_MARKER);
        span.extend_from_slice(&0.5f32.to_be_bytes());

        let attrs = decode(&Function::new(span));
        let rate = attrs.iter().find(|a| a.name == "Play Rate").unwrap();
        assert_eq!(rate.value, AttributeValue::Number(0.5));
        // The generic marker is absent, so nothing else is numeric.
        assert_eq!(
            attrs
                .iter()
                .filter(|a| matches!(a.value, AttributeValue::Number(_)))
                .count(),
            1
        );
    }

    #[test]
    fn set_armor_names_without_catalog_lookup() {
        let mut span = b"\x08SetArmor".to_vec();
        span.extend_from_slice(&NUMERIC_MARKER);
        span.extend_from_slice(&3.0f32.to_be_bytes());

        let attrs = decode(&Function::new(span));
        let armor = attrs.iter().find(|a| a.name == "Super Armor").unwrap();
        assert_eq!(armor.value, AttributeValue::Number(3.0));
    }

    #[test]
    fn string_attribute_indexing_skips_label_run() {
        // Both runs are counted; only the non-label one emits, keeping the
        // label's index reserved.
        let span = b"\x0BSetAnimation\x00\x01anim/walk_cycle\x00".to_vec();
        let attrs = decode(&Function::new(span));

        let strings: Vec<_> = attrs
            .iter()
            .filter(|a| a.name.starts_with("String Attribute"))
            .collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0].name, "String Attribute 1");
        assert_eq!(
            strings[0].value,
            AttributeValue::Text("anim/walk_cycle".to_string())
        );
    }

    #[test]
    fn hit_volume_decodes_all_extras() {
        let span = hit_volume_span([0x1C, 0x60, 0x17, 0xE5], [0u8; 4]);
        let function = Function::new(span);
        assert_eq!(function.label(), "EnableHitVolume");
        let attrs = decode(&function);

        let reaction = attrs.iter().find(|a| a.name == "Hit Reaction").unwrap();
        assert_eq!(reaction.value, AttributeValue::Text("Bounce".to_string()));

        let guard = attrs.iter().find(|a| a.name == "Guard Break").unwrap();
        assert_eq!(guard.value, AttributeValue::Flag(true));

        let ap = attrs.iter().find(|a| a.name == "AP Generation").unwrap();
        assert_eq!(ap.value, AttributeValue::Unknown);

        let knock = attrs.iter().find(|a| a.name == "Custom Knock Back").unwrap();
        assert_eq!(knock.value, AttributeValue::Flag(true));
    }

    #[test]
    fn slam_down_discriminator_selects_suffix() {
        let flatten = decode(&Function::new(hit_volume_span(SLAM_DOWN, [0u8; 4])));
        let reaction = flatten.iter().find(|a| a.name == "Hit Reaction").unwrap();
        assert_eq!(
            reaction.value,
            AttributeValue::Text("Slam Down - Flatten".to_string())
        );

        let bounce = decode(&Function::new(hit_volume_span(
            SLAM_DOWN,
            [0xD0, 0x4D, 0x67, 0x98],
        )));
        let reaction = bounce.iter().find(|a| a.name == "Hit Reaction").unwrap();
        assert_eq!(
            reaction.value,
            AttributeValue::Text("Slam Down - Bounce".to_string())
        );
    }

    #[test]
    fn generic_light_reaction_never_gets_a_suffix() {
        let attrs = decode(&Function::new(hit_volume_span(
            GENERIC_LIGHT_REACTION,
            [0xAA; 4],
        )));
        let reaction = attrs.iter().find(|a| a.name == "Hit Reaction").unwrap();
        assert_eq!(
            reaction.value,
            AttributeValue::Text("Generic Light Reaction".to_string())
        );
    }

    #[test]
    fn unresolved_reaction_code_is_unknown() {
        let attrs = decode(&Function::new(hit_volume_span([0xDE, 0xAD, 0xBE, 0xEF], [0u8; 4])));
        let reaction = attrs.iter().find(|a| a.name == "Hit Reaction").unwrap();
        assert_eq!(reaction.value, AttributeValue::Unknown);
    }

    #[test]
    fn multiple_reactions_all_decode() {
        let mut span = b"\x0FEnableHitVolume\x00".to_vec();
        for code in [[0x1C, 0x60, 0x17, 0xE5], [0x83, 0x20, 0xCD, 0xB7]] {
            span.extend_from_slice(&REACTION_MARKER);
            span.extend_from_slice(&code);
        }
        let attrs = decode(&Function::new(span));
        let reactions: Vec<_> = attrs.iter().filter(|a| a.name == "Hit Reaction").collect();
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[0].value, AttributeValue::Text("Bounce".to_string()));
        assert_eq!(reactions[1].value, AttributeValue::Text("Crumple".to_string()));
    }

    #[test]
    fn unlock_puppets_skips_guard_break() {
        let mut span = b"\x0DUnlockPuppets\x00".to_vec();
        span.extend_from_slice(&GUARD_BREAK);
        span.push(0x01);

        let attrs = decode(&Function::new(span));
        assert!(attrs.iter().all(|a| a.name != "Guard Break"));
    }

    #[test]
    fn guard_break_disabled_polarity() {
        let mut span = b"\x0FEnableHitVolume\x00".to_vec();
        span.extend_from_slice(&GUARD_BREAK);
        span.push(0x00);

        let attrs = decode(&Function::new(span));
        let guard = attrs.iter().find(|a| a.name == "Guard Break").unwrap();
        assert_eq!(guard.value, AttributeValue::Flag(false));
    }

    #[test]
    fn attributes_are_sorted_by_offset() {
        let attrs = decode(&Function::new(hit_volume_span([0x1C, 0x60, 0x17, 0xE5], [0u8; 4])));
        assert!(attrs.windows(2).all(|w| w[0].byte_offset <= w[1].byte_offset));
    }

    #[test]
    fn concrete_ap_generation_suppresses_synthesis() {
        let catalog = catalog();
        let mut span = b"\x0FEnableHitVolume\x00".to_vec();
        span.extend_from_slice(catalog.numeric.signature_for("AP Generation").unwrap());
        span.extend_from_slice(&7.5f32.to_be_bytes());

        let attrs = decode(&Function::new(span));
        let ap: Vec<_> = attrs.iter().filter(|a| a.name == "AP Generation").collect();
        assert_eq!(ap.len(), 1);
        assert_eq!(ap[0].value, AttributeValue::Number(7.5));
    }
}
