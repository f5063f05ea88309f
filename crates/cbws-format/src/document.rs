//! Document model and patch engine.
//!
//! A [`Document`] owns the full file buffer and the parsed view of it. Every
//! mutating operation that touches disk is immediately followed by a full
//! re-read and re-parse, so the in-memory model is never observed stale
//! relative to the file. Reordering and removal are in-memory edits; they
//! reach disk through [`Document::persist`].

use crate::attributes::{Attribute, AttributeDecoder, AttributeEdit, AttributeEncoder};
use crate::function::Function;
use crate::header::Header;
use crate::tokenizer::{tokenize, FunctionGroups, Group};
use crate::{hex, search, CbwsError};
use cbws_signatures::Catalog;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A parsed CBWS script bound to its backing file.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    bytes: Vec<u8>,
    header: Header,
    groups: FunctionGroups,
    catalog: Catalog,
}

impl Document {
    /// Load and parse a script file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CbwsError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                CbwsError::FileNotFound { path: path.clone() }
            } else {
                CbwsError::Io(err)
            }
        })?;
        let (header, groups) = parse(&bytes)?;
        Ok(Self {
            path,
            bytes,
            header,
            groups,
            catalog: Catalog::builtin(),
        })
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The full file buffer.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The file buffer as uppercase hex, the presentation form.
    pub fn hex(&self) -> String {
        hex::encode_hex(&self.bytes)
    }

    /// The signature catalogs used by this document.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Functions of one group, in execution order.
    pub fn functions(&self, group: Group) -> &[Function] {
        self.groups.group(group)
    }

    /// One function of a group. An out-of-range index falls back to index 0
    /// of that group; `None` only for an empty group.
    pub fn function(&self, group: Group, index: usize) -> Option<&Function> {
        let functions = self.groups.group(group);
        functions.get(index).or_else(|| functions.first())
    }

    /// Attributes of one function, recomputed from its current span and
    /// sorted by offset. Empty for an empty group.
    pub fn attributes(&self, group: Group, index: usize) -> Vec<Attribute> {
        match self.function(group, index) {
            Some(function) => AttributeDecoder::new(&self.catalog).decode(function),
            None => Vec::new(),
        }
    }

    /// Apply an edit to one attribute of one function, write, and re-parse.
    pub fn modify_attribute(
        &mut self,
        group: Group,
        index: usize,
        attr_index: usize,
        edit: &AttributeEdit,
    ) -> Result<(), CbwsError> {
        let (old_span, new_span) = {
            let function = self
                .function(group, index)
                .ok_or_else(|| CbwsError::invalid_index("function", index, 0))?;
            let attrs = AttributeDecoder::new(&self.catalog).decode(function);
            let new_span =
                AttributeEncoder::new(&self.catalog).apply(function, &attrs, attr_index, edit)?;
            (function.raw_bytes().to_vec(), new_span)
        };
        self.replace(&old_span, &new_span)
    }

    /// Overwrite one function's frame byte, write, and re-parse.
    pub fn set_local_frame(
        &mut self,
        group: Group,
        index: usize,
        frame: i8,
    ) -> Result<(), CbwsError> {
        let (old_span, new_span) = {
            let function = self
                .function(group, index)
                .ok_or_else(|| CbwsError::invalid_index("function", index, 0))?;
            let old_span = function.raw_bytes().to_vec();
            let mut new_span = old_span.clone();
            let last = new_span
                .last_mut()
                .ok_or(CbwsError::UnexpectedByteSequence {
                    context: "frame byte",
                })?;
            *last = frame as u8;
            (old_span, new_span)
        };
        self.replace(&old_span, &new_span)
    }

    /// Move an intermediate function to a new position. In-memory only;
    /// [`Document::persist`] writes the new order to disk.
    pub fn reorder_intermediate(
        &mut self,
        old_index: usize,
        new_index: usize,
    ) -> Result<(), CbwsError> {
        let count = self.groups.intermediate.len();
        if old_index >= count {
            return Err(CbwsError::invalid_index("intermediate function", old_index, count));
        }
        if new_index >= count {
            return Err(CbwsError::invalid_index("intermediate function", new_index, count));
        }
        let function = self.groups.intermediate.remove(old_index);
        self.groups.intermediate.insert(new_index, function);
        Ok(())
    }

    /// Remove an intermediate function and decrement the header function
    /// count. In-memory only; [`Document::persist`] writes it out.
    pub fn remove_intermediate(&mut self, index: usize) -> Result<(), CbwsError> {
        let count = self.groups.intermediate.len();
        if index >= count {
            return Err(CbwsError::invalid_index("intermediate function", index, count));
        }
        self.groups.intermediate.remove(index);
        self.header.function_count = self.header.function_count.saturating_sub(1);
        Ok(())
    }

    /// Insert an intermediate function and increment the header function
    /// count. In-memory only; [`Document::persist`] writes it out.
    pub fn insert_intermediate(
        &mut self,
        index: usize,
        function: Function,
    ) -> Result<(), CbwsError> {
        let count = self.groups.intermediate.len();
        if index > count {
            return Err(CbwsError::invalid_index("intermediate function", index, count));
        }
        self.groups.intermediate.insert(index, function);
        self.header.function_count = self.header.function_count.saturating_add(1);
        Ok(())
    }

    /// Patch the frame-delay header field, write, and re-parse.
    pub fn set_frame_delay(&mut self, value: u32) -> Result<(), CbwsError> {
        self.patch_header_word(Header::FRAME_DELAY_OFFSET, value)
    }

    /// Patch the function-count header field, write, and re-parse.
    pub fn set_function_count(&mut self, value: u32) -> Result<(), CbwsError> {
        self.patch_header_word(Header::FUNCTION_COUNT_OFFSET, value)
    }

    fn patch_header_word(&mut self, offset: usize, value: u32) -> Result<(), CbwsError> {
        if self.bytes.len() < Header::SIZE {
            return Err(CbwsError::too_short(Header::SIZE, self.bytes.len()));
        }
        self.bytes[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
        self.write_and_reload()
    }

    /// Replace the first occurrence of `old` in the whole buffer, write,
    /// and re-parse. Fails without touching the file when `old` is absent.
    pub fn replace(&mut self, old: &[u8], new: &[u8]) -> Result<(), CbwsError> {
        let idx =
            search::find(&self.bytes, old, 0).ok_or(CbwsError::PatternNotFound { occurrence: 1 })?;
        self.bytes.splice(idx..idx + old.len(), new.iter().copied());
        self.write_and_reload()
    }

    /// Replace the `n`-th occurrence (1-based) of `old`, write, and
    /// re-parse.
    pub fn replace_nth_occurrence(
        &mut self,
        old: &[u8],
        new: &[u8],
        n: usize,
    ) -> Result<(), CbwsError> {
        let idx = search::find_nth(&self.bytes, old, n)
            .ok_or(CbwsError::PatternNotFound { occurrence: n })?;
        self.bytes.splice(idx..idx + old.len(), new.iter().copied());
        self.write_and_reload()
    }

    /// Rebuild the whole buffer from the in-memory model (header plus the
    /// canonical group order), write once, and re-parse. This is how
    /// reorder/remove/insert reach disk.
    pub fn persist(&mut self) -> Result<(), CbwsError> {
        let mut out = Vec::with_capacity(self.bytes.len());
        out.extend_from_slice(&self.header.encode());
        out.extend_from_slice(&self.groups.reconstruct());
        self.bytes = out;
        self.write_and_reload()
    }

    /// Write the buffer, then re-read and re-parse from disk so the model
    /// reflects exactly what a fresh load would see. The write handle is
    /// released before the re-read.
    fn write_and_reload(&mut self) -> Result<(), CbwsError> {
        fs::write(&self.path, &self.bytes)?;
        let bytes = fs::read(&self.path)?;
        let (header, groups) = parse(&bytes)?;
        self.bytes = bytes;
        self.header = header;
        self.groups = groups;
        Ok(())
    }
}

fn parse(bytes: &[u8]) -> Result<(Header, FunctionGroups), CbwsError> {
    let header = Header::parse(bytes)?;
    let groups = tokenize(&bytes[Header::SIZE..]);
    Ok((header, groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use crate::tokenizer::{GROUP_PAD, START_MARKER};
    use cbws_signatures::markers::NUMERIC_MARKER;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn soft_terminated(content: &[u8], frame: u8) -> Vec<u8> {
        let mut out = content.to_vec();
        out.extend_from_slice(&[0u8; 15]);
        out.push(frame);
        out
    }

    fn marked(content: &[u8], frame: u8) -> Vec<u8> {
        let mut out = START_MARKER.to_vec();
        out.extend_from_slice(&soft_terminated(content, frame));
        out
    }

    fn angle_function(value: f32) -> Vec<u8> {
        let catalog = Catalog::builtin();
        let mut content = b"\x0FEnableHitVolume\x01".to_vec();
        content.extend_from_slice(catalog.numeric.signature_for("Angle").unwrap());
        content.extend_from_slice(&value.to_be_bytes());
        content
    }

    /// A five-function fixture: three intermediates, one final-frame
    /// carrier, one first-frame, one trailing final-frame, one impact.
    fn fixture_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"CBWS");
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&5u32.to_be_bytes());
        bytes.extend_from_slice(&10u32.to_be_bytes());

        bytes.extend_from_slice(&soft_terminated(&angle_function(45.0), 1));
        bytes.extend_from_slice(&marked(b"\x08PlayRate\x11", 2));
        bytes.extend_from_slice(&marked(b"\x08SetArmor\x22", 3));
        bytes.extend_from_slice(&marked(b"carrier\x01", 1));
        bytes.extend_from_slice(&GROUP_PAD);
        bytes.extend_from_slice(&marked(b"FirstAction\x02", 1));
        bytes.extend_from_slice(&GROUP_PAD);
        bytes.extend_from_slice(&marked(b"FinalAction\x03", 1));
        bytes.extend_from_slice(&GROUP_PAD);
        bytes.extend_from_slice(&marked(b"OnImpact\x04", 1));
        bytes
    }

    fn fixture() -> (NamedTempFile, Document) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&fixture_bytes()).unwrap();
        file.flush().unwrap();
        let doc = Document::load(file.path()).unwrap();
        (file, doc)
    }

    #[test]
    fn load_parses_header_and_groups() {
        let (_file, doc) = fixture();
        assert_eq!(doc.header().file_type(), "CBWS");
        assert_eq!(doc.header().unknown_value, 1);
        assert_eq!(doc.header().function_count, 5);
        assert_eq!(doc.header().frame_delay, 10);

        assert_eq!(doc.functions(Group::Intermediate).len(), 3);
        assert_eq!(doc.functions(Group::FinalFrame).len(), 2);
        assert_eq!(doc.functions(Group::FirstFrame).len(), 1);
        assert_eq!(doc.functions(Group::ImpactFrame).len(), 1);
        assert_eq!(doc.functions(Group::Intermediate)[0].label(), "EnableHitVolume");
    }

    #[test]
    fn missing_file_is_not_found() {
        let result = Document::load("/nonexistent/script.cbws");
        assert!(matches!(result, Err(CbwsError::FileNotFound { .. })));
    }

    #[test]
    fn out_of_range_function_defaults_to_first() {
        let (_file, doc) = fixture();
        let first = doc.function(Group::Intermediate, 0).unwrap();
        let fallback = doc.function(Group::Intermediate, 99).unwrap();
        assert_eq!(first.raw_bytes(), fallback.raw_bytes());
    }

    #[test]
    fn modify_attribute_round_trips_through_disk() {
        let (file, mut doc) = fixture();
        let attrs = doc.attributes(Group::Intermediate, 0);
        let index = attrs.iter().position(|a| a.name == "Angle").unwrap();

        doc.modify_attribute(
            Group::Intermediate,
            0,
            index,
            &AttributeEdit::Number(123.5),
        )
        .unwrap();

        // The model was refreshed from disk.
        let attrs = doc.attributes(Group::Intermediate, 0);
        let angle = attrs.iter().find(|a| a.name == "Angle").unwrap();
        assert_eq!(angle.value, AttributeValue::Number(123.5));

        // A fresh load sees the same thing.
        let reloaded = Document::load(file.path()).unwrap();
        let attrs = reloaded.attributes(Group::Intermediate, 0);
        let angle = attrs.iter().find(|a| a.name == "Angle").unwrap();
        assert_eq!(angle.value, AttributeValue::Number(123.5));
        // The new value bytes are on disk, marker-adjacent.
        let disk = std::fs::read(file.path()).unwrap();
        let marker_at = crate::search::find(&disk, &NUMERIC_MARKER, 0).unwrap();
        assert_eq!(
            &disk[marker_at + NUMERIC_MARKER.len()..marker_at + NUMERIC_MARKER.len() + 4],
            &123.5f32.to_be_bytes()
        );
    }

    #[test]
    fn numeric_mutation_changes_only_value_bytes() {
        let (file, mut doc) = fixture();
        let before = std::fs::read(file.path()).unwrap();
        let attrs = doc.attributes(Group::Intermediate, 0);
        let index = attrs.iter().position(|a| a.name == "Angle").unwrap();

        doc.modify_attribute(Group::Intermediate, 0, index, &AttributeEdit::Number(2.0))
            .unwrap();

        let after = std::fs::read(file.path()).unwrap();
        assert_eq!(before.len(), after.len());
        let marker_at = crate::search::find(&before, &NUMERIC_MARKER, 0).unwrap();
        let value_at = marker_at + NUMERIC_MARKER.len();
        assert_eq!(&before[..value_at], &after[..value_at]);
        assert_eq!(&before[value_at + 4..], &after[value_at + 4..]);
        assert_eq!(&after[value_at..value_at + 4], &2.0f32.to_be_bytes());
    }

    #[test]
    fn set_local_frame_overwrites_last_byte() {
        let (_file, mut doc) = fixture();
        doc.set_local_frame(Group::Intermediate, 1, 9).unwrap();
        assert_eq!(doc.functions(Group::Intermediate)[1].local_frame(), 9);
    }

    #[test]
    fn set_frame_delay_patches_header() {
        let (file, mut doc) = fixture();
        doc.set_frame_delay(30).unwrap();
        assert_eq!(doc.header().frame_delay, 30);

        let disk = std::fs::read(file.path()).unwrap();
        assert_eq!(&disk[12..16], &30u32.to_be_bytes());
        // Nothing else in the header moved.
        assert_eq!(&disk[..12], &fixture_bytes()[..12]);
    }

    #[test]
    fn remove_intermediate_updates_count_and_order() {
        let (file, mut doc) = fixture();
        doc.remove_intermediate(1).unwrap();
        assert_eq!(doc.header().function_count, 4);
        let labels: Vec<_> = doc
            .functions(Group::Intermediate)
            .iter()
            .map(|f| f.label().to_string())
            .collect();
        assert_eq!(labels, ["EnableHitVolume", "SetArmor"]);

        // In-memory until persisted.
        let on_disk = Document::load(file.path()).unwrap();
        assert_eq!(on_disk.functions(Group::Intermediate).len(), 3);

        doc.persist().unwrap();
        let on_disk = Document::load(file.path()).unwrap();
        assert_eq!(on_disk.header().function_count, 4);
        assert_eq!(on_disk.functions(Group::Intermediate).len(), 2);
    }

    #[test]
    fn reorder_intermediate_is_preserved_by_persist() {
        let (file, mut doc) = fixture();
        doc.reorder_intermediate(0, 2).unwrap();
        doc.persist().unwrap();

        let reloaded = Document::load(file.path()).unwrap();
        let labels: Vec<_> = reloaded
            .functions(Group::Intermediate)
            .iter()
            .map(|f| f.label().to_string())
            .collect();
        assert_eq!(labels, ["PlayRate", "SetArmor", "EnableHitVolume"]);
    }

    #[test]
    fn reorder_rejects_out_of_range() {
        let (_file, mut doc) = fixture();
        assert!(matches!(
            doc.reorder_intermediate(7, 0),
            Err(CbwsError::InvalidIndex { .. })
        ));
        assert!(matches!(
            doc.remove_intermediate(7),
            Err(CbwsError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn persist_is_a_fixpoint() {
        let (file, mut doc) = fixture();
        doc.persist().unwrap();
        let first = std::fs::read(file.path()).unwrap();
        doc.persist().unwrap();
        let second = std::fs::read(file.path()).unwrap();
        assert_eq!(first, second);

        // Groups survive the rewrite unchanged.
        let reloaded = Document::load(file.path()).unwrap();
        for group in Group::ALL {
            let lhs: Vec<_> = doc.functions(group).iter().map(|f| f.raw_bytes()).collect();
            let rhs: Vec<_> = reloaded
                .functions(group)
                .iter()
                .map(|f| f.raw_bytes())
                .collect();
            assert_eq!(lhs, rhs);
        }
    }

    #[test]
    fn replace_missing_pattern_leaves_file_untouched() {
        let (file, mut doc) = fixture();
        let before = std::fs::read(file.path()).unwrap();
        let result = doc.replace(&[0xDE, 0xAD, 0xBE, 0xEF, 0x99], &[0x00]);
        assert!(matches!(result, Err(CbwsError::PatternNotFound { .. })));
        assert_eq!(std::fs::read(file.path()).unwrap(), before);
    }

    #[test]
    fn replace_nth_occurrence_targets_the_right_match() {
        let (file, mut doc) = fixture();
        doc.replace_nth_occurrence(b"PlayRate", b"SlowRate", 1).unwrap();
        let disk = std::fs::read(file.path()).unwrap();
        assert!(crate::search::find(&disk, b"SlowRate", 0).is_some());
        assert!(crate::search::find(&disk, b"PlayRate", 0).is_none());
    }

    #[test]
    fn insert_intermediate_bumps_count() {
        let (_file, mut doc) = fixture();
        let function = Function::new(marked(b"\x08SetArmor\x30", 4));
        doc.insert_intermediate(1, function).unwrap();
        assert_eq!(doc.header().function_count, 6);
        assert_eq!(doc.functions(Group::Intermediate).len(), 4);
    }
}
