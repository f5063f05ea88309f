//! Function-record tokenizer.
//!
//! The byte stream after the header carries no lengths, counts, or record
//! separators. A record boundary is inferred from the shape of its trailing
//! zero run plus a 4-byte lookahead:
//!
//! - **soft terminator**: 15 zero bytes followed by one non-zero byte. The
//!   non-zero byte is the closing function's local frame. At a group
//!   transition it is also, informally, the number of functions in the
//!   following group; observed files agree but nothing enforces it, so it is
//!   treated as documentation only.
//! - **hard terminator**: 16 zero bytes.
//!
//! A terminator followed by the start marker `00 00 00 03` splits two
//! functions of the same group; a soft terminator followed by four zero
//! bytes closes a group. A zero run whose lookahead matches neither is
//! coincidental data and stays inside the current function.

use crate::function::Function;

/// Marker opening a function record.
pub const START_MARKER: [u8; 4] = [0x00, 0x00, 0x00, 0x03];

/// Structural padding that follows a group-closing soft terminator. The four
/// bytes belong to no function and are re-emitted by [`FunctionGroups::reconstruct`].
pub const GROUP_PAD: [u8; 4] = [0x00; 4];

const TERMINATOR_LEN: usize = 16;
const LOOKAHEAD: usize = 4;

/// One of the four ordered function categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Actions reserved for frame one.
    FirstFrame,
    /// The main top-to-bottom action sequence.
    Intermediate,
    /// Actions after the active frames end.
    FinalFrame,
    /// On-hit reactions; may be empty.
    ImpactFrame,
}

impl Group {
    /// All groups in execution order.
    pub const ALL: [Group; 4] = [
        Group::FirstFrame,
        Group::Intermediate,
        Group::FinalFrame,
        Group::ImpactFrame,
    ];

    /// Human-readable group name.
    pub fn name(&self) -> &'static str {
        match self {
            Group::FirstFrame => "first frame",
            Group::Intermediate => "intermediate",
            Group::FinalFrame => "final frame",
            Group::ImpactFrame => "impact frame",
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The four ordered function sequences of a document.
#[derive(Debug, Clone, Default)]
pub struct FunctionGroups {
    pub first_frame: Vec<Function>,
    pub intermediate: Vec<Function>,
    pub final_frame: Vec<Function>,
    pub impact_frame: Vec<Function>,
}

impl FunctionGroups {
    /// Functions of one group, in execution order.
    pub fn group(&self, group: Group) -> &[Function] {
        match group {
            Group::FirstFrame => &self.first_frame,
            Group::Intermediate => &self.intermediate,
            Group::FinalFrame => &self.final_frame,
            Group::ImpactFrame => &self.impact_frame,
        }
    }

    /// Total number of functions across all groups.
    pub fn total(&self) -> usize {
        self.first_frame.len()
            + self.intermediate.len()
            + self.final_frame.len()
            + self.impact_frame.len()
    }

    fn push(&mut self, group: Group, bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        let list = match group {
            Group::FirstFrame => &mut self.first_frame,
            Group::Intermediate => &mut self.intermediate,
            Group::FinalFrame => &mut self.final_frame,
            Group::ImpactFrame => &mut self.impact_frame,
        };
        list.push(Function::new(bytes));
    }

    /// Rebuild the function region in canonical file order: all intermediate
    /// functions, the first final-frame entry (the count-carrier for the
    /// first-frame group), the first-frame functions, the remaining
    /// final-frame entries, the impact-frame functions, with the structural
    /// pad after each group-closing terminator.
    ///
    /// Tokenizing the result reproduces the same groups.
    pub fn reconstruct(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for function in &self.intermediate {
            out.extend_from_slice(function.raw_bytes());
        }
        match self.final_frame.split_first() {
            Some((carrier, rest)) => {
                out.extend_from_slice(carrier.raw_bytes());
                out.extend_from_slice(&GROUP_PAD);
                for function in &self.first_frame {
                    out.extend_from_slice(function.raw_bytes());
                }
                out.extend_from_slice(&GROUP_PAD);
                for function in rest {
                    out.extend_from_slice(function.raw_bytes());
                }
                out.extend_from_slice(&GROUP_PAD);
            }
            None => {
                for function in &self.first_frame {
                    out.extend_from_slice(function.raw_bytes());
                }
            }
        }
        for function in &self.impact_frame {
            out.extend_from_slice(function.raw_bytes());
        }
        out
    }
}

/// Tokenizer state: which group a start-marker split currently closes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Intermediate,
    FirstFrame,
    FinalFrame,
    ImpactFrame,
}

impl State {
    fn group(self) -> Group {
        match self {
            State::Intermediate => Group::Intermediate,
            State::FirstFrame => Group::FirstFrame,
            State::FinalFrame => Group::FinalFrame,
            State::ImpactFrame => Group::ImpactFrame,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Soft,
    Hard,
}

/// Shape of the buffer's trailing zero run, if it forms a terminator.
fn tail_terminator(buf: &[u8]) -> Option<Terminator> {
    if buf.len() < TERMINATOR_LEN {
        return None;
    }
    let tail = &buf[buf.len() - TERMINATOR_LEN..];
    if tail[..TERMINATOR_LEN - 1].iter().any(|&b| b != 0) {
        return None;
    }
    if tail[TERMINATOR_LEN - 1] == 0 {
        Some(Terminator::Hard)
    } else {
        Some(Terminator::Soft)
    }
}

/// Split the post-header byte stream into the four function groups.
pub fn tokenize(body: &[u8]) -> FunctionGroups {
    let mut groups = FunctionGroups::default();
    let mut state = State::Intermediate;
    let mut buf: Vec<u8> = Vec::new();
    let mut pos = 0;

    while pos < body.len() {
        buf.push(body[pos]);
        pos += 1;

        let rest = &body[pos..];
        if rest.len() < LOOKAHEAD {
            // Stream exhaustion: too few bytes left to disambiguate, so they
            // all belong to the closing function.
            buf.extend_from_slice(rest);
            let group = match state {
                State::FinalFrame => Group::FinalFrame,
                _ => Group::ImpactFrame,
            };
            groups.push(group, buf);
            return groups;
        }

        let Some(terminator) = tail_terminator(&buf) else {
            continue;
        };
        let peek = [rest[0], rest[1], rest[2], rest[3]];

        if terminator == Terminator::Soft && peek == GROUP_PAD {
            // Group transition. The closing function belongs to the group
            // the transition reveals, not necessarily the current one: the
            // soft-terminated function before the first-frame group is the
            // final-frame count-carrier.
            let (group, next) = match state {
                State::Intermediate => (Group::FinalFrame, State::FirstFrame),
                State::FirstFrame => (Group::FirstFrame, State::FinalFrame),
                State::FinalFrame => (Group::FinalFrame, State::ImpactFrame),
                State::ImpactFrame => (Group::ImpactFrame, State::ImpactFrame),
            };
            groups.push(group, std::mem::take(&mut buf));
            state = next;
            pos += LOOKAHEAD;
        } else if peek == START_MARKER {
            // Next function in the same group; the marker opens its span.
            groups.push(state.group(), std::mem::take(&mut buf));
        }
        // Neither lookahead matched: the zero run is data, keep accumulating.
    }

    groups
}
