//! Input and output reconstruction from raw traces.
//!
//! These functions are pure index arithmetic over 5-field records and do not
//! involve the automata at all: a trace that fails verification still
//! extracts, it just extracts garbage.

use crate::types::{TraceError, BLANK_SYMBOL, LEM_SYMBOL, RECORD_FIELDS, SEPARATOR_SYMBOL};

/// The field's symbol, if it is a single character.
fn single_char(field: &str) -> Option<char> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Whether a read field can belong to the machine's original input string.
fn is_input(field: &str) -> bool {
    !field.is_empty()
        && (field.chars().all(|c| c.is_ascii_digit())
            || field.chars().all(|c| c.is_ascii_alphabetic())
            || single_char(field) == Some(SEPARATOR_SYMBOL))
}

/// Whether a write field can belong to the final tape contents.
fn is_output(field: &str) -> bool {
    is_input(field) || matches!(single_char(field), Some(LEM_SYMBOL | BLANK_SYMBOL))
}

/// Splits a raw trace into 5-field records.
fn chunks(trace: &str) -> Result<Vec<Vec<&str>>, TraceError> {
    let fields: Vec<&str> = trace.split_whitespace().collect();
    if fields.len() % RECORD_FIELDS != 0 {
        return Err(TraceError::Malformed(fields.len()));
    }
    Ok(fields.chunks(RECORD_FIELDS).map(<[_]>::to_vec).collect())
}

/// Recovers the input string the machine was started on.
///
/// An equilibrium counter tracks whether the head is on fresh territory.
/// While it is zero, the record's read symbol is a candidate input character
/// (kept iff alphanumeric or the separator) and any non-rightward move costs
/// the counter 2: the step retreats from fresh ground and the following
/// steps revisit old cells. Off equilibrium the counter moves +1 per
/// rightward and -1 per leftward step and nothing is recorded.
pub fn extract_input(trace: &str) -> Result<String, TraceError> {
    let chunks = chunks(trace)?;
    let mut slots: Vec<Option<&str>> = vec![None; chunks.len()];
    let mut equilibrium: i64 = 0;

    for (i, chunk) in chunks.iter().enumerate() {
        if equilibrium == 0 {
            if is_input(chunk[1]) {
                slots[i] = Some(chunk[1]);
            }
            if chunk[4] != ">" {
                equilibrium -= 2;
            }
        } else if chunk[4] != "<" {
            equilibrium += 1;
        } else {
            equilibrium -= 1;
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Recovers the final tape contents after the left endmarker.
///
/// A write cursor walks a buffer of one slot per record, storing each
/// record's write symbol at the cursor before moving it +1 per rightward and
/// -1 per leftward step. A negative cursor addresses the buffer from its
/// right end; since the cursor moves one slot per record it always lands in
/// range. The slot of the very first write is dropped, only symbols that can
/// appear on a tape survive, and trailing blanks are stripped.
pub fn extract_output(trace: &str) -> Result<String, TraceError> {
    let chunks = chunks(trace)?;
    let len = chunks.len() as i64;
    let mut slots: Vec<Option<&str>> = vec![None; chunks.len()];
    let mut idx: i64 = 0;

    for chunk in &chunks {
        let at = if idx < 0 { idx + len } else { idx } as usize;
        slots[at] = Some(chunk[3]);
        if chunk[4] == ">" {
            idx += 1;
        } else {
            idx -= 1;
        }
    }

    let joined: String = slots
        .into_iter()
        .skip(1)
        .flatten()
        .filter(|s| is_output(s))
        .collect();
    Ok(joined.trim_end_matches(BLANK_SYMBOL).to_string())
}
