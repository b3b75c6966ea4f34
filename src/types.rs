//! This module defines the core data structures and types used throughout the trace
//! analysis pipeline, including token labels, machine definitions, directions, and
//! error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The left endmarker symbol occupying the leftmost tape cell.
pub const LEM_SYMBOL: char = '⊢';
/// The blank symbol denoting an unwritten tape cell.
pub const BLANK_SYMBOL: char = '⊔';
/// The input-half separator used by machines operating on split inputs.
pub const SEPARATOR_SYMBOL: char = '|';
/// Number of whitespace-separated fields in one trace record.
pub const RECORD_FIELDS: usize = 5;
/// The maximum number of steps a machine may execute before it is stopped.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// Token label assigned to each trace character by the tokenizer.
///
/// The set is closed: every tokenizable character maps to exactly one label,
/// and maximal letter/digit runs share the `Symbol` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "SPACE")]
    Space,
    #[serde(rename = "MLEFT")]
    MLeft,
    #[serde(rename = "MRIGHT")]
    MRight,
    #[serde(rename = "READ")]
    Read,
    #[serde(rename = "WRITE")]
    Write,
    #[serde(rename = "BLANK")]
    Blank,
    #[serde(rename = "LEM")]
    Lem,
    #[serde(rename = "SYMBOL")]
    Symbol,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Label::Space => "SPACE",
            Label::MLeft => "MLEFT",
            Label::MRight => "MRIGHT",
            Label::Read => "READ",
            Label::Write => "WRITE",
            Label::Blank => "BLANK",
            Label::Lem => "LEM",
            Label::Symbol => "SYMBOL",
        };
        f.write_str(name)
    }
}

impl FromStr for Label {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SPACE" => Ok(Label::Space),
            "MLEFT" => Ok(Label::MLeft),
            "MRIGHT" => Ok(Label::MRight),
            "READ" => Ok(Label::Read),
            "WRITE" => Ok(Label::Write),
            "BLANK" => Ok(Label::Blank),
            "LEM" => Ok(Label::Lem),
            "SYMBOL" => Ok(Label::Symbol),
            other => Err(TraceError::UnknownLabel(other.to_string())),
        }
    }
}

/// Parses a tokenized trace line (space-separated label names) into labels.
pub fn parse_labels(line: &str) -> Result<Vec<Label>, TraceError> {
    line.split_whitespace().map(Label::from_str).collect()
}

/// A single token produced by the tokenizer: the raw character and its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The raw trace character.
    pub ch: char,
    /// The label the tokenizer DFA assigned to it.
    pub label: Label,
}

impl Token {
    pub fn new(ch: char, label: Label) -> Self {
        Self { ch, label }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', {})", self.ch, self.label)
    }
}

/// Represents the possible directions a machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// The movement symbol this direction records in a trace.
    pub fn as_char(self) -> char {
        match self {
            Direction::Left => '<',
            Direction::Right => '>',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The effect of one machine rule: symbol to write, head movement, next state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The symbol written over the cell under the head.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine switches to.
    pub next_state: String,
}

/// A complete, static machine definition.
///
/// Rules are a nested map from state to read-symbol to [`Action`], so rule
/// lookup during simulation is a pair of hash lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDef {
    /// The name of the machine.
    pub name: String,
    /// Symbols the machine accepts in its input string.
    pub input_alphabet: Vec<char>,
    /// Symbols that may appear on the tape (superset of the input alphabet).
    pub tape_alphabet: Vec<char>,
    /// The state the machine starts in.
    pub start: String,
    /// The accepting halt state.
    pub accept: String,
    /// The rejecting halt state.
    pub reject: String,
    /// Transition rules: state -> read symbol -> action.
    pub rules: HashMap<String, HashMap<char, Action>>,
}

impl MachineDef {
    /// Total number of transition rules.
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    /// Number of states appearing as rule sources.
    pub fn state_count(&self) -> usize {
        self.rules.len()
    }
}

/// Errors arising from the trace pipeline: tokenization, label parsing, and
/// record chunking. Verification failure is never an error; it is a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A character outside the tokenizer alphabet. Fatal to the single trace
    /// containing it, never to the batch.
    #[error("character '{0}' is not in the trace alphabet")]
    Lex(char),
    /// Field count is not a whole number of records.
    #[error("trace has {0} fields, not a whole number of records")]
    Malformed(usize),
    /// A tokenized trace line contained a label outside the closed set.
    #[error("unknown token label \"{0}\"")]
    UnknownLabel(String),
    /// A trace or tokenized-trace file could not be read.
    #[error("file error: {0}")]
    File(String),
}

/// Errors arising from machine definitions and simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The machine definition file did not parse.
    #[error("machine parsing error: {0}")]
    Parse(#[from] Box<pest::error::Error<Rule>>),
    /// The machine definition parsed but is not internally consistent.
    #[error("machine validation error: {0}")]
    Validation(String),
    /// No rule defined for the current state and read symbol.
    #[error("no rule defined for state {0} and symbol '{1}'")]
    UndefinedTransition(String, char),
    /// The head attempted to move left off the endmarker cell.
    #[error("head moved left of the endmarker cell")]
    TapeBoundary,
    /// An input string contained a symbol outside the input alphabet.
    #[error("input symbol '{0}' is not in the input alphabet")]
    BadInputSymbol(char),
    /// The machine ran past the execution step limit.
    #[error("machine exceeded {0} execution steps")]
    StepLimit(usize),
    /// A machine definition file could not be read.
    #[error("file error: {0}")]
    File(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serialization() {
        let read = Label::Read;
        let symbol = Label::Symbol;

        let read_json = serde_json::to_string(&read).unwrap();
        let symbol_json = serde_json::to_string(&symbol).unwrap();

        assert_eq!(read_json, "\"READ\"");
        assert_eq!(symbol_json, "\"SYMBOL\"");

        let read_back: Label = serde_json::from_str(&read_json).unwrap();
        let symbol_back: Label = serde_json::from_str(&symbol_json).unwrap();

        assert_eq!(read, read_back);
        assert_eq!(symbol, symbol_back);
    }

    #[test]
    fn test_label_display_matches_from_str() {
        let all = [
            Label::Space,
            Label::MLeft,
            Label::MRight,
            Label::Read,
            Label::Write,
            Label::Blank,
            Label::Lem,
            Label::Symbol,
        ];
        for label in all {
            assert_eq!(label.to_string().parse::<Label>().unwrap(), label);
        }
    }

    #[test]
    fn test_parse_labels() {
        let labels = parse_labels("READ LEM WRITE LEM MRIGHT").unwrap();
        assert_eq!(
            labels,
            vec![
                Label::Read,
                Label::Lem,
                Label::Write,
                Label::Lem,
                Label::MRight
            ]
        );

        let err = parse_labels("READ NOISE").unwrap_err();
        assert_eq!(err, TraceError::UnknownLabel("NOISE".to_string()));
    }

    #[test]
    fn test_token_display() {
        let token = Token::new('-', Label::Read);
        assert_eq!(token.to_string(), "('-', READ)");
    }

    #[test]
    fn test_error_display() {
        let error = TraceError::Lex('|');

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("'|'"));
        assert!(error_msg.contains("not in the trace alphabet"));
    }

    #[test]
    fn test_direction_chars() {
        assert_eq!(Direction::Right.as_char(), '>');
        assert_eq!(Direction::Left.as_char(), '<');
    }
}
