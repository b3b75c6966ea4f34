//! Lexical analysis of raw traces.
//!
//! A raw trace is a flat character stream; the tokenizer assigns every
//! character a [`Label`] by driving a DFA over classified characters. The
//! endmarker, blank, markers, and movement symbols are single-character
//! tokens; maximal letter/digit runs extend a single `SYMBOL` token.

use lazy_static::lazy_static;

use crate::dfa::{Dfa, DfaTable};
use crate::types::{Label, Token, TraceError, BLANK_SYMBOL, LEM_SYMBOL};

/// Category of a raw trace character.
///
/// Total over all characters: anything that is not a letter or digit is its
/// own literal. Whether a literal is tokenizable is the DFA's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// An ASCII digit.
    Digit,
    /// An ASCII letter.
    Letter,
    /// Any other character, carried verbatim.
    Literal(char),
}

/// Classifies a single trace character.
pub fn classify(ch: char) -> Class {
    if ch.is_ascii_digit() {
        Class::Digit
    } else if ch.is_ascii_alphabetic() {
        Class::Letter
    } else {
        Class::Literal(ch)
    }
}

/// States of the tokenizer DFA. Every state except `Start` corresponds to
/// exactly one token label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LexState {
    Start,
    Space,
    MLeft,
    MRight,
    Read,
    Write,
    Blank,
    Lem,
    Symbol,
}

impl LexState {
    fn label(self) -> Option<Label> {
        match self {
            LexState::Start => None,
            LexState::Space => Some(Label::Space),
            LexState::MLeft => Some(Label::MLeft),
            LexState::MRight => Some(Label::MRight),
            LexState::Read => Some(Label::Read),
            LexState::Write => Some(Label::Write),
            LexState::Blank => Some(Label::Blank),
            LexState::Lem => Some(Label::Lem),
            LexState::Symbol => Some(Label::Symbol),
        }
    }
}

lazy_static! {
    /// The tokenizer DFA, built once and shared by every tokenization.
    static ref LEXER: DfaTable<LexState, Class> = {
        use Class::{Digit, Letter, Literal};
        use LexState::*;

        DfaTable::new(
            Start,
            [Space, MLeft, MRight, Read, Write, Blank, Lem, Symbol],
            [
                ((Start, Literal(' ')), Space),
                ((Start, Literal('<')), MLeft),
                ((Start, Literal('>')), MRight),
                ((Start, Literal('+')), Write),
                ((Start, Literal('-')), Read),
                ((Start, Literal(BLANK_SYMBOL)), Blank),
                ((Start, Literal(LEM_SYMBOL)), Lem),
                ((Start, Digit), Symbol),
                ((Start, Letter), Symbol),
                ((Symbol, Digit), Symbol),
                ((Symbol, Letter), Symbol),
            ],
        )
    };
}

/// Tokenizes a raw trace into one [`Token`] per character.
///
/// The cursor restarts at every token boundary, which is before each
/// character except a letter/digit that extends a `SYMBOL` run in progress.
/// A character the DFA cannot consume fails the whole trace with
/// [`TraceError::Lex`]; the caller decides whether the batch continues.
pub fn tokenize(trace: &str) -> Result<Vec<Token>, TraceError> {
    let mut dfa = Dfa::new(&LEXER);
    let mut tokens = Vec::with_capacity(trace.len());

    for ch in trace.chars() {
        let class = classify(ch);
        let extends_run = dfa.current_state() == LexState::Symbol
            && matches!(class, Class::Digit | Class::Letter);
        if dfa.is_accepting() && !extends_run {
            dfa.reset();
        }

        let state = dfa.transition(class).map_err(|_| TraceError::Lex(ch))?;
        match state.label() {
            Some(label) => tokens.push(Token::new(ch, label)),
            // Start is never a transition target.
            None => return Err(TraceError::Lex(ch)),
        }
    }

    Ok(tokens)
}

/// Projects a token sequence onto its labels, dropping `SPACE` tokens.
///
/// This is the form the semantic verifiers consume and the tokenized trace
/// file format stores.
pub fn labels(tokens: &[Token]) -> Vec<Label> {
    tokens
        .iter()
        .map(|t| t.label)
        .filter(|l| *l != Label::Space)
        .collect()
}
