//! This crate provides the core logic for analyzing execution traces of a
//! tape-based machine. It includes generic DFA and PDA simulators, the
//! tokenizer and verifiers built on them, input/output reconstruction from
//! raw traces, and a runnable machine model for producing traces.

pub mod analyzer;
pub mod catalog;
pub mod dfa;
pub mod extract;
pub mod lexer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod pda;
pub mod types;
pub mod verify;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the machine catalog from the catalog module.
pub use catalog::{Catalog, MachineInfo, MACHINES};
/// Re-exports the DFA engine from the dfa module.
pub use dfa::{Dfa, DfaTable, Rejected};
/// Re-exports the trace extraction functions from the extract module.
pub use extract::{extract_input, extract_output};
/// Re-exports the tokenizer from the lexer module.
pub use lexer::{classify, labels, tokenize, Class};
/// Re-exports the `Loader` struct from the loader module.
pub use loader::Loader;
/// Re-exports the runnable machine model from the machine module.
pub use machine::{build_from_table, Machine, Outcome, Run, Step};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the PDA engine from the pda module.
pub use pda::{Acceptance, Config, Pda, PdaTable, StackOp};
/// Re-exports the core types shared across the pipeline.
pub use types::{
    parse_labels, Action, Direction, Label, MachineDef, MachineError, Token, TraceError,
    BLANK_SYMBOL, LEM_SYMBOL, MAX_EXECUTION_STEPS, RECORD_FIELDS, SEPARATOR_SYMBOL,
};
/// Re-exports the verifiers from the verify module.
pub use verify::{verify_lem, verify_movement, verify_steps};
