//! Trace verification.
//!
//! Three layered checks over a tokenized trace, each an automaton built once
//! and shared across traces:
//!
//! 1. [`verify_steps`] — a DFA accepting exactly complete
//!    read → symbol → write → symbol → move cycles.
//! 2. [`verify_movement`] — a PDA rejecting traces that imply moving left of
//!    the starting cell more often than they moved right.
//! 3. [`verify_lem`] — a PDA protecting the left endmarker cell; intended to
//!    run only on traces that already passed movement verification.
//!
//! Failure is a boolean on every path, never an error and never a panic.

use lazy_static::lazy_static;

use crate::dfa::DfaTable;
use crate::pda::{Acceptance, PdaTable, StackOp};
use crate::types::Label;

/// Labels that leave every verifier's stack untouched.
const NON_MOVE: [Label; 5] = [
    Label::Read,
    Label::Write,
    Label::Blank,
    Label::Lem,
    Label::Symbol,
];

/// States of the step-grammar DFA. `Start` and `S5` sit on cycle boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StepState {
    Start,
    S1,
    S2,
    S3,
    S4,
    S5,
}

lazy_static! {
    static ref STEP_GRAMMAR: DfaTable<StepState, Label> = {
        use Label::*;
        use StepState::*;

        DfaTable::new(
            Start,
            [Start, S5],
            [
                ((Start, Read), S1),
                ((Start, Space), Start),
                ((S1, Symbol), S2),
                ((S1, Lem), S2),
                ((S1, Blank), S2),
                ((S1, Space), S1),
                ((S2, Write), S3),
                ((S2, Space), S2),
                ((S3, Symbol), S4),
                ((S3, Lem), S4),
                ((S3, Blank), S4),
                ((S3, Space), S3),
                ((S4, MLeft), S5),
                ((S4, MRight), S5),
                ((S4, Space), S4),
                ((S5, Read), S1),
                ((S5, Space), S5),
            ],
        )
    };
}

/// Checks that a label sequence follows the step cycle grammar and ends
/// exactly on a cycle boundary. `SPACE` labels are ignored via self-loops, so
/// both filtered and unfiltered streams are fine.
pub fn verify_steps(labels: &[Label]) -> bool {
    let mut state = STEP_GRAMMAR.start();
    for &label in labels {
        match STEP_GRAMMAR.step(state, label) {
            Ok(next) => state = next,
            Err(_) => return false,
        }
    }
    STEP_GRAMMAR.is_accepting(state)
}

/// States of the movement PDA. `Fail` is absorbing: it has no outgoing
/// transitions, so a trace that enters it can never be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MoveState {
    S1,
    S2,
    Fail,
}

/// Movement stack alphabet: the bottom marker and one marker per net
/// rightward move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MoveStack {
    Bottom,
    Right,
}

lazy_static! {
    static ref MOVEMENT: PdaTable<MoveState, Label, MoveStack> = {
        use MoveStack::{Bottom, Right};
        use MoveState::*;

        let mut delta = Vec::new();
        for label in NON_MOVE {
            delta.push(((S1, label, Bottom), (S1, StackOp::Keep)));
            delta.push(((S2, label, Bottom), (S2, StackOp::Keep)));
            delta.push(((S2, label, Right), (S2, StackOp::Keep)));
        }
        delta.extend([
            ((S1, Label::MRight, Bottom), (S2, StackOp::Replace(vec![Bottom, Right]))),
            ((S1, Label::MLeft, Bottom), (Fail, StackOp::Keep)),
            ((S2, Label::MRight, Right), (S2, StackOp::Replace(vec![Right, Right]))),
            ((S2, Label::MRight, Bottom), (S2, StackOp::Replace(vec![Bottom, Right]))),
            ((S2, Label::MLeft, Right), (S2, StackOp::Pop)),
            ((S2, Label::MLeft, Bottom), (Fail, StackOp::Keep)),
        ]);

        PdaTable::new(S1, Bottom, [S2], Acceptance::FinalState, delta)
    };
}

/// Checks that a trace never implies crossing left of its starting cell: a
/// right-marker is pushed on every `MRIGHT` and popped on every `MLEFT`, and
/// an `MLEFT` over the bare bottom marker is a permanent failure.
///
/// Accepts iff the run ends in the right-biased state, so a stream with no
/// movement at all is rejected.
pub fn verify_movement(labels: &[Label]) -> bool {
    MOVEMENT.accepts(labels.iter().copied().filter(|l| *l != Label::Space))
}

/// States of the endmarker-protection PDA. `S1`–`S5` carry the first record
/// (which must read and rewrite the endmarker, then move right), `S6` is the
/// accepting record boundary, `S7`/`S8` read a tracked endmarker/ordinary
/// cell. `Fail` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LemState {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    Fail,
}

/// Endmarker stack alphabet. One symbol above the bottom marker per visited
/// cell: `Lem` for a cell currently holding the endmarker, `Right` for an
/// ordinary cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LemStack {
    Bottom,
    Lem,
    Right,
}

lazy_static! {
    static ref ENDMARKER: PdaTable<LemState, Label, LemStack> = {
        use LemState::*;

        let b = LemStack::Bottom;
        let e = LemStack::Lem;
        let r = LemStack::Right;

        PdaTable::new(
            S1,
            b,
            [S6],
            Acceptance::FinalState,
            [
                // First record: the very first read must be the endmarker.
                ((S1, Label::Read, b), (S2, StackOp::Keep)),
                ((S2, Label::Lem, b), (S3, StackOp::Keep)),
                ((S2, Label::Symbol, b), (Fail, StackOp::Keep)),
                ((S2, Label::Blank, b), (Fail, StackOp::Keep)),
                // Write marker, any cell kind.
                ((S3, Label::Write, b), (S4, StackOp::Keep)),
                ((S3, Label::Write, e), (S4, StackOp::Keep)),
                ((S3, Label::Write, r), (S4, StackOp::Keep)),
                // Write symbol. The endmarker cell tolerates only the
                // endmarker; writing the endmarker over an ordinary cell
                // re-marks it.
                ((S4, Label::Lem, b), (S5, StackOp::Replace(vec![b, e]))),
                ((S4, Label::Symbol, b), (Fail, StackOp::Keep)),
                ((S4, Label::Blank, b), (Fail, StackOp::Keep)),
                ((S4, Label::Lem, e), (S5, StackOp::Keep)),
                ((S4, Label::Symbol, e), (Fail, StackOp::Keep)),
                ((S4, Label::Blank, e), (Fail, StackOp::Keep)),
                ((S4, Label::Symbol, r), (S5, StackOp::Keep)),
                ((S4, Label::Blank, r), (S5, StackOp::Keep)),
                ((S4, Label::Lem, r), (S5, StackOp::Replace(vec![e]))),
                // Move. Rightward pushes a marker for the newly entered
                // cell; leftward pops the current cell. Leaving a cell that
                // holds the endmarker leftward is fatal, which also covers
                // crossing left of the origin.
                ((S5, Label::MRight, e), (S6, StackOp::Replace(vec![e, r]))),
                ((S5, Label::MRight, r), (S6, StackOp::Replace(vec![r, r]))),
                ((S5, Label::MLeft, e), (Fail, StackOp::Keep)),
                ((S5, Label::MLeft, r), (S6, StackOp::Pop)),
                // Later records: dispatch on the tracked kind of the cell
                // under the head.
                ((S6, Label::Read, e), (S7, StackOp::Keep)),
                ((S6, Label::Read, r), (S8, StackOp::Keep)),
                // Reading a cell tracked as the endmarker must see the
                // endmarker.
                ((S7, Label::Lem, e), (S3, StackOp::Keep)),
                ((S7, Label::Symbol, e), (Fail, StackOp::Keep)),
                ((S7, Label::Blank, e), (Fail, StackOp::Keep)),
                // Reading an ordinary cell must not see the endmarker.
                ((S8, Label::Symbol, r), (S3, StackOp::Keep)),
                ((S8, Label::Blank, r), (S3, StackOp::Keep)),
                ((S8, Label::Lem, r), (Fail, StackOp::Keep)),
            ],
        )
    };
}

/// Checks that the left endmarker cell is read first, never overwritten by
/// anything but itself, and never crossed leftward, and that every revisited
/// cell reads back the kind of symbol the trace last left there.
///
/// Meant for traces that already passed [`verify_movement`]; on other traces
/// it still returns a boolean, never an error.
pub fn verify_lem(labels: &[Label]) -> bool {
    ENDMARKER.accepts(labels.iter().copied().filter(|l| *l != Label::Space))
}
