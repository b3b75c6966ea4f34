//! Generic deterministic finite automaton simulation.
//!
//! A [`DfaTable`] is immutable once built and carries no simulation state:
//! callers thread the current state through the pure [`DfaTable::step`] call.
//! The [`Dfa`] wrapper bundles a table reference with a cursor for callers
//! that prefer the stateful style; a wrapper must not be shared across
//! concurrently simulated inputs.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use thiserror::Error;

/// Returned when an automaton has no transition for the current
/// configuration. The automaton is stuck; callers decide whether that is a
/// hard error or a verification "no".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("automaton rejected: no transition defined")]
pub struct Rejected;

/// An immutable DFA: start state, accept set, and a partial transition table.
///
/// Pairs absent from the table reject. The state set is implied by the table
/// together with the start and accept states, so every transition target is a
/// member by construction.
#[derive(Debug, Clone)]
pub struct DfaTable<Q, A> {
    start: Q,
    accept: HashSet<Q>,
    delta: HashMap<(Q, A), Q>,
}

impl<Q, A> DfaTable<Q, A>
where
    Q: Copy + Eq + Hash,
    A: Copy + Eq + Hash,
{
    /// Builds a table from its start state, accept states, and transitions.
    pub fn new(
        start: Q,
        accept: impl IntoIterator<Item = Q>,
        transitions: impl IntoIterator<Item = ((Q, A), Q)>,
    ) -> Self {
        Self {
            start,
            accept: accept.into_iter().collect(),
            delta: transitions.into_iter().collect(),
        }
    }

    /// The start state.
    pub fn start(&self) -> Q {
        self.start
    }

    /// Pure single-step simulation: the successor of `state` on `input`, or
    /// [`Rejected`] if the pair is undefined.
    pub fn step(&self, state: Q, input: A) -> Result<Q, Rejected> {
        self.delta.get(&(state, input)).copied().ok_or(Rejected)
    }

    /// Whether `state` is in the accept set.
    pub fn is_accepting(&self, state: Q) -> bool {
        self.accept.contains(&state)
    }

    /// Runs the whole input from the start state and reports acceptance.
    /// A missing transition anywhere rejects.
    pub fn accepts(&self, inputs: impl IntoIterator<Item = A>) -> bool {
        let mut state = self.start;
        for input in inputs {
            match self.step(state, input) {
                Ok(next) => state = next,
                Err(Rejected) => return false,
            }
        }
        self.is_accepting(state)
    }
}

/// A stateful cursor over a [`DfaTable`].
#[derive(Debug)]
pub struct Dfa<'t, Q, A> {
    table: &'t DfaTable<Q, A>,
    state: Q,
}

impl<'t, Q, A> Dfa<'t, Q, A>
where
    Q: Copy + Eq + Hash,
    A: Copy + Eq + Hash,
{
    /// Creates a cursor positioned on the table's start state.
    pub fn new(table: &'t DfaTable<Q, A>) -> Self {
        Self {
            table,
            state: table.start(),
        }
    }

    /// Moves the cursor back to the start state.
    pub fn reset(&mut self) {
        self.state = self.table.start();
    }

    /// Advances the cursor on `input`. On a miss the cursor is left where it
    /// was and [`Rejected`] is returned; the only recovery is [`Dfa::reset`].
    pub fn transition(&mut self, input: A) -> Result<Q, Rejected> {
        let next = self.table.step(self.state, input)?;
        self.state = next;
        Ok(next)
    }

    /// The state the cursor is currently in.
    pub fn current_state(&self) -> Q {
        self.state
    }

    /// Whether the cursor is in an accepting state.
    pub fn is_accepting(&self) -> bool {
        self.table.is_accepting(self.state)
    }
}
