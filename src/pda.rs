//! Generic deterministic pushdown automaton simulation.
//!
//! The transition relation is a map keyed by `(state, input, stack top)`, so
//! a missing transition is an explicit O(1) miss rather than the end of a
//! linear scan. As with the DFA engine, the table is immutable and the whole
//! configuration (state + stack) is threaded through the pure
//! [`PdaTable::step`] call; [`Pda`] is the stateful convenience wrapper.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::dfa::Rejected;

/// How a transition rewrites the stack top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackOp<G> {
    /// Remove the top symbol.
    Pop,
    /// Leave the top symbol in place.
    Keep,
    /// Replace the top symbol with a sequence; the last element becomes the
    /// new top.
    Replace(Vec<G>),
}

/// Acceptance mode of a pushdown automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Accept on control state alone; stack contents are irrelevant.
    FinalState,
    /// Accept when only the bottom marker remains on the stack.
    EmptyStack,
}

/// A configuration of a running PDA: control state plus stack, top last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config<Q, G> {
    pub state: Q,
    pub stack: Vec<G>,
}

/// An immutable PDA definition.
///
/// The initial stack holds exactly the bottom marker. Legal tables never pop
/// the bottom marker; a transition that would need to look below it is simply
/// absent, which rejects.
#[derive(Debug, Clone)]
pub struct PdaTable<Q, A, G> {
    start: Q,
    bottom: G,
    accept: HashSet<Q>,
    mode: Acceptance,
    delta: HashMap<(Q, A, G), (Q, StackOp<G>)>,
}

impl<Q, A, G> PdaTable<Q, A, G>
where
    Q: Copy + Eq + Hash,
    A: Copy + Eq + Hash,
    G: Copy + Eq + Hash,
{
    /// Builds a table from its start state, bottom marker, accept states,
    /// acceptance mode, and transition entries.
    pub fn new(
        start: Q,
        bottom: G,
        accept: impl IntoIterator<Item = Q>,
        mode: Acceptance,
        transitions: impl IntoIterator<Item = ((Q, A, G), (Q, StackOp<G>))>,
    ) -> Self {
        Self {
            start,
            bottom,
            accept: accept.into_iter().collect(),
            mode,
            delta: transitions.into_iter().collect(),
        }
    }

    /// The initial configuration: start state, stack holding the bottom
    /// marker.
    pub fn initial(&self) -> Config<Q, G> {
        Config {
            state: self.start,
            stack: vec![self.bottom],
        }
    }

    /// Pure single-step simulation. Looks up `(state, input, top)`; on a hit
    /// the returned configuration carries the successor state and rewritten
    /// stack, on a miss (or an empty stack) the automaton is stuck.
    pub fn step(&self, mut config: Config<Q, G>, input: A) -> Result<Config<Q, G>, Rejected> {
        let top = *config.stack.last().ok_or(Rejected)?;
        let (next, op) = self
            .delta
            .get(&(config.state, input, top))
            .ok_or(Rejected)?;

        match op {
            StackOp::Pop => {
                config.stack.pop();
            }
            StackOp::Keep => {}
            StackOp::Replace(seq) => {
                config.stack.pop();
                config.stack.extend(seq.iter().copied());
            }
        }
        config.state = *next;
        Ok(config)
    }

    /// Whether a configuration is accepting under the table's mode.
    pub fn is_accepting(&self, config: &Config<Q, G>) -> bool {
        match self.mode {
            Acceptance::FinalState => self.accept.contains(&config.state),
            Acceptance::EmptyStack => config.stack == [self.bottom],
        }
    }

    /// Runs the whole input from the initial configuration and reports
    /// acceptance. A stuck configuration anywhere rejects.
    pub fn accepts(&self, inputs: impl IntoIterator<Item = A>) -> bool {
        let mut config = self.initial();
        for input in inputs {
            match self.step(config, input) {
                Ok(next) => config = next,
                Err(Rejected) => return false,
            }
        }
        self.is_accepting(&config)
    }
}

/// A stateful cursor over a [`PdaTable`].
#[derive(Debug)]
pub struct Pda<'t, Q, A, G> {
    table: &'t PdaTable<Q, A, G>,
    config: Config<Q, G>,
}

impl<'t, Q, A, G> Pda<'t, Q, A, G>
where
    Q: Copy + Eq + Hash,
    A: Copy + Eq + Hash,
    G: Copy + Eq + Hash,
{
    /// Creates a cursor in the table's initial configuration.
    pub fn new(table: &'t PdaTable<Q, A, G>) -> Self {
        Self {
            table,
            config: table.initial(),
        }
    }

    /// Restores the initial configuration.
    pub fn reset(&mut self) {
        self.config = self.table.initial();
    }

    /// Advances on `input`. On a miss the configuration is unchanged.
    pub fn transition(&mut self, input: A) -> Result<(), Rejected> {
        self.config = self.table.step(self.config.clone(), input)?;
        Ok(())
    }

    /// The current control state.
    pub fn current_state(&self) -> Q {
        self.config.state
    }

    /// The current stack, bottom first.
    pub fn stack(&self) -> &[G] {
        &self.config.stack
    }

    /// Whether the current configuration is accepting.
    pub fn is_accepting(&self) -> bool {
        self.table.is_accepting(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Balanced parentheses, accepted by empty stack.
    fn parens() -> PdaTable<u8, char, char> {
        PdaTable::new(
            0,
            '$',
            [],
            Acceptance::EmptyStack,
            [
                ((0, '(', '$'), (0, StackOp::Replace(vec!['$', 'X']))),
                ((0, '(', 'X'), (0, StackOp::Replace(vec!['X', 'X']))),
                ((0, ')', 'X'), (0, StackOp::Pop)),
            ],
        )
    }

    #[test]
    fn test_empty_stack_acceptance() {
        let table = parens();
        assert!(table.accepts("".chars()));
        assert!(table.accepts("(())()".chars()));
        assert!(!table.accepts("((".chars()));
        // ')' on the bottom marker has no entry: stuck, rejected.
        assert!(!table.accepts("())".chars()));
    }

    #[test]
    fn test_replace_puts_last_symbol_on_top() {
        let table = parens();
        let config = table.step(table.initial(), '(').unwrap();
        assert_eq!(config.stack, vec!['$', 'X']);
        let config = table.step(config, '(').unwrap();
        assert_eq!(config.stack, vec!['$', 'X', 'X']);
    }

    #[test]
    fn test_final_state_acceptance_ignores_stack() {
        // One 'a' moves to the accepting state and pushes; stack is ignored.
        let table: PdaTable<u8, char, char> = PdaTable::new(
            0,
            '$',
            [1],
            Acceptance::FinalState,
            [
                ((0, 'a', '$'), (1, StackOp::Replace(vec!['$', 'X']))),
                ((1, 'a', 'X'), (1, StackOp::Replace(vec!['X', 'X']))),
            ],
        );
        assert!(table.accepts("a".chars()));
        assert!(table.accepts("aaa".chars()));
        assert!(!table.accepts("".chars()));
    }

    #[test]
    fn test_cursor_reset() {
        let table = parens();
        let mut pda = Pda::new(&table);

        pda.transition('(').unwrap();
        assert_eq!(pda.stack(), &['$', 'X']);
        assert!(!pda.is_accepting());

        assert_eq!(pda.transition('x'), Err(Rejected));
        assert_eq!(pda.stack(), &['$', 'X']);

        pda.reset();
        assert_eq!(pda.stack(), &['$']);
        assert!(pda.is_accepting());
    }
}
