//! This module defines the [`Machine`] struct, which simulates a single-tape
//! machine over an endmarked tape and records the execution trace the
//! verifiers and extractors consume. Machines are built from hand-authored
//! transition tables ([`build_from_table`]) or parsed definition files;
//! inferring a machine from its traces is not supported.

use std::collections::HashMap;

use crate::analyzer::analyze;
use crate::types::{
    Action, Direction, MachineDef, MachineError, BLANK_SYMBOL, LEM_SYMBOL, MAX_EXECUTION_STEPS,
};

/// Represents the outcome of one machine execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and continues execution.
    Continue,
    /// The machine is in a halt state.
    Halted(Outcome),
}

/// Which halt state the machine finished in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    Reject,
}

/// Snapshot of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// The recorded execution trace, one `- r + w d` record per step.
    pub trace: String,
    /// The full final tape, endmarker included.
    pub tape: String,
    /// The halt state the machine finished in.
    pub outcome: Outcome,
    /// Number of executed steps.
    pub steps: usize,
}

impl Run {
    /// The tape contents after the endmarker, trailing blanks stripped.
    pub fn output(&self) -> String {
        self.tape
            .trim_start_matches(LEM_SYMBOL)
            .trim_end_matches(BLANK_SYMBOL)
            .to_string()
    }
}

/// Constructs a validated [`MachineDef`] from an explicitly authored
/// transition table keyed by `(state, read symbol)`.
///
/// `states` is the full state set; a rule mentioning a state outside it is
/// rejected before the analyzer ever runs.
pub fn build_from_table(
    name: &str,
    states: &[&str],
    input_alphabet: Vec<char>,
    tape_alphabet: Vec<char>,
    transitions: impl IntoIterator<Item = ((String, char), (String, char, Direction))>,
    start: &str,
    accept: &str,
    reject: &str,
) -> Result<MachineDef, MachineError> {
    let mut rules: HashMap<String, HashMap<char, Action>> = HashMap::new();
    for ((state, read), (next_state, write, direction)) in transitions {
        for mentioned in [state.as_str(), next_state.as_str()] {
            if !states.contains(&mentioned) {
                return Err(MachineError::Validation(format!(
                    "rule mentions state {} outside the state set",
                    mentioned
                )));
            }
        }

        let previous = rules.entry(state.clone()).or_default().insert(
            read,
            Action {
                write,
                direction,
                next_state,
            },
        );
        if previous.is_some() {
            return Err(MachineError::Validation(format!(
                "duplicate rule for state {} and symbol '{}'",
                state, read
            )));
        }
    }

    let def = MachineDef {
        name: name.to_string(),
        input_alphabet,
        tape_alphabet,
        start: start.to_string(),
        accept: accept.to_string(),
        reject: reject.to_string(),
        rules,
    };

    analyze(&def)?;

    Ok(def)
}

/// A running machine.
///
/// Encapsulates the mutable simulation state: current state, tape, head
/// position, step count, and the trace recorded so far. The definition
/// itself stays immutable.
pub struct Machine {
    def: MachineDef,
    state: String,
    tape: Vec<char>,
    head: usize,
    step_count: usize,
    records: Vec<String>,
}

impl Machine {
    /// Creates a machine in its initial configuration with an empty tape
    /// (endmarker only).
    pub fn new(def: MachineDef) -> Self {
        let state = def.start.clone();
        Self {
            def,
            state,
            tape: vec![LEM_SYMBOL],
            head: 0,
            step_count: 0,
            records: Vec::new(),
        }
    }

    /// Seats an input string on the tape, after the endmarker, and restores
    /// the initial configuration. Every input symbol must be in the
    /// machine's input alphabet.
    pub fn load_input(&mut self, input: &str) -> Result<(), MachineError> {
        for ch in input.chars() {
            if !self.def.input_alphabet.contains(&ch) {
                return Err(MachineError::BadInputSymbol(ch));
            }
        }

        self.tape = std::iter::once(LEM_SYMBOL).chain(input.chars()).collect();
        self.head = 0;
        self.state = self.def.start.clone();
        self.step_count = 0;
        self.records.clear();
        Ok(())
    }

    /// Restores the initial configuration, clearing tape, head, and trace.
    pub fn reset(&mut self) {
        self.tape = vec![LEM_SYMBOL];
        self.head = 0;
        self.state = self.def.start.clone();
        self.step_count = 0;
        self.records.clear();
    }

    /// Executes a single step: read, look up the rule, write, record the
    /// trace record, move, switch state.
    ///
    /// A missing rule is an error (the machine definition is incomplete,
    /// not "the machine halted"), as is moving left off the endmarker cell.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        if let Some(outcome) = self.halt_outcome() {
            return Ok(Step::Halted(outcome));
        }

        if self.head >= self.tape.len() {
            self.tape.resize(self.head + 1, BLANK_SYMBOL);
        }
        let read = self.tape[self.head];

        let action = self
            .def
            .rules
            .get(&self.state)
            .and_then(|rules| rules.get(&read))
            .cloned()
            .ok_or_else(|| MachineError::UndefinedTransition(self.state.clone(), read))?;

        self.tape[self.head] = action.write;
        self.records
            .push(format!("- {} + {} {}", read, action.write, action.direction));

        match action.direction {
            Direction::Left => {
                if self.head == 0 {
                    return Err(MachineError::TapeBoundary);
                }
                self.head -= 1;
            }
            Direction::Right => {
                self.head += 1;
            }
        }

        self.state = action.next_state;
        self.step_count += 1;

        Ok(Step::Continue)
    }

    /// Runs the machine until it halts, erroring out past the step limit.
    pub fn run(&mut self) -> Result<Run, MachineError> {
        for _ in 0..MAX_EXECUTION_STEPS {
            match self.step()? {
                Step::Continue => continue,
                Step::Halted(outcome) => {
                    return Ok(Run {
                        trace: self.execution_trace(),
                        tape: self.tape_string(),
                        outcome,
                        steps: self.step_count,
                    })
                }
            }
        }

        Err(MachineError::StepLimit(MAX_EXECUTION_STEPS))
    }

    /// The trace recorded so far, records joined by single spaces.
    pub fn execution_trace(&self) -> String {
        self.records.join(" ")
    }

    /// The current tape as a string.
    pub fn tape_string(&self) -> String {
        self.tape.iter().collect()
    }

    /// The current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// The current head position.
    pub fn head(&self) -> usize {
        self.head
    }

    /// The total number of steps executed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Whether the machine is in a halt state.
    pub fn is_halted(&self) -> bool {
        self.halt_outcome().is_some()
    }

    fn halt_outcome(&self) -> Option<Outcome> {
        if self.state == self.def.accept {
            Some(Outcome::Accept)
        } else if self.state == self.def.reject {
            Some(Outcome::Reject)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A machine scanning its input rightward, accepting on the first blank.
    fn scan_def() -> MachineDef {
        let s = String::from;
        build_from_table(
            "scan",
            &["s0", "s1", "t", "r"],
            vec!['0', '1'],
            vec!['0', '1', LEM_SYMBOL, BLANK_SYMBOL],
            [
                ((s("s0"), LEM_SYMBOL), (s("s1"), LEM_SYMBOL, Direction::Right)),
                ((s("s1"), '0'), (s("s1"), '0', Direction::Right)),
                ((s("s1"), '1'), (s("s1"), '1', Direction::Right)),
                ((s("s1"), BLANK_SYMBOL), (s("t"), BLANK_SYMBOL, Direction::Right)),
            ],
            "s0",
            "t",
            "r",
        )
        .unwrap()
    }

    #[test]
    fn test_machine_creation() {
        let machine = Machine::new(scan_def());

        assert_eq!(machine.state(), "s0");
        assert_eq!(machine.tape_string(), "⊢");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.step_count(), 0);
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_single_step_records_a_trace_record() {
        let mut machine = Machine::new(scan_def());
        machine.load_input("01").unwrap();

        let step = machine.step().unwrap();

        assert_eq!(step, Step::Continue);
        assert_eq!(machine.state(), "s1");
        assert_eq!(machine.head(), 1);
        assert_eq!(machine.execution_trace(), "- ⊢ + ⊢ >");
    }

    #[test]
    fn test_run_to_acceptance() {
        let mut machine = Machine::new(scan_def());
        machine.load_input("01").unwrap();

        let run = machine.run().unwrap();

        assert_eq!(run.outcome, Outcome::Accept);
        assert_eq!(run.steps, 4);
        assert_eq!(run.trace, "- ⊢ + ⊢ > - 0 + 0 > - 1 + 1 > - ⊔ + ⊔ >");
        assert_eq!(run.tape, "⊢01⊔");
        assert_eq!(run.output(), "01");
    }

    #[test]
    fn test_step_after_halt_reports_outcome() {
        let mut machine = Machine::new(scan_def());
        machine.load_input("").unwrap();
        machine.run().unwrap();

        assert!(machine.is_halted());
        assert_eq!(machine.step().unwrap(), Step::Halted(Outcome::Accept));
    }

    #[test]
    fn test_undefined_transition_is_an_error() {
        let mut def = scan_def();
        def.rules.get_mut("s1").unwrap().remove(&'1');
        let mut machine = Machine::new(def);
        machine.load_input("1").unwrap();
        machine.step().unwrap();

        let err = machine.step().unwrap_err();
        assert_eq!(err, MachineError::UndefinedTransition(String::from("s1"), '1'));
    }

    #[test]
    fn test_moving_left_off_the_endmarker_is_an_error() {
        let s = String::from;
        // Validation would reject this table; construct the definition
        // directly to exercise the runtime guard.
        let mut rules: HashMap<String, HashMap<char, Action>> = HashMap::new();
        rules.entry(s("s0")).or_default().insert(
            LEM_SYMBOL,
            Action {
                write: LEM_SYMBOL,
                direction: Direction::Left,
                next_state: s("t"),
            },
        );
        let def = MachineDef {
            name: s("backwards"),
            input_alphabet: vec![],
            tape_alphabet: vec![LEM_SYMBOL, BLANK_SYMBOL],
            start: s("s0"),
            accept: s("t"),
            reject: s("r"),
            rules,
        };

        let mut machine = Machine::new(def);
        assert_eq!(machine.step().unwrap_err(), MachineError::TapeBoundary);
    }

    #[test]
    fn test_runaway_machine_hits_the_step_limit() {
        let s = String::from;
        let def = build_from_table(
            "pacer",
            &["s0", "s1", "s2", "t", "r"],
            vec![],
            vec![LEM_SYMBOL, BLANK_SYMBOL],
            [
                ((s("s0"), LEM_SYMBOL), (s("s1"), LEM_SYMBOL, Direction::Right)),
                ((s("s1"), BLANK_SYMBOL), (s("s2"), BLANK_SYMBOL, Direction::Right)),
                ((s("s2"), BLANK_SYMBOL), (s("s1"), BLANK_SYMBOL, Direction::Left)),
                ((s("s1"), BLANK_SYMBOL), (s("s1"), BLANK_SYMBOL, Direction::Right)),
            ],
            "s0",
            "t",
            "r",
        );
        // (s1, blank) appears twice; the table is rejected.
        assert!(def.is_err());

        let def = build_from_table(
            "pacer",
            &["s0", "s1", "s2", "t", "r"],
            vec![],
            vec![LEM_SYMBOL, BLANK_SYMBOL],
            [
                ((s("s0"), LEM_SYMBOL), (s("s1"), LEM_SYMBOL, Direction::Right)),
                ((s("s1"), BLANK_SYMBOL), (s("s2"), BLANK_SYMBOL, Direction::Right)),
                ((s("s2"), BLANK_SYMBOL), (s("s1"), BLANK_SYMBOL, Direction::Left)),
            ],
            "s0",
            "t",
            "r",
        )
        .unwrap();

        let mut machine = Machine::new(def);
        assert_eq!(
            machine.run().unwrap_err(),
            MachineError::StepLimit(MAX_EXECUTION_STEPS)
        );
    }

    #[test]
    fn test_rule_outside_the_state_set_is_rejected() {
        let s = String::from;
        let def = build_from_table(
            "stray",
            &["s0", "t", "r"],
            vec![],
            vec![LEM_SYMBOL, BLANK_SYMBOL],
            [((s("s0"), LEM_SYMBOL), (s("s9"), LEM_SYMBOL, Direction::Right))],
            "s0",
            "t",
            "r",
        );
        assert!(matches!(def.unwrap_err(), MachineError::Validation(_)));
    }

    #[test]
    fn test_bad_input_symbol() {
        let mut machine = Machine::new(scan_def());
        assert_eq!(
            machine.load_input("02").unwrap_err(),
            MachineError::BadInputSymbol('2')
        );
    }

    #[test]
    fn test_reset() {
        let mut machine = Machine::new(scan_def());
        machine.load_input("0").unwrap();
        machine.run().unwrap();
        assert!(machine.is_halted());

        machine.reset();
        assert_eq!(machine.state(), "s0");
        assert_eq!(machine.tape_string(), "⊢");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.execution_trace(), "");
    }
}
