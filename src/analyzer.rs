//! This module provides functions for analyzing machine definitions to detect
//! common errors before execution: missing or unreachable states, symbols
//! outside the tape alphabet, and rules that would break the endmarker
//! discipline at runtime.

use crate::types::{Direction, MachineDef, MachineError, LEM_SYMBOL};
use std::collections::HashSet;

/// Represents various errors that can be found during the analysis of a
/// machine definition.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The start state has no rules.
    InvalidStartState(String),
    /// Rules reference next states that are neither rule sources nor halt
    /// states.
    UndefinedNextStates(Vec<String>),
    /// States with rules that cannot be reached from the start state.
    UnreachableStates(Vec<String>),
    /// Rule symbols missing from the tape alphabet.
    InvalidSymbols(Vec<char>),
    /// A rule reads the endmarker but does not rewrite it and move right.
    EndmarkerViolation(String),
    /// Basic structural problems (no rules, halt states with rules, ...).
    StructuralError(String),
}

impl From<AnalysisError> for MachineError {
    /// Converts an `AnalysisError` into a `MachineError::Validation`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::InvalidStartState(state) => {
                MachineError::Validation(format!("Invalid start state: {}", state))
            }
            AnalysisError::UndefinedNextStates(states) => MachineError::Validation(format!(
                "Rules reference undefined states: {:?}",
                states
            )),
            AnalysisError::UnreachableStates(states) => MachineError::Validation(format!(
                "Unreachable states detected: {:?}",
                states
            )),
            AnalysisError::InvalidSymbols(symbols) => MachineError::Validation(format!(
                "Rules use symbols outside the tape alphabet: {:?}",
                symbols
            )),
            AnalysisError::EndmarkerViolation(msg) => MachineError::Validation(msg),
            AnalysisError::StructuralError(msg) => MachineError::Validation(msg),
        }
    }
}

/// Analyzes a machine definition for structural and logical errors.
///
/// Runs the full check series and reports the first failure.
pub fn analyze(def: &MachineDef) -> Result<(), MachineError> {
    let errors = [
        check_structure,
        check_start_state,
        check_next_states,
        check_reachability,
        check_symbols,
        check_endmarker_discipline,
    ]
    .iter()
    .filter_map(|check| check(def).err())
    .collect::<Vec<_>>();

    if let Some(first_error) = errors.first() {
        return Err(first_error.clone().into());
    }

    Ok(())
}

/// Checks basic structural requirements: at least one rule, distinct halt
/// states, and no rules leaving a halt state.
fn check_structure(def: &MachineDef) -> Result<(), AnalysisError> {
    if def.rules.is_empty() {
        return Err(AnalysisError::StructuralError(
            "No rules defined".to_string(),
        ));
    }

    if def.accept == def.reject {
        return Err(AnalysisError::StructuralError(format!(
            "Accept and reject states are both '{}'",
            def.accept
        )));
    }

    for halt in [&def.accept, &def.reject] {
        if def.rules.contains_key(halt) {
            return Err(AnalysisError::StructuralError(format!(
                "Halt state '{}' has outgoing rules",
                halt
            )));
        }
    }

    Ok(())
}

/// Checks that the start state appears as a rule source.
fn check_start_state(def: &MachineDef) -> Result<(), AnalysisError> {
    if !def.rules.contains_key(&def.start) {
        return Err(AnalysisError::InvalidStartState(def.start.clone()));
    }

    Ok(())
}

/// Checks that every `next_state` is a rule source or one of the halt
/// states.
fn check_next_states(def: &MachineDef) -> Result<(), AnalysisError> {
    let mut undefined = Vec::new();
    for (state, rules) in &def.rules {
        for (read, action) in rules {
            let next = &action.next_state;
            if !def.rules.contains_key(next) && *next != def.accept && *next != def.reject {
                undefined.push(format!("{}['{}'] -> {}", state, read, next));
            }
        }
    }

    if !undefined.is_empty() {
        undefined.sort();
        return Err(AnalysisError::UndefinedNextStates(undefined));
    }

    Ok(())
}

/// Checks for unreachable states by a breadth-first traversal from the start
/// state. The halt states are implicitly reachable; an unreferenced reject
/// state in particular is normal for machines that accept every input.
fn check_reachability(def: &MachineDef) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut queue = vec![def.start.clone()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }

        if let Some(rules) = def.rules.get(&state) {
            for action in rules.values() {
                if !visited.contains(&action.next_state) {
                    queue.push(action.next_state.clone());
                }
            }
        }
    }

    let all_states: HashSet<String> = def.rules.keys().cloned().collect();
    let mut unreachable: Vec<String> = all_states.difference(&visited).cloned().collect();

    if !unreachable.is_empty() {
        unreachable.sort(); // Sort for deterministic output
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

/// Checks that every symbol read or written by a rule, and every input
/// symbol, is part of the tape alphabet.
fn check_symbols(def: &MachineDef) -> Result<(), AnalysisError> {
    let tape: HashSet<char> = def.tape_alphabet.iter().copied().collect();

    let mut invalid = HashSet::new();
    for ch in &def.input_alphabet {
        if !tape.contains(ch) {
            invalid.insert(*ch);
        }
    }
    for rules in def.rules.values() {
        for (read, action) in rules {
            if !tape.contains(read) {
                invalid.insert(*read);
            }
            if !tape.contains(&action.write) {
                invalid.insert(action.write);
            }
        }
    }

    if !invalid.is_empty() {
        let mut invalid: Vec<char> = invalid.into_iter().collect();
        invalid.sort();
        return Err(AnalysisError::InvalidSymbols(invalid));
    }

    Ok(())
}

/// Checks that rules reading the endmarker rewrite it in place and move
/// right. A machine breaking this would produce traces the sentinel
/// verifier rejects.
fn check_endmarker_discipline(def: &MachineDef) -> Result<(), AnalysisError> {
    for (state, rules) in &def.rules {
        if let Some(action) = rules.get(&LEM_SYMBOL) {
            if action.write != LEM_SYMBOL || action.direction != Direction::Right {
                return Err(AnalysisError::EndmarkerViolation(format!(
                    "Rule for state {} reads '{}' but does not rewrite it and move right",
                    state, LEM_SYMBOL
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;
    use std::collections::HashMap;

    fn rule(read: char, write: char, direction: Direction, next: &str) -> (char, Action) {
        (
            read,
            Action {
                write,
                direction,
                next_state: next.to_string(),
            },
        )
    }

    fn def_with_rules(rules: HashMap<String, HashMap<char, Action>>) -> MachineDef {
        MachineDef {
            name: "test".to_string(),
            input_alphabet: vec!['a', 'b'],
            tape_alphabet: vec!['a', 'b', LEM_SYMBOL, '⊔'],
            start: "start".to_string(),
            accept: "t".to_string(),
            reject: "r".to_string(),
            rules,
        }
    }

    fn valid_rules() -> HashMap<String, HashMap<char, Action>> {
        let mut rules = HashMap::new();
        rules.insert(
            "start".to_string(),
            HashMap::from([rule(LEM_SYMBOL, LEM_SYMBOL, Direction::Right, "scan")]),
        );
        rules.insert(
            "scan".to_string(),
            HashMap::from([
                rule('a', 'b', Direction::Right, "scan"),
                rule('⊔', '⊔', Direction::Right, "t"),
            ]),
        );
        rules
    }

    #[test]
    fn test_valid_definition() {
        let def = def_with_rules(valid_rules());
        assert!(analyze(&def).is_ok());
    }

    #[test]
    fn test_invalid_start_state() {
        let mut def = def_with_rules(valid_rules());
        def.start = "missing".to_string();

        let result = analyze(&def);
        assert!(result.is_err());
        if let Err(MachineError::Validation(msg)) = result {
            assert!(msg.contains("Invalid start state: missing"));
        } else {
            panic!("Expected Validation error");
        }
    }

    #[test]
    fn test_undefined_next_states() {
        let mut rules = valid_rules();
        rules
            .get_mut("scan")
            .unwrap()
            .extend([rule('b', 'b', Direction::Right, "nowhere")]);

        let result = check_next_states(&def_with_rules(rules));
        assert!(result.is_err());
        match result.unwrap_err() {
            AnalysisError::UndefinedNextStates(states) => {
                assert_eq!(states.len(), 1);
                assert!(states[0].contains("nowhere"));
            }
            other => panic!("Expected UndefinedNextStates, got {:?}", other),
        }
    }

    #[test]
    fn test_halt_states_need_no_rules() {
        // "t" and "r" never appear as sources; reachability and next-state
        // checks must both tolerate that.
        let def = def_with_rules(valid_rules());
        assert!(check_next_states(&def).is_ok());
        assert!(check_reachability(&def).is_ok());
    }

    #[test]
    fn test_unreachable_states() {
        let mut rules = valid_rules();
        rules.insert(
            "island".to_string(),
            HashMap::from([rule('a', 'a', Direction::Right, "island")]),
        );

        let result = check_reachability(&def_with_rules(rules));
        match result.unwrap_err() {
            AnalysisError::UnreachableStates(states) => {
                assert_eq!(states, vec!["island".to_string()]);
            }
            other => panic!("Expected UnreachableStates, got {:?}", other),
        }
    }

    #[test]
    fn test_symbols_outside_tape_alphabet() {
        let mut rules = valid_rules();
        rules
            .get_mut("scan")
            .unwrap()
            .extend([rule('x', 'y', Direction::Left, "scan")]);

        let result = check_symbols(&def_with_rules(rules));
        match result.unwrap_err() {
            AnalysisError::InvalidSymbols(symbols) => {
                assert_eq!(symbols, vec!['x', 'y']);
            }
            other => panic!("Expected InvalidSymbols, got {:?}", other),
        }
    }

    #[test]
    fn test_endmarker_discipline() {
        let mut rules = valid_rules();
        rules.insert(
            "bad".to_string(),
            HashMap::from([rule(LEM_SYMBOL, '⊔', Direction::Right, "scan")]),
        );
        // Keep the state reachable so only the discipline check fires.
        rules
            .get_mut("scan")
            .unwrap()
            .extend([rule('b', 'b', Direction::Left, "bad")]);

        let result = check_endmarker_discipline(&def_with_rules(rules));
        assert!(matches!(
            result.unwrap_err(),
            AnalysisError::EndmarkerViolation(_)
        ));
    }

    #[test]
    fn test_halt_state_with_rules_is_structural_error() {
        let mut rules = valid_rules();
        rules.insert(
            "t".to_string(),
            HashMap::from([rule('a', 'a', Direction::Right, "t")]),
        );

        let result = check_structure(&def_with_rules(rules));
        assert!(matches!(
            result.unwrap_err(),
            AnalysisError::StructuralError(_)
        ));
    }

    #[test]
    fn test_analysis_error_conversion() {
        let error = AnalysisError::InvalidStartState("s9".to_string());
        let machine_error: MachineError = error.into();

        match machine_error {
            MachineError::Validation(msg) => {
                assert!(msg.contains("Invalid start state: s9"));
            }
            _ => panic!("Expected Validation error"),
        }
    }
}
