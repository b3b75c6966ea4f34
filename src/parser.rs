//! This module provides the parser for machine definition files, utilizing the
//! `pest` crate. It defines functions to parse the `.tm` statement format into
//! a [`MachineDef`].

use crate::{
    analyzer::analyze,
    types::{Action, Direction, MachineDef, MachineError, BLANK_SYMBOL, LEM_SYMBOL},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{HashMap, HashSet};

/// Derives a `PestParser` for the machine-definition grammar in
/// `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct MachineDefParser;

/// Parses the given definition text into a [`MachineDef`].
///
/// The parsed definition is validated by the analyzer before being returned,
/// so a successful parse is a runnable machine.
pub fn parse(input: &str) -> Result<MachineDef, MachineError> {
    let root = MachineDefParser::parse(Rule::machine, input.trim())
        .map_err(|e| MachineError::Parse(Box::new(e)))?
        .next()
        .unwrap();

    let def = parse_machine(root)?;

    analyze(&def)?;

    Ok(def)
}

/// Parses the top-level statement list of a machine definition.
fn parse_machine(pair: Pair<Rule>) -> Result<MachineDef, MachineError> {
    let mut name: Option<String> = None;
    let mut input_alphabet: Option<Vec<char>> = None;
    let mut start: Option<String> = None;
    let mut accept: Option<String> = None;
    let mut reject: Option<String> = None;
    let mut rules: HashMap<String, HashMap<char, Action>> = HashMap::new();
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let kind = p.as_rule();

        match kind {
            Rule::name | Rule::input | Rule::start | Rule::accept | Rule::reject => {
                check_unique_stmt(kind, span, &mut seen)?;
            }
            _ => {}
        }

        match kind {
            Rule::name => name = Some(inner_string(p)),
            Rule::input => {
                input_alphabet = Some(p.into_inner().map(|s| parse_symbol(s.as_str())).collect())
            }
            Rule::start => start = Some(inner_string(p)),
            Rule::accept => accept = Some(inner_string(p)),
            Rule::reject => reject = Some(inner_string(p)),
            Rule::rule => parse_rule(p, &mut rules)?,
            _ => {} // Skip EOI
        }
    }

    let name = check_required(name, "name")?;
    let input_alphabet = check_required(input_alphabet, "input")?;
    let start = check_required(start, "start")?;
    let accept = check_required(accept, "accept")?;
    let reject = check_required(reject, "reject")?;

    let tape_alphabet = tape_alphabet(&input_alphabet, &rules);

    Ok(MachineDef {
        name,
        input_alphabet,
        tape_alphabet,
        start,
        accept,
        reject,
        rules,
    })
}

/// Parses a single `rule:` statement into the nested rule map.
fn parse_rule(
    pair: Pair<Rule>,
    rules: &mut HashMap<String, HashMap<char, Action>>,
) -> Result<(), MachineError> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();

    let state = inner.next().unwrap().as_str().to_string();
    let read = parse_symbol(inner.next().unwrap().as_str());
    let write = parse_symbol(inner.next().unwrap().as_str());
    let direction = match inner.next().unwrap().as_str() {
        "L" => Direction::Left,
        _ => Direction::Right,
    };
    let next_state = inner.next().unwrap().as_str().to_string();

    let previous = rules.entry(state.clone()).or_default().insert(
        read,
        Action {
            write,
            direction,
            next_state,
        },
    );
    if previous.is_some() {
        return Err(parse_error(
            &format!("duplicate rule for state {} and symbol '{}'", state, read),
            span,
        ));
    }

    Ok(())
}

/// The tape alphabet implied by a definition: input alphabet, endmarker,
/// blank, and every symbol a rule reads or writes.
fn tape_alphabet(
    input_alphabet: &[char],
    rules: &HashMap<String, HashMap<char, Action>>,
) -> Vec<char> {
    let mut tape: Vec<char> = input_alphabet
        .iter()
        .copied()
        .chain([LEM_SYMBOL, BLANK_SYMBOL])
        .collect();
    for state_rules in rules.values() {
        for (read, action) in state_rules {
            tape.push(*read);
            tape.push(action.write);
        }
    }
    tape.sort_unstable();
    tape.dedup();
    tape
}

/// The string content of a single-child statement.
fn inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default()
}

/// The single character a `symbol` token matched.
fn parse_symbol(s: &str) -> char {
    s.chars().next().unwrap()
}

/// Errors on a top-level statement appearing twice.
fn check_unique_stmt(kind: Rule, span: Span, seen: &mut HashSet<Rule>) -> Result<(), MachineError> {
    if !seen.insert(kind) {
        return Err(parse_error(
            &format!("duplicate statement: {:?}", kind),
            span,
        ));
    }

    Ok(())
}

/// Errors on a missing required statement.
fn check_required<T>(value: Option<T>, what: &str) -> Result<T, MachineError> {
    value.ok_or_else(|| MachineError::Validation(format!("Missing required statement: {}", what)))
}

/// Creates a `MachineError::Parse` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::Parse(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN: &str = "\
name: scan
input: 0 1
start: s0
accept: t
reject: r

# scan rightward to the first blank
rule: s0 ⊢ -> ⊢, R, s1
rule: s1 0 -> 0, R, s1
rule: s1 1 -> 1, R, s1
rule: s1 ⊔ -> ⊔, R, t
";

    #[test]
    fn test_parse_valid_definition() {
        let def = parse(SCAN).unwrap();

        assert_eq!(def.name, "scan");
        assert_eq!(def.input_alphabet, vec!['0', '1']);
        assert_eq!(def.start, "s0");
        assert_eq!(def.accept, "t");
        assert_eq!(def.reject, "r");
        assert_eq!(def.rule_count(), 4);
        assert_eq!(def.tape_alphabet, vec!['0', '1', '⊔', '⊢']);

        let action = &def.rules["s1"][&'⊔'];
        assert_eq!(action.write, '⊔');
        assert_eq!(action.direction, Direction::Right);
        assert_eq!(action.next_state, "t");
    }

    #[test]
    fn test_missing_required_statement() {
        let text = "name: nothing\ninput: 0\nstart: s0\naccept: t\n";
        let err = parse(text).unwrap_err();
        match err {
            MachineError::Validation(msg) => assert!(msg.contains("reject")),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_statement() {
        let text = format!("{}\nstart: s1\n", SCAN);
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, MachineError::Parse(_)));
    }

    #[test]
    fn test_duplicate_rule() {
        let text = format!("{}rule: s1 0 -> 1, L, s1\n", SCAN);
        let err = parse(&text).unwrap_err();
        match err {
            MachineError::Parse(e) => {
                assert!(e.to_string().contains("duplicate rule"));
            }
            other => panic!("Expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_carries_position() {
        let err = parse("name: broken\nrule: s0 ⊢ -> ⊢ R s1\n").unwrap_err();
        assert!(matches!(err, MachineError::Parse(_)));
    }

    #[test]
    fn test_validation_runs_after_parsing() {
        // Start state has no rules.
        let text = "name: empty\ninput: 0\nstart: s0\naccept: t\nreject: r\nrule: s9 0 -> 0, R, t\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, MachineError::Validation(_)));
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let text = "# header comment\n\nname: scan\ninput: 0 1\nstart: s0\naccept: t\nreject: r\nrule: s0 ⊢ -> ⊢, R, s1\nrule: s1 0 -> 0, R, t\nrule: s1 1 -> 1, R, t\nrule: s1 ⊔ -> ⊔, R, t\n";
        assert!(parse(text).is_ok());
    }
}
