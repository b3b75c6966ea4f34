use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use retrace::{
    extract_input, extract_output, labels, parse_labels, tokenize, verify_lem, verify_movement,
    verify_steps, Catalog, Label, Loader, Machine, Outcome, TraceError,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Tokenize raw traces and print one token list per trace
    Tokenize {
        /// The trace file, one raw trace per line
        file: PathBuf,

        /// Print space-separated label lines instead of token lists
        #[clap(long)]
        labels: bool,
    },

    /// Tokenize raw traces and check the step-cycle grammar
    Verify {
        /// The trace file, one raw trace per line
        file: PathBuf,

        /// Print one JSON object per trace instead of text blocks
        #[clap(long)]
        json: bool,
    },

    /// Check movement and endmarker protection on tokenized traces
    Check {
        /// The trace file, one space-separated label line per trace
        file: PathBuf,

        /// Treat the file as raw traces and tokenize them first
        #[clap(long)]
        raw: bool,
    },

    /// Recover the original input and the final tape from raw traces
    Extract {
        /// The trace file, one raw trace per line
        file: PathBuf,

        /// Print one JSON object per trace instead of text blocks
        #[clap(long)]
        json: bool,
    },

    /// Run a machine on an input and print the trace it produces
    Run {
        /// A catalog machine name or a path to a .tm file
        #[clap(short, long)]
        machine: String,

        /// The input string to seat on the tape
        #[clap(short, long, default_value = "")]
        input: String,
    },

    /// List the embedded machines
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Tokenize { file, labels } => cmd_tokenize(&file, labels),
        Cmd::Verify { file, json } => cmd_verify(&file, json),
        Cmd::Check { file, raw } => cmd_check(&file, raw),
        Cmd::Extract { file, json } => cmd_extract(&file, json),
        Cmd::Run { machine, input } => cmd_run(&machine, &input),
        Cmd::List => cmd_list(),
    }
}

fn read_traces(file: &Path) -> Result<Vec<String>> {
    let traces = Loader::read_traces(file)
        .with_context(|| format!("reading traces from {}", file.display()))?;
    info!("loaded {} trace(s) from {}", traces.len(), file.display());
    Ok(traces)
}

fn cmd_tokenize(file: &Path, labels_only: bool) -> Result<()> {
    for trace in read_traces(file)? {
        println!("Trace : \"{}\"", trace);
        match tokenize(&trace) {
            Ok(tokens) if labels_only => {
                let line: Vec<String> = labels(&tokens).iter().map(Label::to_string).collect();
                println!("Labels: {}", line.join(" "));
            }
            Ok(tokens) => {
                let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
                println!("Lexer : [{}]", rendered.join(", "));
            }
            Err(e) => println!("Lexer : error: {}", e),
        }
    }
    Ok(())
}

fn cmd_verify(file: &Path, json_output: bool) -> Result<()> {
    for trace in read_traces(file)? {
        let lexed = tokenize(&trace);

        if json_output {
            let report = match &lexed {
                Ok(tokens) => {
                    let step_labels: Vec<Label> = tokens.iter().map(|t| t.label).collect();
                    json!({
                        "trace": trace,
                        "steps": verify_steps(&step_labels),
                    })
                }
                Err(e) => json!({ "trace": trace, "error": e.to_string() }),
            };
            println!("{}", report);
            continue;
        }

        println!("Trace : \"{}\"", trace);
        match lexed {
            Ok(tokens) => {
                let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
                println!("Lexer : [{}]", rendered.join(", "));
                let step_labels: Vec<Label> = tokens.iter().map(|t| t.label).collect();
                println!("Verify: {}", verify_steps(&step_labels));
            }
            Err(e) => println!("Lexer : error: {}", e),
        }
    }
    Ok(())
}

/// Turns one line of the input file into a label stream, tokenizing first
/// when the file holds raw traces.
fn line_to_labels(line: &str, raw: bool) -> Result<Vec<Label>, TraceError> {
    if raw {
        Ok(labels(&tokenize(line)?))
    } else {
        parse_labels(line)
    }
}

fn cmd_check(file: &Path, raw: bool) -> Result<()> {
    let mut valid: Vec<(String, Vec<Label>)> = Vec::new();
    for line in read_traces(file)? {
        match line_to_labels(&line, raw) {
            Ok(label_stream) => valid.push((line, label_stream)),
            Err(e) => {
                println!("Trace          : \"{}\"", line);
                println!("Verify movement: error: {}", e);
            }
        }
    }

    // Verify traces using the verification chain
    for (trace, label_stream) in &valid {
        println!("Trace          : \"{}\"", trace);
        println!("Verify movement: {}", verify_movement(label_stream));
    }
    let valid: Vec<_> = valid
        .into_iter()
        .filter(|(_, l)| verify_movement(l))
        .collect();

    for (trace, label_stream) in &valid {
        println!("Trace          : \"{}\"", trace);
        println!("Verify LEM     : {}", verify_lem(label_stream));
    }
    let valid: Vec<_> = valid.into_iter().filter(|(_, l)| verify_lem(l)).collect();

    // Print the remaining valid trace(s)
    println!("Remaining trace(s):");
    for (trace, _) in valid {
        println!("{}", trace);
    }
    Ok(())
}

fn cmd_extract(file: &Path, json_output: bool) -> Result<()> {
    for trace in read_traces(file)? {
        let extracted = extract_input(&trace)
            .and_then(|input| extract_output(&trace).map(|output| (input, output)));

        if json_output {
            let report = match &extracted {
                Ok((input, output)) => json!({
                    "trace": trace,
                    "input": input,
                    "output": output,
                }),
                Err(e) => json!({ "trace": trace, "error": e.to_string() }),
            };
            println!("{}", report);
            continue;
        }

        println!("Trace : \"{}\"", trace);
        match extracted {
            Ok((input, output)) => {
                println!("Input : \"{}\"", input);
                println!("Output: \"{}\"", output);
            }
            Err(e) => println!("Error : {}", e),
        }
    }
    Ok(())
}

fn cmd_run(machine: &str, input: &str) -> Result<()> {
    let path = Path::new(machine);
    let def = if path.exists() {
        Loader::load_machine(path)
            .with_context(|| format!("loading machine from {}", path.display()))?
    } else {
        Catalog::get_machine_by_name(machine)
            .with_context(|| format!("looking up catalog machine \"{}\"", machine))?
    };
    debug!("machine {} has {} rule(s)", def.name, def.rule_count());

    let mut machine = Machine::new(def);
    machine.load_input(input).context("loading input")?;
    let run = machine.run().context("running machine")?;

    let outcome = match run.outcome {
        Outcome::Accept => "accepted",
        Outcome::Reject => "rejected",
    };

    println!("Input  : \"{}\"", input);
    println!("Trace  : \"{}\"", run.trace);
    println!("Steps  : {}", run.steps);
    println!("Outcome: {}", outcome);
    println!("Tape   : \"{}\"", run.tape);
    println!("Output : \"{}\"", run.output());
    Ok(())
}

fn cmd_list() -> Result<()> {
    for index in 0..Catalog::machine_count() {
        let info = Catalog::get_machine_info(index)
            .with_context(|| format!("reading catalog entry {}", index))?;
        println!(
            "{}: {} ({} states, {} rules, start {})",
            info.index, info.name, info.state_count, info.rule_count, info.start
        );
    }
    Ok(())
}
