//! CLI driver (§4.13): loads a ZIL source tree, then runs a read-eval-print
//! loop over stdin, feeding each line through the Command Processor and the
//! Evaluator and draining the output buffer after every turn.

use log::{error, info};
use std::io::{self, BufRead, Write};
use zilrun::atom::Atom;
use zilrun::command_processor::{process_turn, TurnOutcome};
use zilrun::config::Config;
use zilrun::directives;
use zilrun::evaluator::Evaluator;
use zilrun::loader::Loader;
use zilrun::macros::MacroRegistry;
use zilrun::world::World;

struct Args {
    entry: Option<String>,
    json: bool,
    seed: Option<u64>,
    strict: bool,
}

fn parse_args() -> Args {
    let mut args = Args { entry: None, json: false, seed: None, strict: false };
    let mut raw = std::env::args().skip(1);
    while let Some(a) = raw.next() {
        match a.as_str() {
            "--json" => args.json = true,
            "--strict" => args.strict = true,
            "--seed" => {
                if let Some(v) = raw.next() {
                    args.seed = v.parse().ok();
                }
            }
            other => args.entry = Some(other.to_string()),
        }
    }
    args
}

fn load_world(entry: &str) -> Result<World, String> {
    let path = std::path::Path::new(entry);
    let base_dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or(entry);

    let mut loader = Loader::new(base_dir);
    let forms = loader.load(file_name)?;
    let mut registry = MacroRegistry::new();
    let expanded = registry.expand_program(forms)?;
    let mut world = World::new();
    directives::process(expanded, &mut world)?;
    directives::link_object_parents(&mut world)?;
    Ok(world)
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "quit" | "exit" | "q")
}

fn run_action(world: &mut World, strict: bool, seed: Option<u64>, action: Atom) -> String {
    let mut ev = match seed {
        Some(s) => Evaluator::with_seed(world, strict, s),
        None => Evaluator::new(world, strict),
    };
    if let Err(e) = ev.call_routine(action, Vec::new()) {
        let msg = match e {
            zilrun::evaluator::Signal::Error(m) => m,
            _ => String::new(),
        };
        if !msg.is_empty() {
            error!("{msg}");
        }
    }
    ev.output
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let mut config = Config::load().unwrap_or_else(|e| {
        error!("{e}");
        Config::default()
    });
    config.strict = config.strict || args.strict;
    config.json_mode = config.json_mode || args.json;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let Some(entry) = args.entry else {
        error!("usage: zilrun <entry.zil> [--json] [--seed N] [--strict]");
        std::process::exit(1);
    };

    let mut world = match load_world(&entry) {
        Ok(w) => w,
        Err(e) => {
            error!("load failed: {e}");
            std::process::exit(1);
        }
    };

    info!("loaded {entry}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if is_quit(&line) {
            break;
        }

        let outcome = process_turn(&mut world, &line);
        let text = match outcome {
            TurnOutcome::Success { action, .. } => run_action(&mut world, config.strict, config.seed, action),
            TurnOutcome::Unrecognized(msg) => msg,
        };

        if config.json_mode {
            let doc = serde_json::json!({ "output": text });
            let _ = writeln!(stdout, "{doc}");
        } else {
            let _ = writeln!(stdout, "{text}");
        }
        let _ = stdout.flush();
    }
}
