use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
    process, thread,
    time::Duration,
};

use circa::{
    config::WorldConfig,
    diagnostics::render_diagnostics,
    feedback,
    graph::{BranchId, printer::print_branch},
    reload::CodeUnit,
    runtime::leak_detector,
    script::{
        ScriptOutcome, load_expression, parse_expression, run_script, run_test_files,
        runner::print_test_report,
    },
    storage::{FileSystemStorage, Storage},
    world::World,
};
use tracing_subscriber::EnvFilter;

const EXIT_ERROR: i32 = 1;
const EXIT_TOOL_FAILURE: i32 = -1;

struct RunOptions {
    print: bool,
    check_only: bool,
    watch: bool,
    train: bool,
    show_state: bool,
    iterations: usize,
}

fn main() {
    let mut args: Vec<String> = env::args().collect();
    let trace = take_flag(&mut args, &["--trace"]);
    let leak_detector = take_flag(&mut args, &["--leak-detector"]);
    let options = RunOptions {
        print: take_flag(&mut args, &["-p", "--print"]),
        check_only: take_flag(&mut args, &["--check"]),
        watch: take_flag(&mut args, &["--watch"]),
        train: take_flag(&mut args, &["--train"]),
        show_state: take_flag(&mut args, &["--state"]),
        iterations: match extract_iterations(&mut args) {
            Some(value) => value,
            None => process::exit(EXIT_TOOL_FAILURE),
        },
    };
    let config_path = match extract_config_path(&mut args) {
        Some(value) => value,
        None => process::exit(EXIT_TOOL_FAILURE),
    };

    init_tracing(trace);
    let storage = FileSystemStorage::new();
    let mut config = match config_path {
        Some(path) => match WorldConfig::load(&storage, &path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {}", err);
                process::exit(EXIT_TOOL_FAILURE);
            }
        },
        None => WorldConfig::default(),
    };
    config.trace |= trace;

    let code = match args.get(1).map(String::as_str) {
        None | Some("-h" | "--help" | "help") => {
            print_help();
            0
        }
        Some("-e") => match args.get(2) {
            Some(expr) => eval_expression(expr, &config),
            None => {
                eprintln!("Usage: circa -e <json-expr>");
                EXIT_TOOL_FAILURE
            }
        },
        Some("test") => {
            let paths: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();
            if paths.is_empty() {
                eprintln!("Usage: circa test <file.json>...");
                EXIT_TOOL_FAILURE
            } else if print_test_report(&run_test_files(&paths, &config)) {
                0
            } else {
                EXIT_TOOL_FAILURE
            }
        }
        Some("run") => match args.get(2) {
            Some(path) => run_file(&storage, Path::new(path), &config, &options),
            None => {
                eprintln!("Usage: circa run <file.json>");
                EXIT_TOOL_FAILURE
            }
        },
        Some(path) => run_file(&storage, Path::new(path), &config, &options),
    };

    if leak_detector {
        print_leak_stats();
    }
    process::exit(code);
}

fn init_tracing(trace: bool) {
    let default = if trace { "circa=trace" } else { "circa=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn eval_expression(text: &str, config: &WorldConfig) -> i32 {
    let result = (|| {
        let expr = parse_expression(text)?;
        let mut world = World::with_config(config.clone())?;
        let branch = world.create_branch(None);
        let term = load_expression(&mut world, branch, &expr)?;
        let outcome = run_script(&mut world, branch)?;
        Ok::<_, circa::Error>((report_outcome(&outcome), world.types.to_string(&world.term(term).value)))
    })();
    match result {
        Ok((0, value)) => {
            println!("{}", value);
            0
        }
        Ok((code, _)) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            EXIT_ERROR
        }
    }
}

fn run_file(storage: &dyn Storage, path: &Path, config: &WorldConfig, options: &RunOptions) -> i32 {
    let mut world = match World::with_config(config.clone()) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("Error: {}", err);
            return EXIT_TOOL_FAILURE;
        }
    };
    let mut unit = match CodeUnit::load(&mut world, storage, path) {
        Ok(unit) => unit,
        Err(err) => {
            eprintln!("Error: {}", err);
            return EXIT_ERROR;
        }
    };

    if options.check_only {
        let diagnostics = circa::diagnostics::check_static_errors(&world, unit.branch);
        if diagnostics.is_empty() {
            return 0;
        }
        eprint!("{}", render_diagnostics(&diagnostics, true));
        return EXIT_ERROR;
    }

    let code = run_iterations(&mut world, unit.branch, options);
    if options.watch {
        loop {
            thread::sleep(Duration::from_millis(250));
            match unit.reload_if_changed(&mut world, storage) {
                Ok(true) => {
                    run_iterations(&mut world, unit.branch, options);
                }
                Ok(false) => {}
                Err(err) => eprintln!("Error: {}", err),
            }
        }
    }

    if let Err(err) = world.shutdown() {
        eprintln!("Error: {}", err);
        return EXIT_TOOL_FAILURE;
    }
    code
}

fn run_iterations(world: &mut World, branch: BranchId, options: &RunOptions) -> i32 {
    for _ in 0..options.iterations.max(1) {
        let outcome = if options.train {
            feedback::train(world, branch).map(ScriptOutcome::Evaluated)
        } else {
            run_script(world, branch)
        };
        let code = match outcome {
            Ok(outcome) => report_outcome(&outcome),
            Err(err) => {
                eprintln!("Error: {}", err);
                EXIT_TOOL_FAILURE
            }
        };
        if code != 0 {
            return code;
        }
    }
    if options.print {
        print!("{}", print_branch(world, branch));
    }
    if options.show_state {
        println!("{}", state_dump(world, branch));
    }
    0
}

fn report_outcome(outcome: &ScriptOutcome) -> i32 {
    match outcome {
        ScriptOutcome::Rejected(errors) => {
            eprint!("{}", render_diagnostics(errors, true));
            EXIT_ERROR
        }
        ScriptOutcome::Evaluated(stack) => match stack.failure() {
            Some(failure) => {
                eprint!("{}", failure.render(true));
                EXIT_ERROR
            }
            None => 0,
        },
    }
}

/// Hidden state of every top-level term that has some, keyed by unique name.
fn state_dump(world: &World, branch: BranchId) -> String {
    let entries: BTreeMap<String, serde_json::Value> = world
        .branch(branch)
        .terms
        .iter()
        .filter(|term| !world.term(**term).state.is_null())
        .map(|term| (world.unique_name(*term), world.term(*term).state.to_json()))
        .collect();
    serde_json::to_string_pretty(&entries).unwrap_or_default()
}

fn print_leak_stats() {
    let stats = leak_detector::snapshot();
    println!(
        "\nLeak stats (approx):\n  terms: {} live ({} created)\n  handles: {} open\n  frames pushed: {}",
        stats.live_terms(),
        stats.terms_created,
        stats.open_handles(),
        stats.frames_pushed
    );
}

fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    let present = args.iter().any(|arg| names.contains(&arg.as_str()));
    if present {
        args.retain(|arg| !names.contains(&arg.as_str()));
    }
    present
}

fn extract_iterations(args: &mut Vec<String>) -> Option<usize> {
    let mut iterations = 1;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--iterations" {
            if i + 1 >= args.len() {
                eprintln!("Usage: circa <file.json> --iterations <n>");
                return None;
            }
            let value = args.remove(i + 1);
            args.remove(i);
            match value.parse::<usize>() {
                Ok(parsed) => {
                    iterations = parsed;
                }
                Err(_) => {
                    eprintln!("Error: --iterations expects a non-negative integer.");
                    return None;
                }
            }
            continue;
        }
        i += 1;
    }
    Some(iterations)
}

fn extract_config_path(args: &mut Vec<String>) -> Option<Option<PathBuf>> {
    let mut path = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--config" {
            if i + 1 >= args.len() {
                eprintln!("Usage: circa <file.json> --config <file.json>");
                return None;
            }
            path = Some(PathBuf::from(args.remove(i + 1)));
            args.remove(i);
            continue;
        }
        i += 1;
    }
    Some(path)
}

fn print_help() {
    println!(
        "\
Circa CLI

Usage:
  circa <file.json>
  circa run <file.json>
  circa -e <json-expr>
  circa test <file.json>...

Flags:
  -p, --print        Print the branch after evaluation
  --check            Report static errors without evaluating
  --iterations <n>   Evaluate the program n times (default: 1)
  --watch            Reload and rerun the file when it changes
  --train            Apply feedback after each evaluation
  --state            Print hidden state as JSON after evaluation
  --config <file>    Load interpreter settings from a JSON file
  --trace            Log every evaluated term
  --leak-detector    Print approximate allocation stats after run
  -h, --help         Show this help message

Exit codes:
  0 success, 1 static or runtime error, -1 tool failure
"
    );
}
