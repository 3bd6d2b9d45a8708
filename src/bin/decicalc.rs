use clap::Parser;
use decicalc::config::HISTORY_ENV;
use decicalc::repl::{EditorSource, LineSource, ScriptSource, Session};
use decicalc::{Calculator, Config, Decimal, SessionError};
use serde_json::json;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Instant;

/// decicalc is an arbitrary-precision decimal calculator with `$variables`
/// and the built-in functions ceil, floor, abs, max, min and vars.
///
/// With no EXPRESSION it starts an interactive session (or reads lines from
/// stdin when it is not a terminal).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Read input lines from a script file instead of the terminal.
    #[arg(short, long, value_name = "PATH", conflicts_with = "expression")]
    file: Option<PathBuf>,

    /// Print one-shot results as JSON with type and timing.
    #[arg(long)]
    output_json: bool,

    /// Drop trailing fractional zeros from results.
    #[arg(short, long)]
    trim: bool,

    /// History file for interactive sessions.
    #[arg(long, value_name = "PATH", env = HISTORY_ENV)]
    history: Option<PathBuf>,

    /// Trace tokens, postfix sequences and function calls on stderr.
    #[arg(short, long)]
    debug: bool,

    /// Expression to evaluate once; words are joined with spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    expression: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let config = Config {
        trim_trailing_zeros: args.trim,
        history_file: args.history.clone(),
        debug: args.debug,
        ..Config::default()
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .format_timestamp(None)
        .init();

    if !args.expression.is_empty() {
        let expression = args.expression.join(" ");
        std::process::exit(run_once(&expression, &config, args.output_json));
    }

    let result = match &args.file {
        Some(path) => ScriptSource::open(path).and_then(|source| run_session(config, source)),
        None if io::stdin().is_terminal() => {
            EditorSource::new(config.history_file.clone()).and_then(|source| run_session(config, source))
        }
        None => run_session(config, ScriptSource::new(io::stdin().lock())),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_session<S: LineSource>(config: Config, source: S) -> Result<(), SessionError> {
    let mut session = Session::new(config, source, io::stdout().lock());
    session.run()
}

fn run_once(expression: &str, config: &Config, output_json: bool) -> i32 {
    let calculator = Calculator::new();
    let start_time = Instant::now();
    let result = calculator.evaluate(expression);
    let execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(evaluation) => {
            for dump in &evaluation.dumps {
                match dump.to_json() {
                    Ok(text) => println!("{}", text),
                    Err(e) => log::warn!("could not render variables: {}", e),
                }
            }
            if output_json {
                println!("{}", format_json_output(&evaluation.value, config, execution_time_ms));
            } else {
                println!("< {}", config.render(&evaluation.value));
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    }
}

fn format_json_output(value: &Decimal, config: &Config, execution_time_ms: f64) -> String {
    let output = json!({
        "result": config.render(value),
        "type": "Decimal",
        "execution_time": format!("{:.2} ms", execution_time_ms)
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
