use decicalc::repl::{EditorSource, LineSource, ScriptSource, Session};
use decicalc::{Config, Decimal, SessionError};
use std::io::{self, Cursor, Write};
use tempfile::NamedTempFile;

fn run_script(script: &str, config: Config) -> String {
    let source = ScriptSource::new(Cursor::new(script.to_string()));
    let mut session = Session::new(config, source, Vec::new());
    session.run().unwrap();
    let (_, out) = session.into_parts();
    String::from_utf8(out).unwrap()
}

#[test]
fn results_are_prefixed_and_assignments_are_silent() {
    let out = run_script("$x = 5\n$x + 1\n2 + 3 * 4\n", Config::default());
    assert_eq!(out, "< 6.0000000000\n< 14.0000000000\n");
}

#[test]
fn trimmed_output() {
    let config = Config { trim_trailing_zeros: true, ..Config::default() };
    let out = run_script("1 / 4\n10 / 2\n", config);
    assert_eq!(out, "< 0.25\n< 5\n");
}

#[test]
fn errors_abort_only_the_current_line() {
    let config = Config { trim_trailing_zeros: true, ..Config::default() };
    let out = run_script("1 / 0\n$a = 2\n$a * 3\n", config);
    assert_eq!(out, "Error: Division by zero\n< 6\n");
}

#[test]
fn blank_lines_and_declarations_print_nothing() {
    let out = run_script("\n   \n$x = 3\n$x\r\n", Config::default());
    assert_eq!(out, "");
}

#[test]
fn vars_dump_precedes_result() {
    let config = Config { trim_trailing_zeros: true, ..Config::default() };
    let out = run_script("$b = 2\n$a = 1\nvars()\n", config);
    assert_eq!(out, "{\n  \"a\": \"1.0000000000\",\n  \"b\": \"2.0000000000\"\n}\n< 0\n");
}

#[test]
fn variables_survive_for_the_whole_session() {
    let source = ScriptSource::new(Cursor::new("$n = 1\n$n = $n + 1\n$n = $n * 10\n".to_string()));
    let mut session = Session::new(Config::default(), source, Vec::new());
    session.run().unwrap();
    assert_eq!(session.calculator().variables().get("n"), Decimal::from(20));
}

#[test]
fn script_file_source() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "$price = 19.99").unwrap();
    writeln!(file, "$qty = 3").unwrap();
    writeln!(file, "$price * $qty").unwrap();
    file.flush().unwrap();

    let source = ScriptSource::open(file.path()).unwrap();
    let mut session = Session::new(Config::default(), source, Vec::new());
    session.run().unwrap();
    let (_, out) = session.into_parts();
    assert_eq!(String::from_utf8(out).unwrap(), "< 59.9700000000\n");
}

#[test]
fn missing_script_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ScriptSource::open(dir.path().join("missing.calc"));
    assert!(matches!(result, Err(SessionError::Io(_))));
}

/// Scripted source that records what the session asks of it.
struct RecordingSource {
    lines: Vec<String>,
    prompts: Vec<String>,
    history: Vec<String>,
    saved: bool,
    /// Fail instead of reporting end of input once `lines` runs out.
    fail_when_exhausted: bool,
}

impl RecordingSource {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            prompts: Vec::new(),
            history: Vec::new(),
            saved: false,
            fail_when_exhausted: false,
        }
    }
}

impl LineSource for &mut RecordingSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, SessionError> {
        self.prompts.push(prompt.to_string());
        if self.lines.is_empty() {
            if self.fail_when_exhausted {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal went away").into());
            }
            return Ok(None);
        }
        Ok(Some(self.lines.remove(0)))
    }

    fn add_history(&mut self, line: &str) -> Result<(), SessionError> {
        self.history.push(line.to_string());
        Ok(())
    }

    fn save_history(&mut self) -> Result<(), SessionError> {
        self.saved = true;
        Ok(())
    }
}

#[test]
fn history_gets_non_empty_lines_and_is_saved_at_end() {
    let mut source = RecordingSource::new(&["1 + 1", "", "$x = 2"]);
    let mut session = Session::new(Config::default(), &mut source, Vec::new());
    session.run().unwrap();
    drop(session);

    assert_eq!(source.history, vec!["1 + 1", "$x = 2"]);
    assert_eq!(source.prompts, vec!["> "; 4]);
    assert!(source.saved);
}

#[test]
fn history_is_saved_when_reading_fails() {
    let mut source = RecordingSource::new(&["2 * 3"]);
    source.fail_when_exhausted = true;
    let mut session = Session::new(Config::default(), &mut source, Vec::new());
    let result = session.run();
    let (_, out) = session.into_parts();

    assert!(matches!(result, Err(SessionError::Io(_))));
    assert_eq!(String::from_utf8(out).unwrap(), "< 6.0000000000\n");
    assert_eq!(source.history, vec!["2 * 3"]);
    assert!(source.saved);
}

#[test]
fn editor_history_round_trips_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.txt");
    std::fs::write(&path, "1 + 1\n").unwrap();

    let mut editor = EditorSource::new(Some(path.clone())).unwrap();
    editor.add_history("$rate = 0.25").unwrap();
    editor.save_history().unwrap();

    let saved = std::fs::read_to_string(&path).unwrap();
    let entries: Vec<&str> = saved.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(entries, vec!["1 + 1", "$rate = 0.25"]);
}

#[test]
fn editor_without_history_file_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor = EditorSource::new(None).unwrap();
    editor.add_history("1 + 1").unwrap();
    editor.save_history().unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
