use crate::calculator::{Calculator, Evaluation, Outcome};
use crate::config::Config;
use crate::error::SessionError;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Where session input comes from.
pub trait LineSource {
    /// Next line without its terminator, or `None` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, SessionError>;

    fn add_history(&mut self, _line: &str) -> Result<(), SessionError> {
        Ok(())
    }

    fn save_history(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}

/// Interactive terminal input with line editing and optional persisted history.
pub struct EditorSource {
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl EditorSource {
    pub fn new(history_file: Option<PathBuf>) -> Result<Self, SessionError> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &history_file {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    log::warn!("could not load history from {}: {}", path.display(), e);
                }
            }
        }
        Ok(Self { editor, history_file })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, SessionError> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => return Ok(Some(line)),
                // Ctrl-C abandons the current line only
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn add_history(&mut self, line: &str) -> Result<(), SessionError> {
        self.editor.add_history_entry(line)?;
        Ok(())
    }

    fn save_history(&mut self) -> Result<(), SessionError> {
        if let Some(path) = &self.history_file {
            self.editor.save_history(path)?;
            log::debug!("history saved to {}", path.display());
        }
        Ok(())
    }
}

/// Non-interactive input from a pipe or a script file. No prompt is shown.
pub struct ScriptSource<R> {
    reader: R,
}

impl<R: BufRead> ScriptSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl ScriptSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> LineSource for ScriptSource<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, SessionError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

/// Drives a calculator from a line source until end of input.
///
/// Results print as `< value`; evaluation errors print `Error: ...` and only
/// abandon the offending line.
pub struct Session<S, W> {
    calculator: Calculator,
    config: Config,
    source: S,
    out: W,
}

impl<S: LineSource, W: Write> Session<S, W> {
    pub fn new(config: Config, source: S, out: W) -> Self {
        Self { calculator: Calculator::new(), config, source, out }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn into_parts(self) -> (Calculator, W) {
        (self.calculator, self.out)
    }

    /// Process lines until end of input. History is saved even when the loop
    /// ends on an error; the loop's error takes priority over a failed save.
    pub fn run(&mut self) -> Result<(), SessionError> {
        let result = self.read_loop();
        let saved = self.source.save_history();
        result?;
        saved?;
        self.out.flush()?;
        Ok(())
    }

    fn read_loop(&mut self) -> Result<(), SessionError> {
        while let Some(line) = self.source.read_line(&self.config.prompt)? {
            if !line.trim().is_empty() {
                self.source.add_history(&line)?;
            }
            self.handle_line(&line)?;
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<(), SessionError> {
        match self.calculator.process_line(line) {
            Ok(Outcome::Value(evaluation)) => {
                self.write_dumps(&evaluation)?;
                writeln!(self.out, "< {}", self.config.render(&evaluation.value))?;
            }
            Ok(Outcome::Assigned { evaluation, .. }) => self.write_dumps(&evaluation)?,
            Ok(Outcome::Declared(_)) | Ok(Outcome::Empty) => {}
            Err(e) => {
                log::debug!("evaluation of '{}' failed: {:?}", line, e.kind);
                writeln!(self.out, "Error: {}", e)?;
            }
        }
        Ok(())
    }

    fn write_dumps(&mut self, evaluation: &Evaluation) -> Result<(), SessionError> {
        for dump in &evaluation.dumps {
            writeln!(self.out, "{}", dump.to_json()?)?;
        }
        Ok(())
    }
}
