use std::fmt::{Display, Formatter};

/// Failure classes an evaluation can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DivisionByZero,
    ModuloByZero,
    NonIntegralExponent,
    ExponentTooLarge,
    /// Operand stack underflow, leftover operands or a token the evaluator cannot apply.
    MalformedExpression,
    EmptyExpression,
    /// Wrong number of arguments for a built-in function.
    Arity,
    /// A function rejected by `FunctionRegistry::register`.
    Registration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "Division by zero")
    }

    pub fn modulo_by_zero() -> Self {
        Self::new(ErrorKind::ModuloByZero, "Modulo by zero")
    }

    pub fn malformed<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::MalformedExpression, message)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Errors raised by the interactive session around the evaluator.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
