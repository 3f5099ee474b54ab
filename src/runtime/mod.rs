//! The phase pipeline: source text → tokens → AST → side-table → value.
//!
//! Language diagnostics go to standard output; internal tracing goes
//! through the `log` facade.

use std::path::Path;
use std::{error::Error, fmt::Display, fs, io};

use log::{debug, trace};

use crate::interpreter::{Interpreter, RuntimeError, Value};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::resolver::{ResolveError, Resolver};

/// Everything that can stop a source file from running to completion.
#[derive(Debug)]
pub enum ExecError {
    /// The file could not be read at all.
    Load(io::Error),
    /// Lex or parse errors; the individual diagnostics have already been
    /// written to standard output.
    Syntax { count: usize },
    Resolve(ResolveError),
    Runtime(RuntimeError),
}

impl Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::Load(error) => write!(f, "Could not read file: {error}"),
            ExecError::Syntax { count } => write!(f, "Found {count} syntax error(s)."),
            ExecError::Resolve(error) => write!(f, "{error}"),
            ExecError::Runtime(error) => write!(f, "{error}"),
        }
    }
}

impl Error for ExecError {}

impl ExecError {
    /// Process exit code for this failure: 65 for anything wrong with the
    /// source text, 70 for a runtime failure, 74 for an unreadable file.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecError::Load(_) => 74,
            ExecError::Syntax { .. } | ExecError::Resolve(_) => 65,
            ExecError::Runtime(_) => 70,
        }
    }
}

#[derive(Default)]
pub struct Runtime;

impl Runtime {
    pub fn new() -> Self {
        Self
    }

    /// Read and execute a source file.
    pub fn exec_file(&self, path: &Path) -> Result<Value, ExecError> {
        debug!("loading '{file}'", file = path.display());
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                let error = ExecError::Load(error);
                println!("{error}");
                return Err(error);
            }
        };
        self.exec(&source)
    }

    /// Execute a source string, reporting diagnostics to standard output.
    /// Returns the value of the last evaluated expression statement.
    pub fn exec(&self, source: &str) -> Result<Value, ExecError> {
        let (tokens, lex_errors) = Lexer::new(source).scan_tokens();
        debug!("lexed {count} tokens", count = tokens.len());
        for token in &tokens {
            trace!("{token:?}");
        }
        for error in &lex_errors {
            println!("{error}");
        }

        let (statements, parse_errors) = match Parser::new(tokens).parse() {
            Ok(statements) => (statements, vec![]),
            Err(errors) => (vec![], errors),
        };
        for error in &parse_errors {
            println!("{error}");
        }

        // A program with reported syntax errors is never resolved or run;
        // recovery exists so one run surfaces every diagnostic.
        let count = lex_errors.len() + parse_errors.len();
        if count > 0 {
            return Err(ExecError::Syntax { count });
        }

        for statement in &statements {
            debug!("{statement}");
        }

        let locals = match Resolver::new().resolve(&statements) {
            Ok(locals) => locals,
            Err(error) => {
                println!("{error}");
                return Err(ExecError::Resolve(error));
            }
        };
        debug!("resolved {count} local references", count = locals.len());

        let mut interpreter = Interpreter::new();
        match interpreter.interpret(&statements, locals) {
            Ok(value) => {
                debug!("program result: {value}");
                Ok(value)
            }
            Err(error) => {
                println!("{error}");
                Err(ExecError::Runtime(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_returns_last_value() {
        let runtime = Runtime::new();
        assert_eq!(
            runtime.exec("• x ← 6; x × 7;").ok(),
            Some(Value::Number(42.0))
        );
    }

    #[test]
    fn test_exec_counts_syntax_errors() {
        let runtime = Runtime::new();
        match runtime.exec("✉ ; @ ✉ ;") {
            Err(ExecError::Syntax { count }) => assert_eq!(count, 3),
            other => panic!("expected syntax errors, got {other:?}"),
        }
    }

    #[test]
    fn test_exec_file_missing_is_a_load_error() {
        let runtime = Runtime::new();
        let error = runtime
            .exec_file(Path::new("./does-not-exist.sig"))
            .unwrap_err();
        assert_eq!(error.exit_code(), 74);
    }
}
