//! The diagnostics interface.
//!
//! Recoverable conditions (an undefined command in permissive mode, a
//! glossary reference with no entry, a malformed optional argument) do not
//! abort processing. Instead the interpreter reports them through a
//! [DiagnosticSink] and continues with a fallback behavior. Every recoverable
//! condition produces exactly one diagnostic, and the diagnostic always
//! carries the offending name or label as an argument.
//!
//! A diagnostic is not user-facing prose. It is a dotted message key, such as
//! `glossary.entry.not.defined`, plus named arguments. Rendering the key into
//! text for a human is the host's job; the default [StderrSink] prints the
//! raw key and arguments, which is good enough for batch runs and debugging.

use lexicraft_stdext::color::Colorize;
use std::cell::RefCell;
use std::rc::Rc;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single reported condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    key: String,
    args: Vec<(&'static str, String)>,
}

impl Diagnostic {
    pub fn new<T: Into<String>>(severity: Severity, key: T) -> Diagnostic {
        Diagnostic {
            severity,
            key: key.into(),
            args: vec![],
        }
    }

    pub fn warning<T: Into<String>>(key: T) -> Diagnostic {
        Diagnostic::new(Severity::Warning, key)
    }

    pub fn error<T: Into<String>>(key: T) -> Diagnostic {
        Diagnostic::new(Severity::Error, key)
    }

    /// Attach a named argument, typically the offending name or label.
    pub fn with_arg<T: Into<String>>(mut self, name: &'static str, value: T) -> Diagnostic {
        self.args.push((name, value.into()));
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The dotted message key, e.g. `glossary.entry.not.defined`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn args(&self) -> &[(&'static str, String)] {
        &self.args
    }

    /// The value of the named argument, if present.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(arg_name, _)| *arg_name == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Receiver for diagnostics.
///
/// The interpreter owns a single sink for the whole run. Hosts provide their
/// own implementation to translate message keys into user-facing text.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

/// Sink that prints raw diagnostics to standard error.
#[derive(Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        let tag = match diagnostic.severity() {
            Severity::Warning => "warning".bright_yellow().bold(),
            Severity::Error => "error".bright_red().bold(),
        };
        let mut line = format!["{tag}: {}", diagnostic.key()];
        for (name, value) in diagnostic.args() {
            line.push_str(&format![" {name}={value}"]);
        }
        eprintln!["{line}"];
    }
}

/// Sink that stores diagnostics in memory.
///
/// Cloning the sink returns a second handle to the same storage, so a test
/// can keep one handle and give the other to the interpreter.
#[derive(Default, Clone)]
pub struct CollectingSink {
    reported: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CollectingSink {
    /// All diagnostics reported so far.
    pub fn reported(&self) -> Vec<Diagnostic> {
        self.reported.borrow().clone()
    }

    /// The message keys of all diagnostics reported so far.
    pub fn keys(&self) -> Vec<String> {
        self.reported
            .borrow()
            .iter()
            .map(|d| d.key().to_string())
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.reported.borrow_mut().push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_handles_share_storage() {
        let sink = CollectingSink::default();
        let mut handle = sink.clone();
        handle.report(
            &Diagnostic::warning("glossary.entry.not.defined").with_arg("label", "svm"),
        );
        assert_eq!(sink.keys(), vec!["glossary.entry.not.defined"]);
        assert_eq!(sink.reported()[0].arg("label"), Some("svm"));
    }

    #[test]
    fn arg_lookup_by_name() {
        let diagnostic = Diagnostic::error("command.undefined")
            .with_arg("name", "glx")
            .with_arg("suggestion", "gls");
        assert_eq!(diagnostic.arg("name"), Some("glx"));
        assert_eq!(diagnostic.arg("suggestion"), Some("gls"));
        assert_eq!(diagnostic.arg("label"), None);
    }
}
