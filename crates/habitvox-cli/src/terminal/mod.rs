//! Terminal stand-ins for the microphone and the goal review screen.
//!
//! Line editing goes through a [`LineReader`] so handlers can be driven by
//! scripted input in tests.

mod confirmer;
mod recognizer;

pub use confirmer::LineEditorConfirmer;
pub use recognizer::ConsoleRecognizer;

use std::io;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Blocking line input.
pub trait LineReader: Send + Sync {
    /// Read one line, pre-filled with `initial`. `Ok(None)` means the user
    /// ended input (Ctrl-D or Ctrl-C).
    fn read_line(&self, prompt: &str, initial: &str) -> io::Result<Option<String>>;
}

/// [`LineReader`] backed by `rustyline`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustylineReader;

impl LineReader for RustylineReader {
    fn read_line(&self, prompt: &str, initial: &str) -> io::Result<Option<String>> {
        let mut editor = DefaultEditor::new().map_err(|e| io::Error::other(e.to_string()))?;
        let line = if initial.is_empty() {
            editor.readline(prompt)
        } else {
            editor.readline_with_initial(prompt, (initial, ""))
        };
        match line {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e.to_string())),
        }
    }
}
