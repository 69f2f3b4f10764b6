//! Console operator over rustyline

use eyre::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::approval::Operator;

/// Reads operator input with proper line editing and history
pub struct ConsoleOperator {
    editor: DefaultEditor,
}

impl ConsoleOperator {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
        Ok(Self { editor })
    }
}

impl Operator for ConsoleOperator {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.trim());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: hand back an empty line, the caller skips it
                println!("^C");
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => {
                println!();
                Ok(None)
            }
            Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
        }
    }
}
