//! Operator input abstraction used by the workflows.

use std::io::{self, BufRead, Write};

/// Line-oriented conversation with the operator
pub trait Prompter {
    /// Show `message` and read one line, without the trailing newline.
    ///
    /// # Errors
    /// Returns `UnexpectedEof` when input is exhausted.
    fn ask(&mut self, message: &str) -> io::Result<String>;

    /// Show an informational line.
    fn say(&mut self, message: &str);
}

/// [`Prompter`] over stdin and stdout
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(message.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}
