use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;

use xmlscout::{parse_selection, ScanError};

type Result<T> = std::result::Result<T, ScanError>;

/// Asks the user for whatever the command line left out
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn ask_seed(&mut self) -> Result<String> {
        let answer = self.ask("Enter the name of the XML file to process: ")?;
        let seed = answer.trim();
        if seed.is_empty() {
            return Err(ScanError::invalid_selection("no seed document given"));
        }
        Ok(seed.to_string())
    }

    /// Lists the fields numbered from 1 and reads the comma-separated choice
    pub fn ask_fields(&mut self, fields: &[String]) -> Result<Vec<usize>> {
        writeln!(self.output, "Searchable fields in the XML file:")?;
        for (i, field) in fields.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, field)?;
        }
        let answer =
            self.ask("Enter the numbers of the fields to search (separated by commas): ")?;
        parse_selection(answer.trim(), fields.len())
    }

    /// One value per selected field. Values are taken verbatim, spaces included.
    pub fn ask_values(&mut self, fields: &[String], selection: &[usize]) -> Result<Vec<String>> {
        selection
            .iter()
            .map(|&index| {
                self.ask(&format!(
                    "Enter the value to search for in field '{}': ",
                    fields[index]
                ))
            })
            .collect()
    }

    pub fn ask_multithreaded(&mut self) -> Result<bool> {
        let answer = self.ask("Do you want to use multithreaded processing? (y/n): ")?;
        Ok(matches!(answer.trim(), "y" | "Y"))
    }

    pub fn ask_worker_count(&mut self, available: usize) -> Result<NonZeroUsize> {
        writeln!(self.output, "Available threads: {}", available)?;
        let answer = self.ask("Enter the number of threads to use: ")?;
        answer
            .trim()
            .parse::<NonZeroUsize>()
            .map_err(|_| ScanError::config_error(format!("invalid thread count '{}'", answer.trim())))
    }

    /// Prints `question` and returns the answer line without its terminator
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}
