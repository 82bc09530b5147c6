use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::placement::Placement;
use crate::style::NamedColor;

/// Asks the operator for batch parameters, one line per answer.
///
/// An empty answer selects the default. Every question can be answered up
/// front (from the command line); such answers go through the same
/// validation without printing the question.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn ask(&mut self, question: &str) -> std::io::Result<String> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn answer(&mut self, preset: Option<String>, question: &str) -> std::io::Result<String> {
        match preset {
            Some(answer) => Ok(answer.trim().to_string()),
            None => self.ask(question),
        }
    }

    fn notify(&mut self, message: &str) -> std::io::Result<()> {
        debug!("{}", message);
        writeln!(self.output, "{}", message)
    }

    /// Input directory; may be empty, existence is checked by the caller
    pub fn input_directory(&mut self, preset: Option<String>) -> std::io::Result<PathBuf> {
        let answer = self.answer(preset, "Enter the image directory path:")?;
        Ok(PathBuf::from(answer))
    }

    pub fn font_size(&mut self, preset: Option<String>, default: u32) -> std::io::Result<u32> {
        let question = format!("Watermark font size (default: {}):", default);
        let answer = self.answer(preset, &question)?;
        if answer.is_empty() {
            return Ok(default);
        }

        match answer.parse::<u32>() {
            Ok(size) if size > 0 => Ok(size),
            _ => {
                self.notify(&format!(
                    "Invalid font size '{}', using default {}.",
                    answer, default
                ))?;
                Ok(default)
            }
        }
    }

    pub fn color(
        &mut self,
        preset: Option<String>,
        default: NamedColor,
    ) -> std::io::Result<NamedColor> {
        let choices: Vec<&str> = NamedColor::ALL.iter().map(|c| c.name()).collect();
        let question = format!(
            "Watermark color (default: {}, options: {}):",
            default,
            choices.join(", ")
        );
        let answer = self.answer(preset, &question)?;
        if answer.is_empty() {
            return Ok(default);
        }

        match answer.parse::<NamedColor>() {
            Ok(color) => Ok(color),
            Err(e) => {
                self.notify(&format!("Invalid color ({}), using default {}.", e, default))?;
                Ok(default)
            }
        }
    }

    pub fn placement(
        &mut self,
        preset: Option<String>,
        default: Placement,
    ) -> std::io::Result<Placement> {
        let choices: Vec<&str> = Placement::ALL.iter().map(|p| p.name()).collect();
        let question = format!(
            "Watermark position (default: {}, options: {}):",
            default,
            choices.join(", ")
        );
        let answer = self.answer(preset, &question)?;
        if answer.is_empty() {
            return Ok(default);
        }

        match answer.parse::<Placement>() {
            Ok(placement) => Ok(placement),
            Err(e) => {
                self.notify(&format!(
                    "Invalid position ({}), using default {}.",
                    e, default
                ))?;
                Ok(default)
            }
        }
    }
}
