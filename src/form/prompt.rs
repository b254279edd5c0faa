// src/form/prompt.rs
use anyhow::{Context, Result};
use log::debug;
use std::io::{BufRead, Write};

use crate::features::{CategoricalField, FeatureLayout, FieldValue, RawInputRecord};
use crate::form::{parse_number, FormError};

/// Asks for every form field the record does not already have.
///
/// Numeric fields default to 0 on an empty answer and categorical fields to
/// their first option. Invalid answers are re-asked.
pub struct FormPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> FormPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    pub fn collect(&mut self, layout: &FeatureLayout, record: &mut RawInputRecord) -> Result<()> {
        let numeric: Vec<String> = layout
            .numeric_columns()
            .filter(|column| !record.contains(column))
            .map(str::to_string)
            .collect();
        for column in numeric {
            let value = self.ask_number(&column)?;
            record.set(column, FieldValue::Number(value));
        }

        for field in layout.fields() {
            if record.contains(&field.name) {
                continue;
            }
            let choice = self.ask_choice(field)?;
            record.set(field.name.clone(), FieldValue::Category(choice));
        }

        debug!("Form complete with {} answers", record.len());
        Ok(())
    }

    fn read_answer(&mut self) -> Result<String> {
        self.output.flush().context("Failed to flush form output")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read form input")?;
        if read == 0 {
            return Err(FormError::InputClosed.into());
        }
        Ok(line.trim().to_string())
    }

    fn ask_number(&mut self, column: &str) -> Result<f64> {
        loop {
            write!(self.output, "Enter {} [0]: ", column)?;
            let answer = self.read_answer()?;
            if answer.is_empty() {
                return Ok(0.0);
            }
            match parse_number(column, &answer) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "  {}", e)?,
            }
        }
    }

    fn ask_choice(&mut self, field: &CategoricalField) -> Result<String> {
        writeln!(self.output, "Select {}:", field.label())?;
        for (idx, option) in field.options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", idx + 1, option)?;
        }
        loop {
            write!(self.output, "Choice [1]: ")?;
            let answer = self.read_answer()?;
            if answer.is_empty() {
                return Ok(field.options[0].clone());
            }
            if let Ok(number) = answer.parse::<usize>() {
                if (1..=field.options.len()).contains(&number) {
                    return Ok(field.options[number - 1].clone());
                }
            }
            if field.accepts(&answer) {
                return Ok(answer);
            }
            writeln!(
                self.output,
                "  {}",
                FormError::InvalidOption {
                    field: field.label(),
                    value: answer,
                    options: field.options.clone(),
                }
            )?;
        }
    }
}
