//! Prompted line input and typed parsing for the menu.
//!
//! # Invariants
//! - Blank input (or end of input) reads as `None`; callers decide whether a
//!   value is required.
//! - Decimals leave here already rescaled to the store's two places.

use projects_core::{to_fixed_scale, DECIMAL_SCALE};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

pub type InputResult<T> = Result<T, InputError>;

#[derive(Debug)]
pub enum InputError {
    Io(io::Error),
    InvalidNumber(String),
    InvalidDecimal(String),
    Required(&'static str),
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "console I/O failed: {err}"),
            Self::InvalidNumber(value) => write!(f, "{value} is not a valid number."),
            Self::InvalidDecimal(value) => write!(f, "{value} is not a valid decimal number."),
            Self::Required(field) => write!(f, "a value for {field} is required."),
        }
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for InputError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

pub fn parse_number<T: FromStr>(value: &str) -> InputResult<T> {
    value
        .parse::<T>()
        .map_err(|_| InputError::InvalidNumber(value.to_string()))
}

/// Parses and rescales a decimal. Values too large to carry two places are
/// rejected.
pub fn parse_decimal(value: &str) -> InputResult<Decimal> {
    Decimal::from_str(value)
        .map(to_fixed_scale)
        .ok()
        .filter(|parsed| parsed.scale() == DECIMAL_SCALE)
        .ok_or_else(|| InputError::InvalidDecimal(value.to_string()))
}

/// Writes prompts to `output` and reads one trimmed line per prompt from
/// `input`.
pub struct Prompter<In, Out> {
    input: In,
    output: Out,
}

impl<In: BufRead, Out: Write> Prompter<In, Out> {
    pub fn new(input: In, output: Out) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut Out {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> Out {
        self.output
    }

    pub fn read_string(&mut self, prompt: &str) -> InputResult<Option<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    pub fn read_number<T: FromStr>(&mut self, prompt: &str) -> InputResult<Option<T>> {
        self.read_string(prompt)?
            .map(|value| parse_number(&value))
            .transpose()
    }

    pub fn read_decimal(&mut self, prompt: &str) -> InputResult<Option<Decimal>> {
        self.read_string(prompt)?
            .map(|value| parse_decimal(&value))
            .transpose()
    }
}

/// Turns a missing answer into [`InputError::Required`].
pub fn required<T>(value: Option<T>, field: &'static str) -> InputResult<T> {
    value.ok_or(InputError::Required(field))
}

#[cfg(test)]
mod tests {
    use super::{parse_decimal, parse_number, InputError, Prompter};
    use std::io::Cursor;

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number::<i32>("3").unwrap(), 3);
        let err = parse_number::<i32>("three").unwrap_err();
        assert!(matches!(err, InputError::InvalidNumber(ref v) if v == "three"));
        assert_eq!(err.to_string(), "three is not a valid number.");
    }

    #[test]
    fn parse_decimal_rescales_to_two_places() {
        assert_eq!(parse_decimal("10").unwrap().to_string(), "10.00");
        assert_eq!(parse_decimal("1.239").unwrap().to_string(), "1.24");
        assert!(matches!(
            parse_decimal("1,5"),
            Err(InputError::InvalidDecimal(_))
        ));
    }

    #[test]
    fn parse_decimal_rejects_values_without_room_for_two_places() {
        let too_large = "79228162514264337593543950335";
        let err = parse_decimal(too_large).unwrap_err();
        assert!(matches!(err, InputError::InvalidDecimal(ref v) if v == too_large));
        assert_eq!(
            parse_decimal("1000000000000000000000000").unwrap().to_string(),
            "1000000000000000000000000.00"
        );
    }

    #[test]
    fn prompter_trims_and_maps_blank_and_eof_to_none() {
        let mut prompter = Prompter::new(Cursor::new("  Build shed \n   \n"), Vec::new());

        assert_eq!(
            prompter.read_string("Name").unwrap().as_deref(),
            Some("Build shed")
        );
        assert_eq!(prompter.read_string("Notes").unwrap(), None);
        assert_eq!(prompter.read_string("After end").unwrap(), None);

        let output = String::from_utf8(prompter.into_output()).unwrap();
        assert_eq!(output, "Name: Notes: After end: ");
    }

    #[test]
    fn prompter_reads_typed_values() {
        let mut prompter = Prompter::new(Cursor::new("4\n2.5\nx\n"), Vec::new());

        assert_eq!(prompter.read_number::<i64>("Id").unwrap(), Some(4));
        assert_eq!(
            prompter.read_decimal("Hours").unwrap().map(|d| d.to_string()),
            Some("2.50".to_string())
        );
        assert!(prompter.read_number::<i32>("Difficulty").is_err());
    }
}
