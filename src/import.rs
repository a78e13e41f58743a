//! Turning an uploaded roster file into golfer rows for one bulk insert.
//!
//! The format is line-oriented `name,salary` text with an optional header
//! line. Fields are split on plain commas; there is no quoting.

use std::fmt;

use crate::models::NewGolfer;

/// A row that the strict parser refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the original text.
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Numeric coercion for form and file input: blank is `0`, anything that is
/// not a number is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Non-empty trimmed lines with their 1-based line numbers, header dropped.
fn data_lines(text: &str) -> Vec<(usize, &str)> {
    let mut lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let has_header = lines
        .first()
        .is_some_and(|(_, line)| line.to_lowercase().starts_with("name"));
    if has_header {
        lines.remove(0);
    }
    lines
}

/// Parse permissively: every data line becomes a row.
///
/// A line without a second field yields `salary: None`; a salary that is not
/// a number yields NaN. Neither is rejected here.
pub fn parse_roster(text: &str) -> Vec<NewGolfer> {
    data_lines(text)
        .into_iter()
        .map(|(_, line)| {
            let mut fields = line.split(',').map(str::trim);
            let name = fields.next().unwrap_or_default().to_string();
            let salary = fields.next().map(coerce_number);
            NewGolfer { name, salary }
        })
        .collect()
}

/// How an import treats malformed lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Admit every line, coercing what does not parse ([`parse_roster`]).
    #[default]
    Permissive,
    /// Refuse the whole file if any line is malformed ([`parse_roster_strict`]).
    Strict,
}

impl ImportPolicy {
    pub fn parse(self, text: &str) -> Result<Vec<NewGolfer>, Vec<RowError>> {
        match self {
            ImportPolicy::Permissive => Ok(parse_roster(text)),
            ImportPolicy::Strict => parse_roster_strict(text),
        }
    }
}

/// Parse strictly: fail with one [`RowError`] per malformed line.
pub fn parse_roster_strict(text: &str) -> Result<Vec<NewGolfer>, Vec<RowError>> {
    let mut golfers = Vec::new();
    let mut errors = Vec::new();

    for (line_no, line) in data_lines(text) {
        let mut fields = line.split(',').map(str::trim);
        let name = fields.next().unwrap_or_default();
        let salary = fields.next();

        let reject = |reason: String| RowError {
            line: line_no,
            reason,
        };

        if name.is_empty() {
            errors.push(reject("name is empty".to_string()));
            continue;
        }
        match salary {
            None | Some("") => errors.push(reject("salary is missing".to_string())),
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => golfers.push(NewGolfer::new(name, value)),
                _ => errors.push(reject(format!("salary {:?} is not a number", raw))),
            },
        }
    }

    if errors.is_empty() {
        Ok(golfers)
    } else {
        Err(errors)
    }
}
