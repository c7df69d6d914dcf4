// Declarative screen output
//
// Screens produce these values; a host decides how to draw them. Display
// renders them as plain text for the terminal host.

use crate::models::{Country, CountryCode, LoadError};
use std::fmt;

/// One rendered frame of the countries list.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub title: String,
    pub content: Content,
    /// Detail screen pushed through routing state
    pub pushed: Option<CountryDetailsView>,
    /// Detail screen presented as a local modal
    pub modal: Option<CountryDetailsView>,
}

impl Screen {
    /// True once the list has reached a terminal state (loaded or failed).
    pub fn is_settled(&self) -> bool {
        matches!(self.content, Content::List(_) | Content::Error { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Nothing requested yet
    Placeholder,
    /// Progress indicator, with the stale list underneath during a refresh
    Loading { stale: Option<Vec<CountryRow>> },
    List(Vec<CountryRow>),
    /// Error view; the host offers a retry action
    Error { message: String, code: &'static str },
}

impl Content {
    pub fn error(error: &LoadError) -> Self {
        Self::Error {
            message: error.to_string(),
            code: error.code(),
        }
    }

    pub fn rows(&self) -> &[CountryRow] {
        match self {
            Self::List(rows) => rows,
            Self::Loading { stale: Some(rows) } => rows,
            _ => &[],
        }
    }
}

/// One cell in the country list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRow {
    pub code: CountryCode,
    pub name: String,
    pub population: String,
    pub selected: bool,
}

impl CountryRow {
    pub fn new(country: &Country, selected: Option<&CountryCode>) -> Self {
        Self {
            code: country.code().clone(),
            name: country.name.clone(),
            population: country.formatted_population(),
            selected: selected == Some(country.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryDetailsView {
    pub name: String,
    pub code: CountryCode,
    pub population: String,
    pub flag: Option<String>,
    pub flag_sheet: bool,
}

impl fmt::Display for CountryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.selected { '>' } else { ' ' };
        write!(f, "{marker} {} ({})  pop. {}", self.name, self.code, self.population)
    }
}

impl fmt::Display for CountryDetailsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ---", self.name)?;
        writeln!(f, "Code: {}", self.code)?;
        writeln!(f, "Population: {}", self.population)?;
        match &self.flag {
            Some(flag) if self.flag_sheet => write!(f, "Flag (full size): {flag}"),
            Some(flag) => write!(f, "Flag: {flag}"),
            None => write!(f, "Flag: n/a"),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        match &self.content {
            Content::Placeholder => writeln!(f)?,
            Content::Loading { stale } => {
                writeln!(f, "[loading...]")?;
                for row in stale.iter().flatten() {
                    writeln!(f, "{row}")?;
                }
            }
            Content::List(rows) => {
                if rows.is_empty() {
                    writeln!(f, "(no countries)")?;
                }
                for row in rows {
                    writeln!(f, "{row}")?;
                }
            }
            Content::Error { message, code } => {
                writeln!(f, "An error occurred: {message} [{code}]")?;
                writeln!(f, "[Retry]")?;
            }
        }
        if let Some(pushed) = &self.pushed {
            writeln!(f, "{pushed}")?;
        }
        if let Some(modal) = &self.modal {
            writeln!(f, "(modal)")?;
            writeln!(f, "{modal}")?;
        }
        Ok(())
    }
}
