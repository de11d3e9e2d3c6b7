//! Task requests and prompt building
//!
//! Each subcommand produces a [`TaskRequest`]; [`TaskRequest::build_prompt`]
//! turns it into the single instruction handed to the agent. Formatting is
//! deterministic and does no interpretation of the values (dates stay as
//! typed).

use crate::core::{PilotError, Result};

/// A single task submitted by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRequest {
    /// Free-form task description
    Generic { description: String },
    /// Search a specific site
    SiteSearch { url: String, query: String },
    /// Look up flights
    FlightSearch {
        origin: String,
        destination: String,
        date: String,
        return_date: Option<String>,
    },
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PilotError::validation(format!("{} must not be empty", field)));
    }
    Ok(value)
}

impl TaskRequest {
    pub fn generic(description: impl Into<String>) -> Self {
        Self::Generic {
            description: description.into(),
        }
    }

    pub fn site_search(url: impl Into<String>, query: impl Into<String>) -> Self {
        Self::SiteSearch {
            url: url.into(),
            query: query.into(),
        }
    }

    pub fn flight_search(
        origin: impl Into<String>,
        destination: impl Into<String>,
        date: impl Into<String>,
        return_date: Option<String>,
    ) -> Self {
        Self::FlightSearch {
            origin: origin.into(),
            destination: destination.into(),
            date: date.into(),
            return_date,
        }
    }

    /// Short label for logs and notices
    pub fn kind(&self) -> &'static str {
        match self {
            TaskRequest::Generic { .. } => "task",
            TaskRequest::SiteSearch { .. } => "search",
            TaskRequest::FlightSearch { .. } => "flights",
        }
    }

    /// Build the instruction string for the agent
    ///
    /// Returns [`PilotError::Validation`] when a required field is blank.
    pub fn build_prompt(&self) -> Result<String> {
        match self {
            TaskRequest::Generic { description } => {
                Ok(required(description, "task description")?.to_string())
            }
            TaskRequest::SiteSearch { url, query } => {
                let url = required(url, "url")?;
                let query = required(query, "search query")?;
                Ok(format!("navigate to {} and search for {}", url, query))
            }
            TaskRequest::FlightSearch {
                origin,
                destination,
                date,
                return_date,
            } => {
                let origin = required(origin, "origin")?;
                let destination = required(destination, "destination")?;
                let date = required(date, "departure date")?;

                let mut prompt = format!(
                    "find flight options from {} to {} on {}",
                    origin, destination, date
                );

                // A blank return date is treated as one-way
                if let Some(ret) = return_date.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
                    prompt.push_str(&format!(", returning on {}", ret));
                }

                Ok(prompt)
            }
        }
    }
}
