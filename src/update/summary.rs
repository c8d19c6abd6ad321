//! Summary of an update run

use std::fmt;

use crate::compose::service::Service;

/// One `current => latest` line of the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub service: String,
    pub current: String,
    pub latest: String,
}

impl SummaryEntry {
    fn from_service(service: &Service) -> Option<Self> {
        let latest = service.latest()?;
        Some(Self {
            service: service.name().to_string(),
            current: service.current().to_string(),
            latest: latest.to_string(),
        })
    }
}

/// Changed services and the subset that requires attention
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub changed: Vec<SummaryEntry>,
    pub warnings: Vec<SummaryEntry>,
}

impl Summary {
    pub fn from_services(services: &[Service]) -> Self {
        let changed = services
            .iter()
            .filter(|s| !s.options().ignore && s.version_has_changed())
            .filter_map(SummaryEntry::from_service)
            .collect();
        let warnings = services
            .iter()
            .filter(|s| s.needs_attention())
            .filter_map(SummaryEntry::from_service)
            .collect();

        Self { changed, warnings }
    }

    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

fn write_entries(f: &mut fmt::Formatter<'_>, entries: &[SummaryEntry]) -> fmt::Result {
    let width = entries.iter().map(|e| e.current.len()).max().unwrap_or(0);
    for entry in entries {
        writeln!(f, "  {:<width$} => {}", entry.current, entry.latest)?;
    }
    Ok(())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() {
            return writeln!(f, "No version changes");
        }

        writeln!(f, "Changed versions:")?;
        write_entries(f, &self.changed)?;

        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings (requires attention):")?;
            write_entries(f, &self.warnings)?;
        }
        Ok(())
    }
}
