// Memoization of assembled reports for the current selection.
//
// Reports are pure functions of (dataset, registry, options, selection), so
// the cache only has to drop entries when the selection changes.

use std::collections::HashMap;
use tracing::debug;

use crate::report::{AthleteReport, GroupReport, ReportBuilder, ReportError};

/// The athlete currently selected in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub category: String,
    pub athlete: String,
}

impl SelectionKey {
    pub fn new(category: &str, athlete: &str) -> Self {
        SelectionKey {
            category: category.to_string(),
            athlete: athlete.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReportCache {
    key: Option<SelectionKey>,
    athlete: HashMap<String, Result<AthleteReport, ReportError>>,
    group: HashMap<(String, String), Result<GroupReport, ReportError>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&SelectionKey> {
        self.key.as_ref()
    }

    /// Switch to `key`. Returns true when the selection changed, in which
    /// case every memoized athlete report is dropped.
    pub fn select(&mut self, key: SelectionKey) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        debug!("selection changed to {}/{}", key.category, key.athlete);
        self.athlete.clear();
        self.key = Some(key);
        true
    }

    /// Athlete report for the selected athlete and `section`, assembled on
    /// first use. Errors are memoized too.
    pub fn athlete_report(
        &mut self,
        builder: &ReportBuilder<'_>,
        section: &str,
    ) -> Option<Result<&AthleteReport, ReportError>> {
        let key = self.key.as_ref()?;
        let entry = self
            .athlete
            .entry(section.to_string())
            .or_insert_with(|| builder.athlete_report(&key.category, &key.athlete, section));
        Some(entry.as_ref().map_err(Clone::clone))
    }

    pub fn group_report(
        &mut self,
        builder: &ReportBuilder<'_>,
        category: &str,
        section: &str,
    ) -> Result<&GroupReport, ReportError> {
        self.group
            .entry((category.to_string(), section.to_string()))
            .or_insert_with(|| builder.group_report(category, section))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Forget everything, including the selection.
    pub fn clear(&mut self) {
        self.key = None;
        self.athlete.clear();
        self.group.clear();
    }

    pub fn len(&self) -> usize {
        self.athlete.len() + self.group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
