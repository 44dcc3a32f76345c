use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::color::CategoryColors;
use crate::config::DashboardConfig;
use crate::data::aggregate::DashboardViews;
use crate::data::filter::FilterCriteria;
use crate::data::loader;
use crate::data::model::{AgeBracket, VoterTable};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which string-valued multi-select a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Race,
    Gender,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded and derived table. Cached until Reload / Open replaces it.
    pub table: Option<VoterTable>,

    pub criteria: FilterCriteria,

    /// Elections counted by the participation histogram.
    pub elections: BTreeSet<String>,

    /// Views for the current selection (cached until a control changes).
    pub views: Option<DashboardViews>,

    /// Tile colours keyed by race label.
    pub race_colors: Option<CategoryColors>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            table: None,
            criteria: FilterCriteria::default(),
            elections: BTreeSet::new(),
            views: None,
            race_colors: None,
            status_message: None,
        }
    }

    /// Fetch the configured source and install it, replacing any cached table.
    pub fn reload(&mut self) {
        log::info!("Fetching voter extract from {}", self.config.source_url);
        let result = loader::load_remote(&self.config, today());
        self.install(result);
    }

    /// Load a local extract in place of the remote one.
    pub fn open_file(&mut self, path: &Path) {
        let result = loader::load_file(path, today());
        self.install(result);
    }

    fn install(&mut self, result: Result<VoterTable>) {
        match result {
            Ok(table) => {
                if table.is_empty() {
                    log::warn!("Extract from {} has a header but no voter rows", table.source);
                } else {
                    log::info!(
                        "Loaded {} voters from {} ({} elections tracked)",
                        table.len(),
                        table.source,
                        table.elections.len()
                    );
                }
                self.set_table(table);
            }
            Err(e) => {
                // Keep whatever was loaded before; a failed load renders nothing new.
                log::error!("Failed to load voter data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table and initialise (or carry over) filters.
    pub fn set_table(&mut self, table: VoterTable) {
        let preferred = self.config.default_status.as_str();
        self.criteria = if self.table.is_some() {
            self.criteria.carried_over(&table, preferred)
        } else {
            FilterCriteria::defaults_for(&table, preferred)
        };

        // Same carry-over rule as the race/gender selections: an empty
        // selection stays empty, one emptied by vanished columns resets.
        let tracked: BTreeSet<String> = table.elections.iter().cloned().collect();
        self.elections = if self.table.is_none() {
            tracked
        } else if self.elections.is_empty() {
            BTreeSet::new()
        } else {
            let kept: BTreeSet<String> = self.elections.intersection(&tracked).cloned().collect();
            if kept.is_empty() {
                tracked
            } else {
                kept
            }
        };

        self.race_colors = Some(CategoryColors::new(&table.races));
        self.table = Some(table);
        self.status_message = None;
        self.recompute();
    }

    /// Selected elections in the table's column order.
    pub fn selected_elections(&self) -> Vec<String> {
        self.table
            .as_ref()
            .map(|t| {
                t.elections
                    .iter()
                    .filter(|e| self.elections.contains(*e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Re-run filter and aggregation over the cached table.
    pub fn recompute(&mut self) {
        let Some(table) = &self.table else {
            self.views = None;
            return;
        };
        match DashboardViews::compute(
            table,
            &self.criteria,
            &self.selected_elections(),
            &self.config.accepted_codes,
        ) {
            Ok(views) => {
                log::debug!("{} of {} voters match the filters", views.filtered, table.len());
                self.views = Some(views);
            }
            Err(e) => {
                log::error!("Aggregation failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.views = None;
            }
        }
    }

    pub fn set_status(&mut self, status: String) {
        self.criteria.status = Some(status);
        self.recompute();
    }

    fn dimension_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::Race => &mut self.criteria.races,
            Dimension::Gender => &mut self.criteria.genders,
        }
    }

    /// All values a dimension can take in the loaded table.
    pub fn dimension_values(&self, dim: Dimension) -> BTreeSet<String> {
        self.table
            .as_ref()
            .map(|t| match dim {
                Dimension::Race => t.races.clone(),
                Dimension::Gender => t.genders.clone(),
            })
            .unwrap_or_default()
    }

    pub fn toggle_value(&mut self, dim: Dimension, value: &str) {
        toggle(self.dimension_mut(dim), value.to_string());
        self.recompute();
    }

    pub fn select_all(&mut self, dim: Dimension) {
        let all = self.dimension_values(dim);
        *self.dimension_mut(dim) = all;
        self.recompute();
    }

    pub fn select_none(&mut self, dim: Dimension) {
        self.dimension_mut(dim).clear();
        self.recompute();
    }

    pub fn toggle_bracket(&mut self, bracket: AgeBracket) {
        toggle(&mut self.criteria.age_brackets, bracket);
        self.recompute();
    }

    pub fn toggle_election(&mut self, election: &str) {
        toggle(&mut self.elections, election.to_string());
        self.recompute();
    }

    /// Write the current views as pretty-printed JSON.
    pub fn export_views(&self, path: &Path) -> Result<()> {
        let views = self.views.as_ref().context("nothing to export: no data loaded")?;
        let json = serde_json::to_string_pretty(views).context("serializing views")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported summaries to {}", path.display());
        Ok(())
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRACT: &str = "\
Voter_ID,Voter_Status,Race,Gender,Party,Birth_Date,GEN_2022,GEN_2020
1,ACT,5,M,DEM,1980-05-05,Y,Y
2,ACT,3,F,REP,1960-05-05,N,A
3,INACT,4,F,DEM,1990-05-05,Y,N
";

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let table = loader::parse_table(EXTRACT.as_bytes(), "test", today).unwrap();
        state.set_table(table);
        state
    }

    #[test]
    fn set_table_initialises_defaults_and_views() {
        let state = loaded();
        assert_eq!(state.criteria.status.as_deref(), Some("ACT"));
        assert_eq!(state.selected_elections(), vec!["GEN_2022", "GEN_2020"]);
        let views = state.views.as_ref().unwrap();
        assert_eq!(views.filtered, 2);
        assert_eq!(views.histogram.rows[1].buckets, vec![0, 0, 1]);
    }

    #[test]
    fn toggles_recompute_views() {
        let mut state = loaded();
        state.toggle_value(Dimension::Gender, "F");
        assert_eq!(state.views.as_ref().unwrap().filtered, 1);

        state.select_none(Dimension::Race);
        assert_eq!(state.views.as_ref().unwrap().filtered, 0);

        state.select_all(Dimension::Race);
        state.select_all(Dimension::Gender);
        state.set_status("INACT".to_string());
        assert_eq!(state.views.as_ref().unwrap().filtered, 1);

        state.toggle_bracket(AgeBracket::From29To40);
        assert_eq!(state.views.as_ref().unwrap().filtered, 0);
    }

    #[test]
    fn election_toggle_keeps_column_order() {
        let mut state = loaded();
        state.toggle_election("GEN_2022");
        assert_eq!(state.selected_elections(), vec!["GEN_2020"]);
        state.toggle_election("GEN_2022");
        assert_eq!(state.selected_elections(), vec!["GEN_2022", "GEN_2020"]);
    }

    #[test]
    fn reinstall_carries_selection_over() {
        let mut state = loaded();
        state.toggle_election("GEN_2020");
        state.toggle_value(Dimension::Race, "White");
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let table = loader::parse_table(EXTRACT.as_bytes(), "test", today).unwrap();
        state.set_table(table);
        assert_eq!(state.selected_elections(), vec!["GEN_2022"]);
        assert!(!state.criteria.races.contains("White"));
    }

    #[test]
    fn reinstall_keeps_empty_selections_empty() {
        let mut state = loaded();
        state.toggle_election("GEN_2022");
        state.toggle_election("GEN_2020");
        state.select_none(Dimension::Gender);
        assert!(state.selected_elections().is_empty());

        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let table = loader::parse_table(EXTRACT.as_bytes(), "test", today).unwrap();
        state.set_table(table);
        assert!(state.selected_elections().is_empty());
        assert!(state.criteria.genders.is_empty());
        assert!(state.views.as_ref().unwrap().histogram.rows.is_empty());
    }

    #[test]
    fn reinstall_resets_elections_when_all_columns_vanish() {
        let mut state = loaded();
        state.toggle_election("GEN_2022");
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let renamed = EXTRACT.replace("GEN_2022,GEN_2020", "GEN_2024,PRI_2024");
        let table = loader::parse_table(renamed.as_bytes(), "test", today).unwrap();
        state.set_table(table);
        assert_eq!(state.selected_elections(), vec!["GEN_2024", "PRI_2024"]);
    }

    #[test]
    fn header_only_extract_loads_as_empty_table() {
        let mut state = AppState::new(DashboardConfig::default());
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let header_only = "Voter_ID,Voter_Status,Race,Gender,Party,Birth_Date\n";
        let table = loader::parse_table(header_only.as_bytes(), "test", today).unwrap();
        assert!(table.is_empty());
        state.set_table(table);
        assert_eq!(state.criteria.status, None);
        assert_eq!(state.views.as_ref().unwrap().filtered, 0);
    }

    #[test]
    fn failed_load_reports_and_keeps_previous_table() {
        let mut state = loaded();
        state.open_file(Path::new("/nonexistent/voters.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
        assert!(state.table.is_some());
    }

    #[test]
    fn export_without_data_fails() {
        let state = AppState::new(DashboardConfig::default());
        assert!(state.export_views(Path::new("/tmp/never-written.json")).is_err());
    }
}
