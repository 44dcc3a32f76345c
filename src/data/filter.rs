use std::collections::BTreeSet;

use super::model::{AgeBracket, Voter, VoterTable};

// ---------------------------------------------------------------------------
// Filter criteria: one exact-match status plus three accepted sets
// ---------------------------------------------------------------------------

/// The user's current selection. All four predicates are ANDed; an empty
/// accepted set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    /// `None` only when the table has no statuses at all.
    pub status: Option<String>,
    pub races: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    pub age_brackets: BTreeSet<AgeBracket>,
}

impl FilterCriteria {
    /// Initial selection: the preferred status if present (else the first
    /// observed one), every race, every gender and all four brackets.
    pub fn defaults_for(table: &VoterTable, preferred_status: &str) -> Self {
        let status = if table.statuses.contains(preferred_status) {
            Some(preferred_status.to_string())
        } else {
            table.statuses.iter().next().cloned()
        };
        FilterCriteria {
            status,
            races: table.races.clone(),
            genders: table.genders.clone(),
            age_brackets: AgeBracket::ALL.into_iter().collect(),
        }
    }

    /// Carry a selection over to a freshly reloaded table: values that no
    /// longer exist are dropped, and a dimension left empty by that falls
    /// back to its default.
    pub fn carried_over(&self, table: &VoterTable, preferred_status: &str) -> Self {
        let defaults = Self::defaults_for(table, preferred_status);
        let keep = |old: &BTreeSet<String>, all: &BTreeSet<String>, default: BTreeSet<String>| {
            if old.is_empty() {
                return BTreeSet::new();
            }
            let kept: BTreeSet<String> = old.intersection(all).cloned().collect();
            if kept.is_empty() {
                default
            } else {
                kept
            }
        };

        FilterCriteria {
            status: match &self.status {
                Some(s) if table.statuses.contains(s) => Some(s.clone()),
                _ => defaults.status,
            },
            races: keep(&self.races, &table.races, defaults.races),
            genders: keep(&self.genders, &table.genders, defaults.genders),
            age_brackets: self.age_brackets.clone(),
        }
    }

    /// Whether every bracket is selected, in which case the bracket
    /// predicate is inactive and voters without a usable age still pass.
    pub fn all_brackets_selected(&self) -> bool {
        AgeBracket::ALL.iter().all(|b| self.age_brackets.contains(b))
    }

    pub fn matches(&self, voter: &Voter) -> bool {
        let status_ok = self.status.as_deref() == Some(voter.status());
        let bracket_ok = self.all_brackets_selected()
            || voter
                .derived
                .age_bracket
                .is_some_and(|b| self.age_brackets.contains(&b));

        status_ok
            && bracket_ok
            && self.races.contains(voter.race())
            && self.genders.contains(voter.gender())
    }
}

/// Indices of voters passing `criteria`, in table order.
pub fn filtered_indices(table: &VoterTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .voters
        .iter()
        .enumerate()
        .filter(|(_, v)| criteria.matches(v))
        .map(|(i, _)| i)
        .collect()
}

/// Borrow the voters behind a set of indices.
pub fn select<'a>(table: &'a VoterTable, indices: &[usize]) -> Vec<&'a Voter> {
    indices.iter().map(|&i| &table.voters[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DerivedAttributes, VoterRecord};

    fn voter(status: &str, race: &str, gender: &str, age: Option<i32>) -> Voter {
        Voter {
            record: VoterRecord {
                voter_id: String::new(),
                status: status.to_string(),
                race_code: None,
                gender: gender.to_string(),
                party: "DEM".to_string(),
                birth_date: String::new(),
                participation: Vec::new(),
            },
            derived: DerivedAttributes {
                race: race.to_string(),
                age,
                age_bracket: age.map(AgeBracket::from_age),
            },
        }
    }

    fn table() -> VoterTable {
        VoterTable::from_voters(
            vec![
                voter("ACT", "White", "M", Some(30)),
                voter("ACT", "Hispanic", "F", Some(20)),
                voter("INACT", "White", "F", Some(60)),
                voter("ACT", "White", "F", None),
                voter("ACT", "Other", "U", Some(45)),
            ],
            Vec::new(),
            "test",
        )
    }

    #[test]
    fn defaults_prefer_active_status() {
        let t = table();
        let c = FilterCriteria::defaults_for(&t, "ACT");
        assert_eq!(c.status.as_deref(), Some("ACT"));
        assert_eq!(c.races.len(), 3);
        assert_eq!(c.age_brackets.len(), 4);
        // With all four brackets selected, a voter without a usable age still passes.
        assert_eq!(filtered_indices(&t, &c), vec![0, 1, 3, 4]);

        let fallback = FilterCriteria::defaults_for(&t, "PEND");
        assert_eq!(fallback.status.as_deref(), Some("ACT"));
    }

    #[test]
    fn undefined_age_drops_out_once_brackets_are_narrowed() {
        let t = table();
        let mut c = FilterCriteria::defaults_for(&t, "ACT");
        assert!(c.all_brackets_selected());
        c.age_brackets.remove(&AgeBracket::From56);
        assert!(!c.all_brackets_selected());
        // Index 3 has no age; it belongs to no bracket and is excluded.
        assert_eq!(filtered_indices(&t, &c), vec![0, 1, 4]);
    }

    #[test]
    fn output_is_ordered_subset() {
        let t = table();
        let mut c = FilterCriteria::defaults_for(&t, "ACT");
        c.genders = ["F".to_string()].into_iter().collect();
        let idx = filtered_indices(&t, &c);
        assert_eq!(idx, vec![1, 3]);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        assert!(idx.iter().all(|&i| i < t.len()));
    }

    #[test]
    fn empty_accepted_set_matches_nothing() {
        let t = table();
        let mut c = FilterCriteria::defaults_for(&t, "ACT");
        c.age_brackets.clear();
        assert!(filtered_indices(&t, &c).is_empty());

        let mut c = FilterCriteria::defaults_for(&t, "ACT");
        c.races.clear();
        assert!(filtered_indices(&t, &c).is_empty());
    }

    #[test]
    fn disjoint_predicates_match_nothing() {
        let t = table();
        let mut c = FilterCriteria::defaults_for(&t, "ACT");
        // Only Hispanic voter is F aged 20; ask for Hispanic men.
        c.races = ["Hispanic".to_string()].into_iter().collect();
        c.genders = ["M".to_string()].into_iter().collect();
        assert!(filtered_indices(&t, &c).is_empty());
    }

    #[test]
    fn carried_over_drops_vanished_values() {
        let t = table();
        let mut c = FilterCriteria::defaults_for(&t, "ACT");
        c.status = Some("GONE".to_string());
        c.races = ["Hispanic".to_string(), "Asian".to_string()].into_iter().collect();
        c.genders = ["X".to_string()].into_iter().collect();
        c.age_brackets = [AgeBracket::From56].into_iter().collect();

        let carried = c.carried_over(&t, "ACT");
        assert_eq!(carried.status.as_deref(), Some("ACT"));
        assert_eq!(carried.races, ["Hispanic".to_string()].into_iter().collect());
        assert_eq!(carried.genders, t.genders);
        assert_eq!(carried.age_brackets, c.age_brackets);
    }
}
