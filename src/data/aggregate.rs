use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use super::filter::{filtered_indices, select, FilterCriteria};
use super::model::{Voter, VoterTable};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("'{0}' is not a tracked election column")]
    UnknownElection(String),
}

type GroupKey = (String, String);

fn group_key(v: &Voter) -> GroupKey {
    (v.race().to_string(), v.gender().to_string())
}

// ---------------------------------------------------------------------------
// Count tree: race → gender → party
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountLeaf {
    pub race: String,
    pub gender: String,
    pub party: String,
    pub count: usize,
}

/// Node of the nested race/gender/party breakdown used for area layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub label: String,
    pub count: usize,
    pub children: Vec<TreeNode>,
}

/// One leaf per (race, gender, party) combination that actually occurs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountTree {
    pub leaves: Vec<CountLeaf>,
}

impl CountTree {
    pub fn build(voters: &[&Voter]) -> Self {
        let mut counts: BTreeMap<(&str, &str, &str), usize> = BTreeMap::new();
        for v in voters {
            *counts.entry((v.race(), v.gender(), v.party())).or_default() += 1;
        }
        let leaves = counts
            .into_iter()
            .map(|((race, gender, party), count)| CountLeaf {
                race: race.to_string(),
                gender: gender.to_string(),
                party: party.to_string(),
                count,
            })
            .collect();
        CountTree { leaves }
    }

    pub fn total(&self) -> usize {
        self.leaves.iter().map(|l| l.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Fold the sorted leaves into race → gender → party nodes with subtotals.
    pub fn hierarchy(&self) -> Vec<TreeNode> {
        let mut races: Vec<TreeNode> = Vec::new();
        for leaf in &self.leaves {
            if !races.last().is_some_and(|n| n.label == leaf.race) {
                races.push(TreeNode::branch(&leaf.race));
            }
            let Some(race) = races.last_mut() else { continue };
            race.count += leaf.count;

            if !race.children.last().is_some_and(|n| n.label == leaf.gender) {
                race.children.push(TreeNode::branch(&leaf.gender));
            }
            let Some(gender) = race.children.last_mut() else { continue };
            gender.count += leaf.count;
            gender.children.push(TreeNode {
                label: leaf.party.clone(),
                count: leaf.count,
                children: Vec::new(),
            });
        }
        races
    }
}

impl TreeNode {
    fn branch(label: &str) -> Self {
        TreeNode {
            label: label.to_string(),
            count: 0,
            children: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pivot table: (race, gender) × party
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub race: String,
    pub gender: String,
    /// One count per entry of [`PivotTable::parties`], zero-filled.
    pub counts: Vec<usize>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    /// Parties observed in the filtered rows, sorted.
    pub parties: Vec<String>,
    /// Sorted by (race, gender).
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn build(voters: &[&Voter]) -> Self {
        let parties: Vec<String> = voters
            .iter()
            .map(|v| v.party().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column: BTreeMap<&str, usize> = parties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_str(), i))
            .collect();

        let mut grouped: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
        for v in voters {
            let counts = grouped
                .entry(group_key(v))
                .or_insert_with(|| vec![0; parties.len()]);
            counts[column[v.party()]] += 1;
        }

        let rows = grouped
            .into_iter()
            .map(|((race, gender), counts)| PivotRow {
                race,
                gender,
                total: counts.iter().sum(),
                counts,
            })
            .collect();

        PivotTable { parties, rows }
    }

    pub fn grand_total(&self) -> usize {
        self.rows.iter().map(|r| r.total).sum()
    }
}

// ---------------------------------------------------------------------------
// Election-participation histogram: (race, gender) × elections voted
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramRow {
    pub race: String,
    pub gender: String,
    /// `buckets[k]` = voters in this group who voted in exactly `k` of the
    /// selected elections. Always `elections.len() + 1` entries.
    pub buckets: Vec<usize>,
}

impl HistogramRow {
    pub fn group_size(&self) -> usize {
        self.buckets.iter().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElectionHistogram {
    pub elections: Vec<String>,
    pub rows: Vec<HistogramRow>,
}

/// Number of the given election columns where `voter` has an accepted code.
pub fn participation_count(voter: &Voter, columns: &[usize], accepted: &[String]) -> usize {
    columns
        .iter()
        .filter(|&&c| {
            voter
                .record
                .participation
                .get(c)
                .is_some_and(|code| accepted.iter().any(|a| a == code))
        })
        .count()
}

impl ElectionHistogram {
    /// Bucket `voters` by how many of `selected` they took part in.
    ///
    /// Every name in `selected` must be one of the table's election columns.
    /// An empty selection is accepted: each group then has a single bucket 0.
    pub fn build(
        table: &VoterTable,
        voters: &[&Voter],
        selected: &[String],
        accepted: &[String],
    ) -> Result<Self, AggregateError> {
        let columns = selected
            .iter()
            .map(|name| {
                table
                    .election_index(name)
                    .ok_or_else(|| AggregateError::UnknownElection(name.clone()))
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let n_buckets = columns.len() + 1;
        let mut grouped: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
        for v in voters {
            let k = participation_count(v, &columns, accepted);
            grouped
                .entry(group_key(v))
                .or_insert_with(|| vec![0; n_buckets])[k] += 1;
        }

        let rows = grouped
            .into_iter()
            .map(|((race, gender), buckets)| HistogramRow {
                race,
                gender,
                buckets,
            })
            .collect();

        Ok(ElectionHistogram {
            elections: selected.to_vec(),
            rows,
        })
    }
}

// ---------------------------------------------------------------------------
// All three views for one filter state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardViews {
    pub filtered: usize,
    pub count_tree: CountTree,
    pub pivot: PivotTable,
    pub histogram: ElectionHistogram,
}

impl DashboardViews {
    /// Filter `table` and compute every view. Pure function of its inputs.
    pub fn compute(
        table: &VoterTable,
        criteria: &FilterCriteria,
        selected_elections: &[String],
        accepted_codes: &[String],
    ) -> Result<Self, AggregateError> {
        let indices = filtered_indices(table, criteria);
        let voters = select(table, &indices);
        Ok(DashboardViews {
            filtered: voters.len(),
            count_tree: CountTree::build(&voters),
            pivot: PivotTable::build(&voters),
            histogram: ElectionHistogram::build(table, &voters, selected_elections, accepted_codes)?,
        })
    }
}
