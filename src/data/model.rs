use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Label given to race codes missing from the lookup table.
pub const UNKNOWN_RACE: &str = "Unknown";

// ---------------------------------------------------------------------------
// AgeBracket – the four fixed age ranges
// ---------------------------------------------------------------------------

/// Half-open age ranges used for filtering. Every defined age maps to exactly
/// one bracket; thresholds 29, 41 and 56 belong to the higher bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeBracket {
    #[serde(rename = "18-28")]
    Under29,
    #[serde(rename = "29-40")]
    From29To40,
    #[serde(rename = "41-55")]
    From41To55,
    #[serde(rename = "56+")]
    From56,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::Under29,
        AgeBracket::From29To40,
        AgeBracket::From41To55,
        AgeBracket::From56,
    ];

    /// Bracket for an age in whole years. Ages under 18 only occur with bad
    /// source data and land in the lowest bracket.
    pub fn from_age(age: i32) -> Self {
        if age < 29 {
            AgeBracket::Under29
        } else if age < 41 {
            AgeBracket::From29To40
        } else if age < 56 {
            AgeBracket::From41To55
        } else {
            AgeBracket::From56
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::Under29 => "18-28",
            AgeBracket::From29To40 => "29-40",
            AgeBracket::From41To55 => "41-55",
            AgeBracket::From56 => "56+",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// VoterRecord – one raw row of the extract
// ---------------------------------------------------------------------------

/// A single row as read from the source file, before derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterRecord {
    pub voter_id: String,
    pub status: String,
    /// `None` when the race column is empty or not an integer.
    pub race_code: Option<i64>,
    pub gender: String,
    pub party: String,
    /// Birth date exactly as it appeared in the file.
    pub birth_date: String,
    /// One participation code per tracked election, in the table's
    /// election column order. Empty string when the voter has no entry.
    pub participation: Vec<String>,
}

// ---------------------------------------------------------------------------
// Voter – a record joined with its derived attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAttributes {
    pub race: String,
    /// `None` when the birth date could not be parsed.
    pub age: Option<i32>,
    /// `None` exactly when `age` is `None`.
    pub age_bracket: Option<AgeBracket>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voter {
    pub record: VoterRecord,
    pub derived: DerivedAttributes,
}

impl Voter {
    pub fn race(&self) -> &str {
        &self.derived.race
    }

    pub fn gender(&self) -> &str {
        &self.record.gender
    }

    pub fn party(&self) -> &str {
        &self.record.party
    }

    pub fn status(&self) -> &str {
        &self.record.status
    }
}

// ---------------------------------------------------------------------------
// VoterTable – the complete derived dataset
// ---------------------------------------------------------------------------

/// The loaded, derived and immutable table every view is computed from.
#[derive(Debug, Clone)]
pub struct VoterTable {
    pub voters: Vec<Voter>,
    /// Tracked election columns, in source header order.
    pub elections: Vec<String>,
    /// Where the table came from (URL or path), for the status line.
    pub source: String,
    pub statuses: BTreeSet<String>,
    pub races: BTreeSet<String>,
    pub genders: BTreeSet<String>,
}

impl VoterTable {
    /// Build the unique-value indices used to populate the filter controls.
    pub fn from_voters(voters: Vec<Voter>, elections: Vec<String>, source: impl Into<String>) -> Self {
        let mut statuses = BTreeSet::new();
        let mut races = BTreeSet::new();
        let mut genders = BTreeSet::new();

        for v in &voters {
            statuses.insert(v.status().to_string());
            races.insert(v.race().to_string());
            genders.insert(v.gender().to_string());
        }

        VoterTable {
            voters,
            elections,
            source: source.into(),
            statuses,
            races,
            genders,
        }
    }

    /// Index of a tracked election column by name.
    pub fn election_index(&self, name: &str) -> Option<usize> {
        self.elections.iter().position(|e| e == name)
    }

    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }
}
