use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use thiserror::Error;

use super::derive::derive_all;
use super::model::{VoterRecord, VoterTable};
use crate::config::DashboardConfig;

/// Columns every extract must carry. All other columns are election
/// participation columns.
pub const ID_COLUMN: &str = "Voter_ID";
pub const STATUS_COLUMN: &str = "Voter_Status";
pub const RACE_COLUMN: &str = "Race";
pub const GENDER_COLUMN: &str = "Gender";
pub const PARTY_COLUMN: &str = "Party";
pub const BIRTH_DATE_COLUMN: &str = "Birth_Date";

const REQUIRED_COLUMNS: [&str; 6] = [
    ID_COLUMN,
    STATUS_COLUMN,
    RACE_COLUMN,
    GENDER_COLUMN,
    PARTY_COLUMN,
    BIRTH_DATE_COLUMN,
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("extract is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Whether another attempt at the same request could plausibly succeed.
    fn is_transient(&self) -> bool {
        match self {
            LoadError::Fetch { source, .. } => source.is_timeout() || source.is_connect(),
            LoadError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fetch the configured remote extract and derive it against `today`.
pub fn load_remote(config: &DashboardConfig, today: NaiveDate) -> Result<VoterTable> {
    let body = fetch_with_retry(config)
        .with_context(|| format!("loading voter data from {}", config.source_url))?;
    parse_table(body.as_bytes(), &config.source_url, today).context("parsing remote extract")
}

/// Load a local extract, same layout as the remote one.
pub fn load_file(path: &Path, today: NaiveDate) -> Result<VoterTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    parse_table(file, &path.display().to_string(), today)
        .with_context(|| format!("parsing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Remote fetch
// ---------------------------------------------------------------------------

fn fetch_with_retry(config: &DashboardConfig) -> Result<String, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|source| LoadError::Fetch {
            url: config.source_url.clone(),
            source,
        })?;

    let mut attempt = 0;
    loop {
        match fetch_once(&client, &config.source_url) {
            Ok(body) => return Ok(body),
            Err(e) if e.is_transient() && attempt < config.fetch_retries => {
                attempt += 1;
                log::warn!("Fetch attempt {attempt} failed ({e}); retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

fn fetch_once(client: &reqwest::blocking::Client, url: &str) -> Result<String, LoadError> {
    let fetch_err = |source| LoadError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().map_err(fetch_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(fetch_err)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Column positions resolved from the header row.
struct ColumnMap {
    id: usize,
    status: usize,
    race: usize,
    gender: usize,
    party: usize,
    birth_date: usize,
    /// (position, header) for each election column, header order.
    elections: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(LoadError::MissingColumn(name))
        };

        let elections = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !REQUIRED_COLUMNS.contains(&h.trim()))
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        Ok(ColumnMap {
            id: find(ID_COLUMN)?,
            status: find(STATUS_COLUMN)?,
            race: find(RACE_COLUMN)?,
            gender: find(GENDER_COLUMN)?,
            party: find(PARTY_COLUMN)?,
            birth_date: find(BIRTH_DATE_COLUMN)?,
            elections,
        })
    }

    fn record(&self, row: &csv::StringRecord) -> VoterRecord {
        let cell = |i: usize| row.get(i).unwrap_or("").trim().to_string();
        VoterRecord {
            voter_id: cell(self.id),
            status: cell(self.status),
            race_code: parse_race_code(row.get(self.race).unwrap_or("")),
            gender: cell(self.gender),
            party: cell(self.party),
            birth_date: cell(self.birth_date),
            participation: self.elections.iter().map(|(i, _)| cell(*i)).collect(),
        }
    }
}

/// Race codes sometimes arrive as floats (`5.0`) when the exporting tool
/// widened the column.
fn parse_race_code(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.fract() == 0.0 && f.is_finite())
        .map(|f| f as i64)
}

/// Parse an extract from any reader and derive it into a table.
pub fn parse_table<R: Read>(reader: R, source: &str, today: NaiveDate) -> Result<VoterTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnMap::from_headers(reader.headers()?)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        records.push(columns.record(&row));
    }

    let elections: Vec<String> = columns.elections.into_iter().map(|(_, name)| name).collect();
    log::info!(
        "Parsed {} voter records from {source} ({} election columns)",
        records.len(),
        elections.len()
    );

    Ok(VoterTable::from_voters(derive_all(records, today), elections, source))
}
