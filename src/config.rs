use std::time::Duration;

// ---------------------------------------------------------------------------
// Fixed source location and pipeline defaults
// ---------------------------------------------------------------------------

/// Published voter extract for District 29.
pub const DEFAULT_SOURCE_URL: &str =
    "https://serendipitytech.s3.amazonaws.com/public/vote_latham_streamlit.txt";

/// Status code meaning "active"; preselected in the status filter.
pub const ACTIVE_STATUS: &str = "ACT";

/// Participation codes that count as having voted:
/// `Y` at the polls, `E` early, `A` by mail.
pub const ACCEPTED_PARTICIPATION_CODES: [&str; 3] = ["Y", "E", "A"];

/// Runtime configuration for the dashboard.
///
/// There are no CLI flags; everything comes from `Default`. Log verbosity is
/// controlled separately through `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source_url: String,
    /// Per-request timeout for the remote fetch.
    pub http_timeout: Duration,
    /// Extra attempts after a transient fetch failure.
    pub fetch_retries: u32,
    pub default_status: String,
    pub accepted_codes: Vec<String>,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            fetch_retries: 1,
            default_status: ACTIVE_STATUS.to_string(),
            accepted_codes: ACCEPTED_PARTICIPATION_CODES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            window_size: [1280.0, 860.0],
            min_window_size: [720.0, 480.0],
        }
    }
}
