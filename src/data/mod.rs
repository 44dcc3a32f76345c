/// Data layer: loading, derivation, filtering and aggregation.
///
/// Architecture:
/// ```text
///  remote extract / local .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → Vec<VoterRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  race label, age, age bracket → VoterTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  status / race / gender / bracket → indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  count tree, pivot, election histogram
///   └───────────┘
/// ```

pub mod aggregate;
pub mod derive;
pub mod filter;
pub mod loader;
pub mod model;
