use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::model::{AgeBracket, DerivedAttributes, Voter, VoterRecord, UNKNOWN_RACE};

/// Date layouts seen in county extracts. Tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Single-field derivations
// ---------------------------------------------------------------------------

/// Map a numeric race code to its display label.
pub fn race_label(code: Option<i64>) -> &'static str {
    match code {
        Some(1 | 2 | 6 | 7 | 9) => "Other",
        Some(3) => "African American",
        Some(4) => "Hispanic",
        Some(5) => "White",
        _ => UNKNOWN_RACE,
    }
}

/// Parse a birth date, returning `None` for anything unrecognised.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

/// Whole years elapsed between `born` and `today`.
pub fn age_on(born: NaiveDate, today: NaiveDate) -> i32 {
    let birthday_pending = (today.month(), today.day()) < (born.month(), born.day());
    today.year() - born.year() - i32::from(birthday_pending)
}

// ---------------------------------------------------------------------------
// Row and table derivation
// ---------------------------------------------------------------------------

pub fn derive_attributes(record: &VoterRecord, today: NaiveDate) -> DerivedAttributes {
    let age = parse_birth_date(&record.birth_date).map(|born| age_on(born, today));
    DerivedAttributes {
        race: race_label(record.race_code).to_string(),
        age,
        age_bracket: age.map(AgeBracket::from_age),
    }
}

/// Join every record with its derived attributes. Never fails: bad birth
/// dates and unmapped races are carried through and only logged.
pub fn derive_all(records: Vec<VoterRecord>, today: NaiveDate) -> Vec<Voter> {
    let mut bad_dates = 0usize;
    let mut unknown_races = 0usize;

    let voters: Vec<Voter> = records
        .into_iter()
        .map(|record| {
            let derived = derive_attributes(&record, today);
            if derived.age.is_none() {
                log::debug!(
                    "Voter {}: unparseable birth date {:?}",
                    record.voter_id,
                    record.birth_date
                );
                bad_dates += 1;
            }
            if derived.race == UNKNOWN_RACE {
                unknown_races += 1;
            }
            Voter { record, derived }
        })
        .collect();

    if bad_dates > 0 {
        log::warn!("{bad_dates} records have no usable birth date; they match no age bracket");
    }
    if unknown_races > 0 {
        log::warn!("{unknown_races} records have an unmapped race code");
    }
    voters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(race_code: Option<i64>, birth_date: &str) -> VoterRecord {
        VoterRecord {
            voter_id: "1".to_string(),
            status: "ACT".to_string(),
            race_code,
            gender: "F".to_string(),
            party: "DEM".to_string(),
            birth_date: birth_date.to_string(),
            participation: Vec::new(),
        }
    }

    #[test]
    fn age_drops_a_year_before_birthday() {
        let today = date(2024, 6, 15);
        assert_eq!(age_on(date(1990, 6, 16), today), 33);
        assert_eq!(age_on(date(1990, 6, 15), today), 34);
        assert_eq!(age_on(date(1990, 6, 14), today), 34);
        assert_eq!(age_on(date(1990, 12, 31), today), 33);
        assert_eq!(age_on(date(1990, 1, 1), today), 34);
    }

    #[test]
    fn leap_day_birthday() {
        let born = date(2000, 2, 29);
        assert_eq!(age_on(born, date(2023, 2, 28)), 22);
        assert_eq!(age_on(born, date(2023, 3, 1)), 23);
        assert_eq!(age_on(born, date(2024, 2, 29)), 24);
    }

    #[test]
    fn bracket_boundaries_go_to_higher_bracket() {
        assert_eq!(AgeBracket::from_age(18), AgeBracket::Under29);
        assert_eq!(AgeBracket::from_age(28), AgeBracket::Under29);
        assert_eq!(AgeBracket::from_age(29), AgeBracket::From29To40);
        assert_eq!(AgeBracket::from_age(40), AgeBracket::From29To40);
        assert_eq!(AgeBracket::from_age(41), AgeBracket::From41To55);
        assert_eq!(AgeBracket::from_age(55), AgeBracket::From41To55);
        assert_eq!(AgeBracket::from_age(56), AgeBracket::From56);
        assert_eq!(AgeBracket::from_age(104), AgeBracket::From56);
    }

    #[test]
    fn every_age_has_exactly_one_bracket() {
        for age in 0..=120 {
            let hits = AgeBracket::ALL
                .iter()
                .filter(|b| **b == AgeBracket::from_age(age))
                .count();
            assert_eq!(hits, 1, "age {age}");
        }
    }

    #[test]
    fn race_lookup_and_unknown_sentinel() {
        assert_eq!(race_label(Some(3)), "African American");
        assert_eq!(race_label(Some(4)), "Hispanic");
        assert_eq!(race_label(Some(5)), "White");
        for code in [1, 2, 6, 7, 9] {
            assert_eq!(race_label(Some(code)), "Other");
        }
        assert_eq!(race_label(Some(8)), UNKNOWN_RACE);
        assert_eq!(race_label(None), UNKNOWN_RACE);
    }

    #[test]
    fn birth_date_formats() {
        assert_eq!(parse_birth_date("1980-03-07"), Some(date(1980, 3, 7)));
        assert_eq!(parse_birth_date("03/07/1980"), Some(date(1980, 3, 7)));
        assert_eq!(parse_birth_date("1980/03/07"), Some(date(1980, 3, 7)));
        assert_eq!(parse_birth_date(" 1980-03-07 00:00:00 "), Some(date(1980, 3, 7)));
        assert_eq!(parse_birth_date(""), None);
        assert_eq!(parse_birth_date("not a date"), None);
        assert_eq!(parse_birth_date("1980-02-30"), None);
    }

    #[test]
    fn bad_birth_date_keeps_row_without_bracket() {
        let voters = derive_all(
            vec![record(Some(5), "1980-03-07"), record(Some(42), "??")],
            date(2024, 6, 15),
        );
        assert_eq!(voters.len(), 2);
        assert_eq!(voters[0].derived.age, Some(44));
        assert_eq!(voters[0].derived.age_bracket, Some(AgeBracket::From41To55));
        assert_eq!(voters[0].race(), "White");
        assert_eq!(voters[1].derived.age, None);
        assert_eq!(voters[1].derived.age_bracket, None);
        assert_eq!(voters[1].race(), UNKNOWN_RACE);
    }
}
