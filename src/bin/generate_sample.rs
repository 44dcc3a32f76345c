use anyhow::{Context, Result};

const ELECTIONS: [&str; 5] = ["GEN_2024", "PRI_2024", "GEN_2022", "PRI_2022", "GEN_2020"];
const RACES: [(u8, u32); 9] = [
    (5, 55),
    (3, 18),
    (4, 14),
    (1, 3),
    (2, 2),
    (6, 3),
    (7, 2),
    (9, 2),
    (8, 1),
];
const PARTIES: [(&str, u32); 5] = [("DEM", 38), ("REP", 34), ("NPA", 22), ("IND", 4), ("LPF", 2)];
const GENDERS: [(&str, u32); 3] = [("F", 52), ("M", 46), ("U", 2)];
const STATUSES: [(&str, u32); 2] = [("ACT", 88), ("INA", 12)];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u32) -> u32 {
        (self.next_f64() * n as f64) as u32
    }

    /// Pick from `(value, weight)` pairs.
    fn weighted<T: Copy>(&mut self, choices: &[(T, u32)]) -> T {
        let total: u32 = choices.iter().map(|(_, w)| w).sum();
        let mut roll = self.below(total);
        for &(value, weight) in choices {
            if roll < weight {
                return value;
            }
            roll -= weight;
        }
        choices[choices.len() - 1].0
    }
}

fn birth_date(rng: &mut SimpleRng) -> String {
    // About 1 in 200 rows carries a garbled date, as real extracts do.
    if rng.below(200) == 0 {
        return "00/00/0000".to_string();
    }
    let year = 1930 + rng.below(76);
    let month = 1 + rng.below(12);
    let day = 1 + rng.below(28);
    format!("{month:02}/{day:02}/{year}")
}

fn participation(rng: &mut SimpleRng, propensity: f64) -> &'static str {
    if rng.next_f64() > propensity {
        return if rng.below(4) == 0 { "" } else { "N" };
    }
    match rng.below(10) {
        0..=4 => "Y",
        5..=7 => "E",
        8 => "A",
        _ => "B",
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(29);
    let output_path = "sample_voters.csv";
    let n_voters = 5000;

    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;

    let mut header = vec!["Voter_ID", "Voter_Status", "Race", "Gender", "Party", "Birth_Date"];
    header.extend(ELECTIONS);
    writer.write_record(&header)?;

    for i in 0..n_voters {
        let propensity = rng.next_f64();
        let mut row = vec![
            format!("{}", 100_000_000 + i),
            rng.weighted(&STATUSES).to_string(),
            rng.weighted(&RACES).to_string(),
            rng.weighted(&GENDERS).to_string(),
            rng.weighted(&PARTIES).to_string(),
            birth_date(&mut rng),
        ];
        for _ in ELECTIONS {
            row.push(participation(&mut rng, propensity).to_string());
        }
        writer.write_record(&row)?;
    }
    writer.flush().context("flushing output file")?;

    println!("Wrote {n_voters} voters ({} elections each) to {output_path}", ELECTIONS.len());
    Ok(())
}
