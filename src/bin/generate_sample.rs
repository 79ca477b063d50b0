use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use lca_dashboard::data::model::{Column, ColumnKind, Partition, Record};
use lca_dashboard::data::reference::StateRegion;

const ROWS_PER_PARTITION: usize = 2_000;

const STATES: [(&str, &str, u32); 51] = [
    ("Alabama", "AL", 1),
    ("Alaska", "AK", 2),
    ("Arizona", "AZ", 4),
    ("Arkansas", "AR", 5),
    ("California", "CA", 6),
    ("Colorado", "CO", 8),
    ("Connecticut", "CT", 9),
    ("Delaware", "DE", 10),
    ("District of Columbia", "DC", 11),
    ("Florida", "FL", 12),
    ("Georgia", "GA", 13),
    ("Hawaii", "HI", 15),
    ("Idaho", "ID", 16),
    ("Illinois", "IL", 17),
    ("Indiana", "IN", 18),
    ("Iowa", "IA", 19),
    ("Kansas", "KS", 20),
    ("Kentucky", "KY", 21),
    ("Louisiana", "LA", 22),
    ("Maine", "ME", 23),
    ("Maryland", "MD", 24),
    ("Massachusetts", "MA", 25),
    ("Michigan", "MI", 26),
    ("Minnesota", "MN", 27),
    ("Mississippi", "MS", 28),
    ("Missouri", "MO", 29),
    ("Montana", "MT", 30),
    ("Nebraska", "NE", 31),
    ("Nevada", "NV", 32),
    ("New Hampshire", "NH", 33),
    ("New Jersey", "NJ", 34),
    ("New Mexico", "NM", 35),
    ("New York", "NY", 36),
    ("North Carolina", "NC", 37),
    ("North Dakota", "ND", 38),
    ("Ohio", "OH", 39),
    ("Oklahoma", "OK", 40),
    ("Oregon", "OR", 41),
    ("Pennsylvania", "PA", 42),
    ("Rhode Island", "RI", 44),
    ("South Carolina", "SC", 45),
    ("South Dakota", "SD", 46),
    ("Tennessee", "TN", 47),
    ("Texas", "TX", 48),
    ("Utah", "UT", 49),
    ("Vermont", "VT", 50),
    ("Virginia", "VA", 51),
    ("Washington", "WA", 53),
    ("West Virginia", "WV", 54),
    ("Wisconsin", "WI", 55),
    ("Wyoming", "WY", 56),
];

/// Worksites weighted towards the usual H-1B hubs.
const WORKSITES: [(&str, &str, u32); 12] = [
    ("SAN JOSE", "CA", 9),
    ("SAN FRANCISCO", "CA", 7),
    ("SEATTLE", "WA", 8),
    ("NEW YORK", "NY", 8),
    ("AUSTIN", "TX", 5),
    ("DALLAS", "TX", 5),
    ("CHICAGO", "IL", 4),
    ("BOSTON", "MA", 4),
    ("ATLANTA", "GA", 3),
    ("RALEIGH", "NC", 2),
    ("DENVER", "CO", 2),
    ("SAN JUAN", "PR", 1),
];

const EMPLOYERS: [&str; 24] = [
    "Amazon.com Services LLC",
    "Google LLC",
    "Microsoft Corporation",
    "Meta Platforms, Inc.",
    "Apple Inc.",
    "Cognizant Technology Solutions US Corp",
    "Infosys Limited",
    "Tata Consultancy Services Limited",
    "Deloitte Consulting LLP",
    "Ernst & Young U.S. LLP",
    "Accenture LLP",
    "IBM Corporation",
    "Intel Corporation",
    "Oracle America, Inc.",
    "Salesforce, Inc.",
    "Capgemini America, Inc.",
    "Wipro Limited",
    "HCL America, Inc.",
    "JPMorgan Chase & Co.",
    "Goldman Sachs & Co. LLC",
    "Walmart Associates, Inc.",
    "Qualcomm Technologies, Inc.",
    "NVIDIA Corporation",
    "Adobe Inc.",
];

/// (job title, SOC code, SOC title, base annual wage)
const JOBS: [(&str, &str, &str, f64); 8] = [
    ("Software Engineer", "15-1252", "Software Developers", 135_000.0),
    ("Senior Software Engineer", "15-1252", "Software Developers", 165_000.0),
    ("Data Scientist", "15-2051", "Data Scientists", 140_000.0),
    ("Data Engineer", "15-1243", "Database Architects", 130_000.0),
    ("Business Analyst", "13-1111", "Management Analysts", 95_000.0),
    ("Systems Analyst", "15-1211", "Computer Systems Analysts", 100_000.0),
    ("Mechanical Engineer", "17-2141", "Mechanical Engineers", 95_000.0),
    ("Financial Analyst", "13-2051", "Financial and Investment Analysts", 105_000.0),
];

const WAGE_LEVELS: [(&str, f64); 4] = [("I", 0.75), ("II", 0.9), ("III", 1.05), ("IV", 1.25)];

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn pick_weighted<'a, T>(&mut self, items: &'a [T], weight: impl Fn(&T) -> u32) -> &'a T {
        let total: u32 = items.iter().map(&weight).sum();
        let mut roll = (self.next_u64() % u64::from(total.max(1))) as u32;
        for item in items {
            let w = weight(item);
            if roll < w {
                return item;
            }
            roll -= w;
        }
        &items[items.len() - 1]
    }
}

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

fn generate_record(rng: &mut SimpleRng, partition: Partition) -> Record {
    let (job, soc_code, soc_title, base) = *rng.pick(&JOBS);
    let (city, state, _) = *rng.pick_weighted(&WORKSITES, |w| w.2);
    let employer = *rng.pick_weighted(&EMPLOYERS, |_| 1);
    let level = if rng.chance(0.05) {
        None
    } else {
        Some(*rng.pick(&WAGE_LEVELS))
    };
    let factor = level.map_or(1.0, |(_, f)| f);
    let prevailing = (rng.gauss(base * factor, base * 0.08)).max(40_000.0).round();

    // Roughly one row in six falls outside the certified / full-time /
    // non-dependent baseline.
    let case_status = if rng.chance(0.1) {
        *rng.pick(&["Withdrawn", "Denied", "Certified - Withdrawn"])
    } else {
        "Certified"
    };
    let full_time = if rng.chance(0.03) { "N" } else { "Y" };
    let dependent = if rng.chance(0.05) { "Yes" } else { "No" };
    let month = (partition.quarter - 1) * 3 + 1 + (rng.next_u64() % 3) as u8;
    let day = 1 + rng.next_u64() % 28;

    Record {
        case_status: some(case_status),
        decision_date: Some(format!("{}-{month:02}-{day:02}", partition.year)),
        job_title: some(job),
        soc_code: some(soc_code),
        soc_title: some(soc_title),
        full_time_position: some(full_time),
        employer_name: some(employer),
        employer_city: some(city),
        employer_state: some(state),
        employer_country: some("UNITED STATES OF AMERICA"),
        worksite_city: some(city),
        worksite_state: some(state),
        wage_rate_of_pay_from: Some((prevailing * rng.gauss(1.1, 0.05)).round()),
        wage_unit_of_pay: some("Year"),
        prevailing_wage: Some(prevailing),
        pw_unit_of_pay: some("Year"),
        pw_wage_level: level.map(|(l, _)| l.to_string()),
        h1b_dependent: some(dependent),
    }
}

fn write_partition(dir: &Path, partition: Partition, records: &[Record]) -> Result<()> {
    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();
    for column in Column::ALL {
        match column.kind() {
            ColumnKind::Text => {
                fields.push(Field::new(column.name(), DataType::Utf8, true));
                let values: Vec<Option<&str>> = records.iter().map(|r| r.text(column)).collect();
                arrays.push(Arc::new(StringArray::from(values)));
            }
            ColumnKind::Float => {
                fields.push(Field::new(column.name(), DataType::Float64, true));
                let values: Vec<Option<f64>> = records.iter().map(|r| r.float(column)).collect();
                arrays.push(Arc::new(Float64Array::from(values)));
            }
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let path = dir.join(partition.file_name());
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_reference(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for (name, abbreviation, id) in STATES {
        writer.serialize(StateRegion {
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            id,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let dir = Path::new("data");
    std::fs::create_dir_all(dir).context("creating data directory")?;

    let mut total = 0;
    for year in 2022..=2024 {
        for quarter in 1..=4 {
            let partition = Partition::new(year, quarter);
            let records: Vec<Record> = (0..ROWS_PER_PARTITION)
                .map(|_| generate_record(&mut rng, partition))
                .collect();
            write_partition(dir, partition, &records)?;
            total += records.len();
        }
    }

    let reference = dir.join("FIPS.csv");
    write_reference(&reference)?;

    println!(
        "Wrote {total} cases across 12 partitions and {} states to {}",
        STATES.len(),
        dir.display()
    );
    Ok(())
}
