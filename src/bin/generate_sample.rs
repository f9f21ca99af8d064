use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const CSV_PATH: &str = "university_student_data.csv";
const PARQUET_PATH: &str = "university_student_data.parquet";

const TERMS: [&str; 2] = ["Spring", "Fall"];
const DEPARTMENTS: [&str; 4] = ["Engineering", "Business", "Arts", "Science"];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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
}

/// One synthetic term of admissions data.
struct TermRecord {
    year: i64,
    term: &'static str,
    applications: i64,
    admitted: i64,
    enrolled: i64,
    retention: f64,
    satisfaction: f64,
    departments: [i64; 4],
}

fn generate(rng: &mut SimpleRng) -> Vec<TermRecord> {
    let mut records = Vec::new();
    for (offset, year) in (2015..=2024).enumerate() {
        let trend = offset as f64;
        for term in TERMS {
            // Spring intakes are smaller.
            let scale = if term == "Spring" { 0.8 } else { 1.0 };
            let applications = (rng.gauss(2500.0 + 60.0 * trend, 120.0) * scale).round() as i64;
            let admitted = (applications as f64 * rng.gauss(0.6, 0.03)).round() as i64;
            let enrolled = (admitted as f64 * rng.gauss(0.55, 0.04)).round() as i64;

            let retention = (rng.gauss(84.0 + 0.4 * trend, 2.5)).clamp(60.0, 99.0).round();
            let satisfaction = (rng.gauss(80.0 + 0.3 * trend, 3.0)).clamp(55.0, 99.0).round();

            let shares = [0.35, 0.3, 0.15, 0.2];
            let mut departments = [0i64; 4];
            let mut assigned = 0;
            for (i, share) in shares.iter().enumerate().take(3) {
                let n = (enrolled as f64 * rng.gauss(*share, 0.02)).round().max(0.0) as i64;
                departments[i] = n.min(enrolled - assigned);
                assigned += departments[i];
            }
            departments[3] = enrolled - assigned;

            records.push(TermRecord {
                year,
                term,
                applications,
                admitted,
                enrolled,
                retention,
                satisfaction,
                departments,
            });
        }
    }
    records
}

/// Raw headers, as exported by the registrar before normalization.
fn headers() -> Vec<String> {
    let mut h: Vec<String> = [
        "Year",
        "Term",
        "Applications",
        "Admitted",
        "Enrolled",
        "Retention Rate (%)",
        "Student Satisfaction (%)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    h.extend(DEPARTMENTS.iter().map(|d| format!("{d} Enrolled")));
    h
}

fn write_csv(records: &[TermRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH)
        .with_context(|| format!("failed to create {CSV_PATH}"))?;
    writer.write_record(headers())?;
    for r in records {
        let mut row = vec![
            r.year.to_string(),
            r.term.to_string(),
            r.applications.to_string(),
            r.admitted.to_string(),
            r.enrolled.to_string(),
            format!("{:.1}", r.retention),
            format!("{:.1}", r.satisfaction),
        ];
        row.extend(r.departments.iter().map(|d| d.to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(records: &[TermRecord]) -> Result<RecordBatch> {
    let names = headers();
    let mut fields = vec![
        Field::new(&names[0], DataType::Int64, false),
        Field::new(&names[1], DataType::Utf8, false),
        Field::new(&names[2], DataType::Int64, false),
        Field::new(&names[3], DataType::Int64, false),
        Field::new(&names[4], DataType::Int64, false),
        Field::new(&names[5], DataType::Float64, false),
        Field::new(&names[6], DataType::Float64, false),
    ];
    fields.extend(names[7..].iter().map(|n| Field::new(n, DataType::Int64, false)));
    let schema = Arc::new(Schema::new(fields));

    let ints = |f: fn(&TermRecord) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(records.iter().map(f).collect::<Vec<_>>()))
    };
    let floats = |f: fn(&TermRecord) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
    };

    let mut columns: Vec<ArrayRef> = vec![
        ints(|r| r.year),
        Arc::new(StringArray::from(records.iter().map(|r| r.term).collect::<Vec<_>>())),
        ints(|r| r.applications),
        ints(|r| r.admitted),
        ints(|r| r.enrolled),
        floats(|r| r.retention),
        floats(|r| r.satisfaction),
    ];
    for i in 0..DEPARTMENTS.len() {
        let values: Vec<i64> = records.iter().map(|r| r.departments[i]).collect();
        columns.push(Arc::new(Int64Array::from(values)));
    }

    RecordBatch::try_new(schema, columns).context("failed to build record batch")
}

fn write_parquet(batch: &RecordBatch) -> Result<()> {
    let file = File::create(PARQUET_PATH)
        .with_context(|| format!("failed to create {PARQUET_PATH}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng);

    write_csv(&records)?;
    let batch = to_batch(&records)?;
    write_parquet(&batch)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 4)])?);
    println!(
        "Wrote {} terms ({} columns) to {CSV_PATH} and {PARQUET_PATH}",
        records.len(),
        batch.num_columns()
    );
    Ok(())
}
