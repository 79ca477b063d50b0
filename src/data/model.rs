use std::collections::BTreeSet;
use std::fmt;

/// Display label for a missing prevailing-wage level.
pub const UNKNOWN_WAGE_LEVEL: &str = "Unknown";

// ---------------------------------------------------------------------------
// Column – the fixed projection read from every partition
// ---------------------------------------------------------------------------

/// Storage type a column is validated against at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Float,
}

/// The 18 columns projected from each disclosure partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    CaseStatus,
    DecisionDate,
    JobTitle,
    SocCode,
    SocTitle,
    FullTimePosition,
    EmployerName,
    EmployerCity,
    EmployerState,
    EmployerCountry,
    WorksiteCity,
    WorksiteState,
    WageRateOfPayFrom,
    WageUnitOfPay,
    PrevailingWage,
    PwUnitOfPay,
    PwWageLevel,
    H1bDependent,
}

impl Column {
    /// All columns in file order.
    pub const ALL: [Column; 18] = [
        Column::CaseStatus,
        Column::DecisionDate,
        Column::JobTitle,
        Column::SocCode,
        Column::SocTitle,
        Column::FullTimePosition,
        Column::EmployerName,
        Column::EmployerCity,
        Column::EmployerState,
        Column::EmployerCountry,
        Column::WorksiteCity,
        Column::WorksiteState,
        Column::WageRateOfPayFrom,
        Column::WageUnitOfPay,
        Column::PrevailingWage,
        Column::PwUnitOfPay,
        Column::PwWageLevel,
        Column::H1bDependent,
    ];

    /// Name of the column in the parquet files.
    pub fn name(self) -> &'static str {
        match self {
            Column::CaseStatus => "CASE_STATUS",
            Column::DecisionDate => "DECISION_DATE",
            Column::JobTitle => "JOB_TITLE",
            Column::SocCode => "SOC_CODE",
            Column::SocTitle => "SOC_TITLE",
            Column::FullTimePosition => "FULL_TIME_POSITION",
            Column::EmployerName => "EMPLOYER_NAME",
            Column::EmployerCity => "EMPLOYER_CITY",
            Column::EmployerState => "EMPLOYER_STATE",
            Column::EmployerCountry => "EMPLOYER_COUNTRY",
            Column::WorksiteCity => "WORKSITE_CITY",
            Column::WorksiteState => "WORKSITE_STATE",
            Column::WageRateOfPayFrom => "WAGE_RATE_OF_PAY_FROM",
            Column::WageUnitOfPay => "WAGE_UNIT_OF_PAY",
            Column::PrevailingWage => "PREVAILING_WAGE",
            Column::PwUnitOfPay => "PW_UNIT_OF_PAY",
            Column::PwWageLevel => "PW_WAGE_LEVEL",
            Column::H1bDependent => "H_1B_DEPENDENT",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::WageRateOfPayFrom | Column::PrevailingWage => ColumnKind::Float,
            _ => ColumnKind::Text,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Record – one disclosure case
// ---------------------------------------------------------------------------

/// A single LCA case (one row of a partition). Every cell is nullable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub case_status: Option<String>,
    pub decision_date: Option<String>,
    pub job_title: Option<String>,
    pub soc_code: Option<String>,
    pub soc_title: Option<String>,
    pub full_time_position: Option<String>,
    pub employer_name: Option<String>,
    pub employer_city: Option<String>,
    pub employer_state: Option<String>,
    pub employer_country: Option<String>,
    pub worksite_city: Option<String>,
    pub worksite_state: Option<String>,
    pub wage_rate_of_pay_from: Option<f64>,
    pub wage_unit_of_pay: Option<String>,
    pub prevailing_wage: Option<f64>,
    pub pw_unit_of_pay: Option<String>,
    pub pw_wage_level: Option<String>,
    pub h1b_dependent: Option<String>,
}

impl Record {
    /// Text cell for `column`; always `None` for float columns.
    pub fn text(&self, column: Column) -> Option<&str> {
        self.text_slot(column)?.as_deref()
    }

    /// Float cell for `column`; always `None` for text columns.
    pub fn float(&self, column: Column) -> Option<f64> {
        match column {
            Column::WageRateOfPayFrom => self.wage_rate_of_pay_from,
            Column::PrevailingWage => self.prevailing_wage,
            _ => None,
        }
    }

    pub fn set_text(&mut self, column: Column, value: Option<String>) {
        if let Some(slot) = self.text_slot_mut(column) {
            *slot = value;
        }
    }

    pub fn set_float(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::WageRateOfPayFrom => self.wage_rate_of_pay_from = value,
            Column::PrevailingWage => self.prevailing_wage = value,
            _ => {}
        }
    }

    /// Wage level with missing values mapped to [`UNKNOWN_WAGE_LEVEL`].
    pub fn wage_level_label(&self) -> &str {
        self.pw_wage_level.as_deref().unwrap_or(UNKNOWN_WAGE_LEVEL)
    }

    /// Cell formatted for the record table.
    pub fn display(&self, column: Column) -> String {
        match column {
            Column::PwWageLevel => self.wage_level_label().to_string(),
            _ => match column.kind() {
                ColumnKind::Text => self.text(column).unwrap_or_default().to_string(),
                ColumnKind::Float => self
                    .float(column)
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_default(),
            },
        }
    }

    fn text_slot(&self, column: Column) -> Option<&Option<String>> {
        Some(match column {
            Column::CaseStatus => &self.case_status,
            Column::DecisionDate => &self.decision_date,
            Column::JobTitle => &self.job_title,
            Column::SocCode => &self.soc_code,
            Column::SocTitle => &self.soc_title,
            Column::FullTimePosition => &self.full_time_position,
            Column::EmployerName => &self.employer_name,
            Column::EmployerCity => &self.employer_city,
            Column::EmployerState => &self.employer_state,
            Column::EmployerCountry => &self.employer_country,
            Column::WorksiteCity => &self.worksite_city,
            Column::WorksiteState => &self.worksite_state,
            Column::WageUnitOfPay => &self.wage_unit_of_pay,
            Column::PwUnitOfPay => &self.pw_unit_of_pay,
            Column::PwWageLevel => &self.pw_wage_level,
            Column::H1bDependent => &self.h1b_dependent,
            Column::WageRateOfPayFrom | Column::PrevailingWage => return None,
        })
    }

    fn text_slot_mut(&mut self, column: Column) -> Option<&mut Option<String>> {
        Some(match column {
            Column::CaseStatus => &mut self.case_status,
            Column::DecisionDate => &mut self.decision_date,
            Column::JobTitle => &mut self.job_title,
            Column::SocCode => &mut self.soc_code,
            Column::SocTitle => &mut self.soc_title,
            Column::FullTimePosition => &mut self.full_time_position,
            Column::EmployerName => &mut self.employer_name,
            Column::EmployerCity => &mut self.employer_city,
            Column::EmployerState => &mut self.employer_state,
            Column::EmployerCountry => &mut self.employer_country,
            Column::WorksiteCity => &mut self.worksite_city,
            Column::WorksiteState => &mut self.worksite_state,
            Column::WageUnitOfPay => &mut self.wage_unit_of_pay,
            Column::PwUnitOfPay => &mut self.pw_unit_of_pay,
            Column::PwWageLevel => &mut self.pw_wage_level,
            Column::H1bDependent => &mut self.h1b_dependent,
            Column::WageRateOfPayFrom | Column::PrevailingWage => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Partition / LoadKey – what gets read from disk
// ---------------------------------------------------------------------------

/// One (fiscal year, quarter) data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition {
    pub year: u16,
    pub quarter: u8,
}

impl Partition {
    pub fn new(year: u16, quarter: u8) -> Self {
        Self { year, quarter }
    }

    /// File name under the data directory.
    pub fn file_name(&self) -> String {
        format!(
            "LCA_Disclosure_Data_FY{}_Q{}.parquet",
            self.year, self.quarter
        )
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_Q{}", self.year, self.quarter)
    }
}

/// Load parameters. Sets make the key independent of the order (and
/// repetition) in which years and quarters were requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub years: BTreeSet<u16>,
    pub quarters: BTreeSet<u8>,
}

impl LoadKey {
    pub fn new(
        years: impl IntoIterator<Item = u16>,
        quarters: impl IntoIterator<Item = u8>,
    ) -> Self {
        Self {
            years: years.into_iter().collect(),
            quarters: quarters.into_iter().collect(),
        }
    }

    /// Every partition of the key, year-major, ascending.
    pub fn partitions(&self) -> impl Iterator<Item = Partition> + '_ {
        self.years
            .iter()
            .flat_map(|&y| self.quarters.iter().map(move |&q| Partition::new(y, q)))
    }
}

// ---------------------------------------------------------------------------
// Dataset – all successfully loaded partitions, concatenated
// ---------------------------------------------------------------------------

/// Per-partition load diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub partition: Partition,
    pub rows: usize,
    pub quarantined: usize,
}

/// The combined dataset. Row positions are dense from zero and filters refer
/// to rows by position.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Partitions that contributed rows, in load order.
    pub partitions: Vec<PartitionSummary>,
}

impl Dataset {
    /// Concatenate loaded partitions in order.
    pub fn concat(parts: Vec<(PartitionSummary, Vec<Record>)>) -> Self {
        let total = parts.iter().map(|(_, records)| records.len()).sum();
        let mut records = Vec::with_capacity(total);
        let mut partitions = Vec::with_capacity(parts.len());
        for (summary, part) in parts {
            records.extend(part);
            partitions.push(summary);
        }
        Dataset {
            records,
            partitions,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped while loading because a numeric cell did not parse.
    pub fn quarantined(&self) -> usize {
        self.partitions.iter().map(|p| p.quarantined).sum()
    }

    /// Positions of every row, for callers that start from the full dataset.
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.records.len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_key_ignores_order_and_duplicates() {
        let a = LoadKey::new([2024, 2023], [4, 1, 2, 3]);
        let b = LoadKey::new([2023, 2024, 2024], [1, 2, 3, 4]);
        assert_eq!(a, b);

        let partitions: Vec<String> = LoadKey::new([2024], [2, 1])
            .partitions()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(partitions, ["2024_Q1", "2024_Q2"]);
    }

    #[test]
    fn partition_file_name() {
        assert_eq!(
            Partition::new(2023, 4).file_name(),
            "LCA_Disclosure_Data_FY2023_Q4.parquet"
        );
    }

    #[test]
    fn cells_by_column() {
        let mut record = Record::default();
        record.set_text(Column::WorksiteState, Some("CA".into()));
        record.set_float(Column::PrevailingWage, Some(120_000.0));
        // Kind mismatches are ignored.
        record.set_text(Column::PrevailingWage, Some("x".into()));
        record.set_float(Column::JobTitle, Some(1.0));

        assert_eq!(record.text(Column::WorksiteState), Some("CA"));
        assert_eq!(record.float(Column::PrevailingWage), Some(120_000.0));
        assert_eq!(record.text(Column::PrevailingWage), None);
        assert_eq!(record.text(Column::JobTitle), None);
        assert_eq!(record.display(Column::PrevailingWage), "120000.00");
        assert_eq!(record.display(Column::PwWageLevel), UNKNOWN_WAGE_LEVEL);
        assert_eq!(record.display(Column::EmployerName), "");
    }

    #[test]
    fn concat_is_dense() {
        let part = |year, n| {
            (
                PartitionSummary {
                    partition: Partition::new(year, 1),
                    rows: n,
                    quarantined: 1,
                },
                vec![Record::default(); n],
            )
        };
        let dataset = Dataset::concat(vec![part(2023, 2), part(2024, 3)]);
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.all_rows(), vec![0, 1, 2, 3, 4]);
        assert_eq!(dataset.partitions.len(), 2);
        assert_eq!(dataset.quarantined(), 2);
    }
}
