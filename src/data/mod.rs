/// Data layer: core types, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  LCA_Disclosure_Data_FY{year}_Q{q}.parquet      FIPS.csv
///        │                                          │
///        ▼                                          ▼
///   ┌──────────┐                             ┌───────────┐
///   │  loader   │  partitions → Dataset       │ reference │
///   └──────────┘                             └───────────┘
///        │                                          │
///        ▼                                          ▼
///   ┌────────────────────────────────────────────────────┐
///   │ store / cache   compute-if-absent per LoadKey       │
///   └────────────────────────────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  baseline + user criteria → Selection | NoData
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  state / employer / wage-level summaries
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod reference;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
