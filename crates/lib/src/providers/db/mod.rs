#[cfg(feature = "bigquery")]
pub mod bigquery;
pub mod storage;
