pub mod raw;
pub mod table;

pub use raw::{read_raw_csv, RawParse, RowPolicy};
pub use table::{read_feature_table, write_feature_table};
