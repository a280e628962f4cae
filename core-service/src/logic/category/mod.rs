//! Category Module - Pollutant banding
//!
//! Structure:
//! - `types.rs` - Category and CategoryRange
//! - `table.rs` - Range table, validation and the `categorize` lookup

pub mod types;
pub mod table;

pub use types::{Category, CategoryRange};
pub use table::{PollutantCategoryTable, ReadingCategories, TableError};
