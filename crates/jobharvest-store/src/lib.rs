pub mod atomic;
pub mod config;
pub mod csv_store;
pub mod excel_store;
pub mod json_store;
pub mod output;

pub use config::StoreConfig;
pub use csv_store::CsvStore;
pub use excel_store::ExcelStore;
pub use json_store::JsonStore;
pub use output::OutputStore;
