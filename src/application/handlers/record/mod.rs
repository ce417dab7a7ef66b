//! Data record application handlers.
//!
//! Command and query handlers for record creation and reads.

mod create_record;
mod get_record;
mod list_records;

pub use create_record::{CreateRecordCommand, CreateRecordHandler, CreateRecordResult};
pub use get_record::{GetRecordHandler, GetRecordQuery, GetRecordResult};
pub use list_records::{ListRecordsHandler, ListRecordsQuery, ListRecordsResult};
