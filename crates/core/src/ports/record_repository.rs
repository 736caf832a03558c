use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::records::calendar::YearMonth;
use crate::domain::records::record::Record;
use crate::domain::records::record_type::{Category, RecordType};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordRepositoryError {
    #[error("Failed to initialise the record store")]
    InitializationFailed,
    #[error("Access to the record store was denied")]
    PermissionDenied,
    #[error("Failed to authenticate against the record store")]
    Authentication,
    #[error("Failed to read records")]
    ReadFailed,
    #[error("Failed to write records")]
    WriteFailed,
}

/// Storage for staff records and monthly targets.
#[async_trait::async_trait]
pub trait RecordRepository: Send + Sync {
    /// Short description of the backing store, shown by health checks.
    fn describe(&self) -> String;

    /// Prepares the store (creates worksheets, repairs headers). Safe to call repeatedly.
    async fn init(&self) -> error_stack::Result<(), RecordRepositoryError>;

    async fn load_all_records(&self) -> error_stack::Result<Vec<Record>, RecordRepositoryError>;

    /// Adds `count` to the record keyed by `(date, name, record_type)`, creating it when absent.
    async fn insert_or_update_record(
        &self,
        date: NaiveDate,
        name: &str,
        record_type: RecordType,
        count: i64,
    ) -> error_stack::Result<(), RecordRepositoryError>;

    /// Deletes the first record keyed by `(date, name, record_type)`. Returns whether one existed.
    async fn delete_record(
        &self,
        date: NaiveDate,
        name: &str,
        record_type: RecordType,
    ) -> error_stack::Result<bool, RecordRepositoryError>;

    /// Target for the month, 0 when none is set.
    async fn get_target(
        &self,
        month: YearMonth,
        category: Category,
    ) -> error_stack::Result<i64, RecordRepositoryError>;

    async fn set_target(
        &self,
        month: YearMonth,
        category: Category,
        target: i64,
    ) -> error_stack::Result<(), RecordRepositoryError>;
}
