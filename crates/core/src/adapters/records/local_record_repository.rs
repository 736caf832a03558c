use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::records::calendar::YearMonth;
use crate::domain::records::record::Record;
use crate::domain::records::record_type::{Category, RecordType};
use crate::ports::record_repository::{RecordRepository, RecordRepositoryError};

/// In-memory store with the same contract as the spreadsheet. Nothing survives the process.
#[derive(Debug, Default)]
pub struct LocalRecordRepository {
    records: RwLock<Vec<Record>>,
    targets: RwLock<HashMap<(YearMonth, Category), i64>>,
}

impl LocalRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecordRepository for LocalRecordRepository {
    fn describe(&self) -> String {
        "local in-memory store".to_string()
    }

    async fn init(&self) -> error_stack::Result<(), RecordRepositoryError> {
        Ok(())
    }

    async fn load_all_records(&self) -> error_stack::Result<Vec<Record>, RecordRepositoryError> {
        Ok(self.records.read().await.clone())
    }

    #[instrument(skip(self))]
    async fn insert_or_update_record(
        &self,
        date: NaiveDate,
        name: &str,
        record_type: RecordType,
        count: i64,
    ) -> error_stack::Result<(), RecordRepositoryError> {
        let mut records = self.records.write().await;
        match records
            .iter_mut()
            .find(|record| record.matches(date, name, record_type))
        {
            Some(record) => {
                *record = Record::new(date, name, record_type, record.count + count);
                debug!(total = record.count, "Updated record");
            }
            None => records.push(Record::new(date, name, record_type, count)),
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_record(
        &self,
        date: NaiveDate,
        name: &str,
        record_type: RecordType,
    ) -> error_stack::Result<bool, RecordRepositoryError> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|record| record.matches(date, name, record_type));
        Ok(position.map(|index| records.remove(index)).is_some())
    }

    async fn get_target(
        &self,
        month: YearMonth,
        category: Category,
    ) -> error_stack::Result<i64, RecordRepositoryError> {
        Ok(self
            .targets
            .read()
            .await
            .get(&(month, category))
            .copied()
            .unwrap_or(0))
    }

    async fn set_target(
        &self,
        month: YearMonth,
        category: Category,
        target: i64,
    ) -> error_stack::Result<(), RecordRepositoryError> {
        self.targets.write().await.insert((month, category), target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::calendar::parse_date;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_adds_counts() {
        let repository = LocalRecordRepository::new();
        repository
            .insert_or_update_record(date("2024-05-01"), "佐藤", RecordType::New, 2)
            .await
            .unwrap();
        repository
            .insert_or_update_record(date("2024-05-01"), "佐藤", RecordType::New, 3)
            .await
            .unwrap();
        repository
            .insert_or_update_record(date("2024-05-01"), "佐藤", RecordType::Exist, 1)
            .await
            .unwrap();

        let records = repository.load_all_records().await.unwrap();
        assert_eq!(records.len(), 2, "Same key should update, not append");
        assert_eq!(records[0].count, 5);
        assert_eq!(records[0].week, 18);
        assert_eq!(records[1].record_type, RecordType::Exist);
    }

    #[tokio::test]
    async fn test_delete_first_match_only() {
        let duplicate = Record::new(date("2024-05-02"), "Ren", RecordType::Line, 1);
        let repository = LocalRecordRepository {
            records: RwLock::new(vec![
                duplicate.clone(),
                Record::new(date("2024-05-02"), "Ren", RecordType::Survey, 4),
                duplicate,
            ]),
            targets: RwLock::default(),
        };

        assert!(repository
            .delete_record(date("2024-05-02"), "Ren", RecordType::Line)
            .await
            .unwrap());
        let records = repository.load_all_records().await.unwrap();
        assert_eq!(records.len(), 2, "Only the first match should be deleted");
        assert_eq!(records[0].record_type, RecordType::Survey);

        assert!(
            !repository
                .delete_record(date("2024-05-03"), "Ren", RecordType::Line)
                .await
                .unwrap(),
            "Deleting a missing record should report false"
        );
    }

    #[tokio::test]
    async fn test_targets() {
        let repository = LocalRecordRepository::new();
        let may: YearMonth = "2024-05".parse().unwrap();
        assert_eq!(repository.get_target(may, Category::App).await.unwrap(), 0);

        repository.set_target(may, Category::App, 40).await.unwrap();
        repository.set_target(may, Category::App, 45).await.unwrap();
        assert_eq!(repository.get_target(may, Category::App).await.unwrap(), 45);
        assert_eq!(
            repository.get_target(may, Category::Survey).await.unwrap(),
            0,
            "Categories should not share a target"
        );
    }
}
