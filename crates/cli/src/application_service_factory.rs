use staff_stats_core::{
    adapters::{
        config::app_config::AppConfig,
        records::{
            local_record_repository::LocalRecordRepository,
            spreadsheet_record_repository::SpreadsheetRecordRepository,
        },
        sheets::spreadsheet_manager::SpreadsheetManager,
    },
    application::service::StaffStatsApplicationService,
    ports::{application_service::ApplicationService, record_repository::RecordRepository},
};

use std::sync::Arc;
use tracing::{info, instrument};

/// Where records live for this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Spreadsheet,
    /// In-memory store, chosen explicitly with `--local`.
    Local,
}

pub struct ApplicationServiceFactory;

impl ApplicationServiceFactory {
    #[instrument]
    pub async fn create(
        mode: StoreMode,
        secrets_path: &str,
    ) -> Result<Arc<dyn ApplicationService>, Box<dyn std::error::Error>> {
        let repository = Self::create_repository(mode, secrets_path).await?;
        info!(store = %repository.describe(), "Record store selected");

        let app_service = StaffStatsApplicationService::new(repository);
        app_service.init().await?;
        Ok(Arc::new(app_service))
    }

    async fn create_repository(
        mode: StoreMode,
        secrets_path: &str,
    ) -> Result<Arc<dyn RecordRepository>, Box<dyn std::error::Error>> {
        match mode {
            StoreMode::Local => Ok(Arc::new(LocalRecordRepository::new())),
            StoreMode::Spreadsheet => {
                let config = AppConfig::load(secrets_path)?;
                let spreadsheet_manager = Arc::new(SpreadsheetManager::new(&config).await?);
                Ok(Arc::new(SpreadsheetRecordRepository::new(spreadsheet_manager)))
            }
        }
    }
}
