pub mod local_record_repository;
pub mod spreadsheet_record_repository;
