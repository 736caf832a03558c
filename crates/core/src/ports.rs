pub mod application_service;
pub mod command_handler;
pub mod record_repository;
