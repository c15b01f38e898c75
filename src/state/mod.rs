pub mod app_settings;
pub mod app_state;
pub mod messages;
pub mod records;
pub mod refresher;
pub mod registry;
pub mod storage;
