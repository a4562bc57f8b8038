pub mod app;
pub mod detail;
pub mod forms;
pub mod tables;
