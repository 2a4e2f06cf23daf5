pub mod app;
pub mod components;
pub mod create;
pub mod detail;
pub mod event;
pub mod list;
