pub mod app;
pub mod core;
pub mod filters;
pub mod store;
pub mod utils;
