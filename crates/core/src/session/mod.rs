pub mod capture_session;
pub mod config;
pub mod controller;
pub mod observation;
pub mod payload;
