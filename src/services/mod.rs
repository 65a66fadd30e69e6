// src/services/mod.rs

pub mod analytics;
pub mod csv_import;
pub mod scoring;
pub mod selection;
