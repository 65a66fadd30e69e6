// src/models/mod.rs

pub mod interview;
pub mod question;
pub mod user;
