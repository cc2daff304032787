#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod store;
