#![forbid(unsafe_code)]

pub mod check;
pub mod draft;
pub mod gas;
pub mod gate;
pub mod providers;
pub mod rules;
pub mod session;
