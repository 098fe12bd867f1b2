pub mod analyze;
pub mod check;
pub mod common;
pub mod generate;
