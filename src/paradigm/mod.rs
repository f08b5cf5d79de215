pub mod database;
pub mod grid;
