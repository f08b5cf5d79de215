pub mod controller;
pub mod key;
pub mod label;
pub mod set;
