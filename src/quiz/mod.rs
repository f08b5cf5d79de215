pub mod answer;
pub mod mastery;
pub mod navigation;
pub mod table;
