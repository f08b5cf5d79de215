pub mod mastery_view;
pub mod paradigm_table;
pub mod selector;
