pub mod accepted_types;
pub mod file_size;
pub mod summary_export;
