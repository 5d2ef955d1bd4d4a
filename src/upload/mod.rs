mod file_processor;
pub mod response;
mod service;
mod types;

pub use file_processor::{FileProcessor, PollPolicy};
pub use service::{SummaryService, WebhookClient};
pub use types::{FileRecord, FileStatus, FileUpdate, SelectedFile, Stage};

#[cfg(test)]
pub(crate) use file_processor::tests::ScriptedService;
