use crate::error::ValidationError;
use crate::upload::{FileRecord, FileStatus, FileUpdate, SelectedFile};
use tracing::{debug, warn};

/// Every change to the session goes through one of these.
#[derive(Debug, Clone)]
pub enum Action {
    AddFile { id: String, file: SelectedFile },
    RemoveFile(String),
    /// Back to `Uploading` with error and summary cleared.
    Retry(String),
    Update(FileUpdate),
    SetError(String),
    ClearError,
}

impl From<FileUpdate> for Action {
    fn from(update: FileUpdate) -> Self {
        Action::Update(update)
    }
}

#[derive(Debug)]
pub struct SessionState {
    pub files: Vec<FileRecord>,
    pub error: Option<String>,
    max_files: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(3)
    }
}

impl SessionState {
    pub fn new(max_files: usize) -> Self {
        Self {
            files: Vec::new(),
            error: None,
            max_files,
        }
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn can_add_more(&self) -> bool {
        self.files.len() < self.max_files
    }

    pub fn is_busy(&self) -> bool {
        self.files.iter().any(|f| f.status.is_in_flight())
    }

    /// Shown under the upload button while any sequence is running.
    pub fn progress_note(&self) -> Option<&'static str> {
        self.is_busy()
            .then_some("Processing your files... This may take a few minutes.")
    }

    pub fn find(&self, id: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn queued(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(|f| f.status == FileStatus::Queued)
    }

    pub fn completed(&self) -> impl Iterator<Item = &FileRecord> {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Completed && f.summary.is_some())
    }

    pub fn check_capacity(&self) -> Result<(), ValidationError> {
        if self.can_add_more() {
            Ok(())
        } else {
            Err(ValidationError::TooManyFiles(self.max_files))
        }
    }

    pub fn check_duplicate(&self, file: &SelectedFile) -> Result<(), ValidationError> {
        if self.files.iter().any(|f| f.file.is_same_file(file)) {
            Err(ValidationError::Duplicate)
        } else {
            Ok(())
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::AddFile { id, file } => {
                if !self.can_add_more() || self.find(&id).is_some() {
                    warn!(file_id = %id, "Ignoring add beyond capacity or with a reused id");
                    return;
                }
                debug!(file_id = %id, file = ?file, "Added file");
                self.files.push(FileRecord::new(id, file));
            }
            Action::RemoveFile(id) => {
                self.files.retain(|f| f.id != id);
            }
            Action::Retry(id) => {
                if let Some(record) = self.record_mut(&id) {
                    record.status = FileStatus::Uploading;
                    record.error = None;
                    record.summary = None;
                }
            }
            Action::Update(update) => self.apply_update(update),
            Action::SetError(message) => self.error = Some(message),
            Action::ClearError => self.error = None,
        }
    }

    fn apply_update(&mut self, update: FileUpdate) {
        match update {
            FileUpdate::Stage { id, stage } => {
                if let Some(record) = self.record_mut(&id) {
                    record.status = stage.into();
                    record.error = None;
                }
            }
            FileUpdate::Completed { id, summary } => {
                if let Some(record) = self.record_mut(&id) {
                    if summary.is_empty() {
                        record.status = FileStatus::Failed;
                        record.error = Some("Empty or invalid summary response".to_string());
                    } else {
                        record.status = FileStatus::Completed;
                        record.summary = Some(summary);
                        record.error = None;
                    }
                }
            }
            FileUpdate::Failed { id, error } => {
                if let Some(record) = self.record_mut(&id) {
                    record.status = FileStatus::Failed;
                    record.error = Some(if error.trim().is_empty() {
                        "Upload failed".to_string()
                    } else {
                        error
                    });
                }
            }
        }
    }

    // Updates from tasks whose record was removed land here as None.
    fn record_mut(&mut self, id: &str) -> Option<&mut FileRecord> {
        self.files.iter_mut().find(|f| f.id == id)
    }
}
