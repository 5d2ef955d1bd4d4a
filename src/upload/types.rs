use derivative::Derivative;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Queued,
    Uploading,
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl FileStatus {
    pub fn progress(self) -> f32 {
        match self {
            FileStatus::Queued | FileStatus::Failed => 0.0,
            FileStatus::Uploading => 0.25,
            FileStatus::Uploaded => 0.5,
            FileStatus::Processing => 0.75,
            FileStatus::Completed => 1.0,
        }
    }

    /// True while an upload/poll sequence is driving the record.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            FileStatus::Uploading | FileStatus::Uploaded | FileStatus::Processing
        )
    }
}

/// Non-terminal steps reported by the upload/poll sequence. Terminal steps
/// carry their payload in [`FileUpdate`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    Uploaded,
    Processing,
}

impl From<Stage> for FileStatus {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Uploading => FileStatus::Uploading,
            Stage::Uploaded => FileStatus::Uploaded,
            Stage::Processing => FileStatus::Processing,
        }
    }
}

/// Message sent from an upload task back to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileUpdate {
    Stage { id: String, stage: Stage },
    Completed { id: String, summary: String },
    Failed { id: String, error: String },
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    #[derivative(Debug = "ignore")]
    pub bytes: Arc<Vec<u8>>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Same name and size is treated as the same document.
    pub fn is_same_file(&self, other: &SelectedFile) -> bool {
        self.name == other.name && self.size() == other.size()
    }
}

#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: String,
    pub file: SelectedFile,
    pub status: FileStatus,
    pub error: Option<String>,
    pub summary: Option<String>,
}

impl FileRecord {
    pub fn new(id: String, file: SelectedFile) -> Self {
        Self {
            id,
            file,
            status: FileStatus::Queued,
            error: None,
            summary: None,
        }
    }

    pub fn status_text(&self) -> &str {
        match self.status {
            FileStatus::Queued => "Ready to upload",
            FileStatus::Uploading => "Uploading...",
            FileStatus::Uploaded => "File uploaded",
            FileStatus::Processing => "Processing with AI",
            FileStatus::Completed => "Summary ready",
            FileStatus::Failed => self.error.as_deref().unwrap_or("Upload failed"),
        }
    }
}
