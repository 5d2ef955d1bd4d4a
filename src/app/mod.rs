mod state;
mod ui;

use crate::config::UploaderConfig;
use crate::error::{Error, Result, ValidationError};
use crate::upload::{FileProcessor, FileUpdate, SelectedFile, Stage, SummaryService, WebhookClient};
use crate::utils::summary_export;
use eframe::{egui, App};
pub use state::{Action, SessionState};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{info, warn};
use uuid::Uuid;

pub struct SummaryUploader {
    config: UploaderConfig,
    state: SessionState,
    processor: FileProcessor,
    runtime: Handle,
    update_sender: std_mpsc::Sender<FileUpdate>,
    update_receiver: std_mpsc::Receiver<FileUpdate>,
    last_saved: Option<PathBuf>,
}

impl SummaryUploader {
    pub fn new(config: UploaderConfig, runtime: Handle) -> Self {
        let service = Arc::new(WebhookClient::new(config.webhook_url.clone()));
        Self::with_service(config, runtime, service)
    }

    pub fn with_service(
        config: UploaderConfig,
        runtime: Handle,
        service: Arc<dyn SummaryService>,
    ) -> Self {
        info!(webhook = %config.webhook_url, max_files = config.max_files, "Initializing summary uploader");
        let (update_sender, update_receiver) = std_mpsc::channel();
        Self {
            state: SessionState::new(config.max_files),
            processor: FileProcessor::new(service, config.poll.clone()),
            config,
            runtime,
            update_sender,
            update_receiver,
            last_saved: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn dispatch(&mut self, action: Action) {
        self.state.apply(action);
    }

    /// Validates and adds one file. Rejections become the session error.
    pub fn add_file(&mut self, name: String, bytes: Vec<u8>) -> std::result::Result<String, ValidationError> {
        let result = self.validate(name, bytes);
        match result {
            Ok((id, file)) => {
                info!(file_id = %id, file = %file.name, size = file.size(), "File added");
                self.dispatch(Action::AddFile {
                    id: id.clone(),
                    file,
                });
                Ok(id)
            }
            Err(e) => {
                warn!("File rejected: {}", e);
                self.dispatch(Action::SetError(e.to_string()));
                Err(e)
            }
        }
    }

    fn validate(&self, name: String, bytes: Vec<u8>) -> std::result::Result<(String, SelectedFile), ValidationError> {
        self.state.check_capacity()?;
        let mime_type = self
            .config
            .accepted
            .mime_for(&name)
            .ok_or(ValidationError::UnsupportedType)?
            .to_string();
        let file = SelectedFile::new(name, mime_type, bytes);
        self.state.check_duplicate(&file)?;
        Ok((Uuid::new_v4().to_string(), file))
    }

    /// Adds files picked in the dialog or dropped on the window. Unsupported
    /// types are skipped silently; adding stops once the list is full.
    pub fn add_paths(&mut self, paths: &[PathBuf]) {
        self.dispatch(Action::ClearError);

        for path in paths {
            if let Err(e) = self.state.check_capacity() {
                warn!("Not adding more files: {}", e);
                self.dispatch(Action::SetError(e.to_string()));
                break;
            }

            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            if !self.config.accepted.is_accepted(&name) {
                info!(file = %name, "Skipping unsupported file");
                continue;
            }

            match read_file(path) {
                Ok(bytes) => {
                    // Rejections are already recorded as the session error.
                    let _ = self.add_file(name, bytes);
                }
                Err(e) => {
                    warn!(path = %path.display(), "Could not read file: {}", e);
                    self.dispatch(Action::SetError(e.to_string()));
                }
            }
        }
    }

    pub fn remove_file(&mut self, id: &str) {
        info!(file_id = id, "Removing file");
        self.dispatch(Action::RemoveFile(id.to_string()));
    }

    pub fn upload_all_files(&mut self) {
        let pending: Vec<(String, SelectedFile)> = self
            .state
            .queued()
            .map(|f| (f.id.clone(), f.file.clone()))
            .collect();

        if pending.is_empty() {
            self.dispatch(Action::SetError(ValidationError::NothingToUpload.to_string()));
            return;
        }

        info!("Starting upload of {} files", pending.len());
        for (id, file) in pending {
            self.dispatch(Action::Update(FileUpdate::Stage {
                id: id.clone(),
                stage: Stage::Uploading,
            }));
            self.spawn_upload(id, file);
        }
    }

    pub fn retry_upload(&mut self, id: &str) {
        let Some(file) = self.state.find(id).map(|f| f.file.clone()) else {
            return;
        };

        info!(file_id = id, file = %file.name, "Retrying upload");
        self.dispatch(Action::Retry(id.to_string()));
        self.spawn_upload(id.to_string(), file);
    }

    pub fn clear_error(&mut self) {
        self.dispatch(Action::ClearError);
    }

    fn spawn_upload(&self, id: String, file: SelectedFile) {
        let processor = self.processor.clone();
        let sender = self.update_sender.clone();
        self.runtime.spawn(async move {
            processor.process(id, file, sender).await;
        });
    }

    /// Applies every update the upload tasks have sent since the last call.
    pub fn pump(&mut self) -> bool {
        let mut had_updates = false;
        while let Ok(update) = self.update_receiver.try_recv() {
            had_updates = true;
            self.dispatch(update.into());
        }
        had_updates
    }

    pub fn summary_for(&self, id: &str) -> Option<(&str, &str)> {
        self.state
            .find(id)
            .and_then(|f| f.summary.as_deref().map(|s| (f.file.name.as_str(), s)))
    }

    pub fn download_summary_to(&mut self, id: &str, path: &Path) -> Result<()> {
        let (_, summary) = self.summary_for(id).ok_or(Error::NoSummary)?;
        summary_export::save_summary(path, summary)?;
        self.last_saved = Some(path.to_path_buf());
        Ok(())
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.pump() {
            ctx.request_repaint();
        }
        if self.state.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

impl App for SummaryUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.handle_dropped_files(ctx);
        self.render(ctx);
    }
}
