use super::{Action, SummaryUploader};
use crate::upload::{FileRecord, FileStatus};
use crate::utils::file_size::format_size;
use crate::utils::summary_export::summary_file_name;
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing::{error, info};

const ACCENT: Color32 = Color32::from_rgb(99, 102, 241);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const FAILURE: Color32 = Color32::from_rgb(220, 50, 50);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

enum CardAction {
    Remove(String),
    Retry(String),
    Copy(String),
    Download(String),
}

impl SummaryUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Document Summarizer");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Upload up to three PDF or TXT files and get an AI summary")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);

                if self.state.can_add_more() {
                    self.render_drop_zone(ctx, ui);
                    ui.add_space(10.0);
                }

                if let Some(error) = self.state.error.clone() {
                    ui.horizontal(|ui| {
                        ui.colored_label(FAILURE, format!("⚠ {}", error));
                        if ui.small_button("✖").clicked() {
                            self.clear_error();
                        }
                    });
                    ui.add_space(10.0);
                }

                for record in &self.state.files {
                    render_card(ui, record, &mut actions);
                    ui.add_space(6.0);
                }

                if !self.state.files.is_empty() {
                    ui.add_space(10.0);
                    ui.vertical_centered(|ui| {
                        let can_upload = self.state.queued().next().is_some() && !self.state.is_busy();
                        ui.add_enabled_ui(can_upload, |ui| {
                            let label = format!("📤 Upload {} Files", self.state.queued().count());
                            let button = egui::Button::new(label).min_size(egui::vec2(200.0, 40.0));
                            if ui.add(button).clicked() {
                                self.upload_all_files();
                            }
                        });
                        if let Some(note) = self.state.progress_note() {
                            ui.add_space(6.0);
                            ui.label(RichText::new(note).color(MUTED));
                        }
                    });
                }

                if self.state.completed().next().is_some() {
                    ui.add_space(20.0);
                    self.render_results(ui, &mut actions);
                }

                ui.add_space(20.0);
            });
        });

        for action in actions {
            self.handle_card_action(ctx, action);
        }
    }

    fn render_drop_zone(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());

        ui.group(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                let prompt = if hovering {
                    "Release to add files"
                } else {
                    "Drop your files here or click to browse"
                };
                ui.label(RichText::new(prompt).strong());
                ui.label(
                    RichText::new(format!(
                        "PDF and TXT files, {} of {} slots used",
                        self.state.files.len(),
                        self.state.max_files()
                    ))
                    .color(MUTED),
                );
                ui.add_space(8.0);

                if ui.button("📁 Browse Files").clicked() {
                    let extensions = self.config.accepted.extensions();
                    if let Some(paths) = FileDialog::new()
                        .add_filter("Documents", extensions.as_slice())
                        .pick_files()
                    {
                        self.add_paths(&paths);
                    }
                }
                ui.add_space(10.0);
            });
        });
    }

    fn render_results(&self, ui: &mut egui::Ui, actions: &mut Vec<CardAction>) {
        ui.heading("Summaries");
        ui.add_space(8.0);

        for record in self.state.completed() {
            let Some(summary) = record.summary.as_deref() else {
                continue;
            };

            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&record.file.name).strong());
                    ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                        if ui.button("💾 Download").clicked() {
                            actions.push(CardAction::Download(record.id.clone()));
                        }
                        if ui.button("📋 Copy").clicked() {
                            actions.push(CardAction::Copy(record.id.clone()));
                        }
                    });
                });

                ui.add_space(4.0);
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .id_source(&record.id)
                            .max_height(240.0)
                            .show(ui, |ui| {
                                for paragraph in summary.split('\n') {
                                    ui.label(paragraph);
                                }
                            });
                    });
            });
            ui.add_space(8.0);
        }

        if let Some(path) = &self.last_saved {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("Saved to {}", path.display())).color(MUTED));
                if ui.small_button("Open").clicked() {
                    if let Err(e) = open::that(path) {
                        error!(path = %path.display(), "Failed to open summary: {}", e);
                    }
                }
            });
        }
    }

    pub(super) fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        for file in dropped {
            match (file.path, file.bytes) {
                (Some(path), _) => paths.push(path),
                (None, Some(bytes)) => {
                    let _ = self.add_file(file.name, bytes.to_vec());
                }
                (None, None) => {}
            }
        }
        if !paths.is_empty() {
            self.add_paths(&paths);
        }
    }

    fn handle_card_action(&mut self, ctx: &egui::Context, action: CardAction) {
        match action {
            CardAction::Remove(id) => self.remove_file(&id),
            CardAction::Retry(id) => self.retry_upload(&id),
            CardAction::Copy(id) => {
                if let Some((_, summary)) = self.summary_for(&id) {
                    let text = summary.to_string();
                    ctx.output_mut(|o| o.copied_text = text);
                    info!(file_id = %id, "Copied summary to clipboard");
                }
            }
            CardAction::Download(id) => {
                let Some((name, _)) = self.summary_for(&id) else {
                    return;
                };
                let default_name = summary_file_name(name);
                if let Some(path) = FileDialog::new()
                    .add_filter("Text", &["txt"])
                    .set_file_name(default_name)
                    .save_file()
                {
                    if let Err(e) = self.download_summary_to(&id, &path) {
                        error!(file_id = %id, "Failed to save summary: {}", e);
                        self.dispatch(Action::SetError(format!("Failed to save summary: {}", e)));
                    }
                }
            }
        }
    }
}

fn render_card(ui: &mut egui::Ui, record: &FileRecord, actions: &mut Vec<CardAction>) {
    let (icon, color) = match record.status {
        FileStatus::Queued => ("📄", MUTED),
        FileStatus::Uploading => ("⏳", ACCENT),
        FileStatus::Uploaded => ("✅", SUCCESS),
        FileStatus::Processing => ("🧠", ACCENT),
        FileStatus::Completed => ("✅", SUCCESS),
        FileStatus::Failed => ("❌", FAILURE),
    };

    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(icon);
            ui.vertical(|ui| {
                ui.label(RichText::new(&record.file.name).strong());
                ui.label(RichText::new(format_size(record.file.size())).color(MUTED).small());
            });

            ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                    actions.push(CardAction::Remove(record.id.clone()));
                }
                if record.status == FileStatus::Failed
                    && ui.small_button("🔄").on_hover_text("Retry").clicked()
                {
                    actions.push(CardAction::Retry(record.id.clone()));
                }
            });
        });

        ui.colored_label(color, record.status_text());

        let progress_bar = egui::ProgressBar::new(record.status.progress())
            .show_percentage()
            .animate(record.status.is_in_flight())
            .fill(color);
        ui.add(progress_bar);
    });
}
