use iced::futures::StreamExt;
use iced::widget::{column, container, scrollable};
use iced::{Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

mod config;
mod fusion;
mod gallery;
mod storage;
mod ui;
mod upload;

use config::Config;
use fusion::client::{ArtifactRef, FusionError};
use fusion::pipeline::{FusionPipeline, FusionState, SubmitBlocked};
use gallery::mirror::GalleryArtifact;
use gallery::sync::GallerySync;
use gallery::thumbs::ThumbnailCache;
use storage::publish::{PublishError, PUBLISH_LABEL};
use storage::StorageError;
use upload::preview::PreviewGuard;
use upload::slot::{SlotOutcome, UploadSlot};
use upload::validator::{self, UploadRejection, ValidatedFile};

/// Which of the two upload positions an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotIndex {
    First,
    Second,
}

impl SlotIndex {
    fn as_usize(self) -> usize {
        match self {
            SlotIndex::First => 0,
            SlotIndex::Second => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SlotIndex::First => "First Character",
            SlotIndex::Second => "Second Character",
        }
    }
}

/// Main application state
struct FusionStudio {
    config: Config,
    /// Shared guard tracking every live transient image resource
    guard: PreviewGuard,
    /// The two upload positions
    slots: [UploadSlot; 2],
    /// Fusion submission state machine
    pipeline: FusionPipeline,
    /// Live mirror of the artifact store
    gallery: GallerySync,
    /// Fetched bytes for rendering remote gallery artifacts
    thumbs: ThumbnailCache,
    /// Status line shown to the user
    status: String,
}

/// Application messages (events)
///
/// Every asynchronous completion carries the stamp of the state it was
/// issued against (slot generation, submission sequence, subscription
/// epoch) so stale results are discarded with an equality test.
#[derive(Debug, Clone)]
pub enum Message {
    /// User asked to pick an image for a slot
    PickImage(SlotIndex),
    /// A file was dropped onto the window
    FileDropped(PathBuf),
    /// User cleared a slot
    ClearSlot(SlotIndex),
    /// An async validation finished for a slot
    SlotValidated(SlotIndex, u64, Result<ValidatedFile, UploadRejection>),
    /// User pressed the fuse button
    Fuse,
    /// The fusion request completed
    FusionResolved(u64, Result<ArtifactRef, FusionError>),
    /// The publish of a produced artifact completed
    ArtifactPublished(u64, Result<GalleryArtifact, PublishError>),
    /// The initial gallery listing completed
    GalleryLoaded(u64, Result<Vec<GalleryArtifact>, StorageError>),
    /// The change feed delivered an authoritative snapshot
    GalleryFeed(u64, Vec<GalleryArtifact>),
    /// Thumbnail bytes arrived (or failed) for a gallery artifact
    ThumbnailFetched(String, Option<Vec<u8>>),
}

impl FusionStudio {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = Config::from_env();

        println!("🎨 Fusion Studio starting");
        println!("   fusion service: {}", config.service_url);
        println!("   artifact store: {}", config.storage_url);

        let mut gallery = GallerySync::new();
        let epoch = gallery.subscribe();

        // Initial full listing; the change feed runs independently
        let initial_load = Task::perform(
            storage::list_artifacts(config.storage_url.clone()),
            move |result| Message::GalleryLoaded(epoch, result),
        );

        (
            FusionStudio {
                config,
                guard: PreviewGuard::new(),
                slots: [UploadSlot::new(), UploadSlot::new()],
                pipeline: FusionPipeline::new(),
                gallery,
                thumbs: ThumbnailCache::new(),
                status: "Pick two character images to get started.".to_string(),
            },
            initial_load,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage(index) => {
                // Show the native file picker dialog
                let title = format!("Select the {}", index.label());
                let file = FileDialog::new()
                    .set_title(&title)
                    .add_filter(
                        "Images",
                        &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "avif"],
                    )
                    .pick_file();

                match file {
                    Some(path) => self.start_validation(index, path),
                    None => Task::none(),
                }
            }

            Message::FileDropped(path) => {
                // A drop targets the first free slot
                match self.slots.iter().position(|slot| !slot.is_filled()) {
                    Some(0) => self.start_validation(SlotIndex::First, path),
                    Some(_) => self.start_validation(SlotIndex::Second, path),
                    None => {
                        self.status =
                            "Both slots are filled; clear one before dropping a new image."
                                .to_string();
                        Task::none()
                    }
                }
            }

            Message::ClearSlot(index) => {
                self.slots[index.as_usize()].clear();
                self.status = format!("{} cleared.", index.label());
                Task::none()
            }

            Message::SlotValidated(index, generation, result) => {
                let outcome =
                    self.slots[index.as_usize()].resolve(generation, result, &self.guard);
                match outcome {
                    SlotOutcome::Accepted => {
                        let size_mib = self.slots[index.as_usize()]
                            .file()
                            .map(|file| file.size() as f64 / 1024.0 / 1024.0)
                            .unwrap_or_default();
                        self.status = format!("{} ready ({size_mib:.2} MiB).", index.label());
                    }
                    SlotOutcome::Rejected(rejection) => {
                        self.status = format!("❌ {rejection}");
                    }
                    // Superseded by a newer pick; nothing to report
                    SlotOutcome::Stale => {}
                }
                Task::none()
            }

            Message::Fuse => match self.pipeline.submit(&self.slots[0], &self.slots[1]) {
                Ok((seq, request)) => {
                    self.status = "Creating your fusion…".to_string();
                    Task::perform(
                        fusion::client::combine(self.config.service_url.clone(), request),
                        move |outcome| Message::FusionResolved(seq, outcome),
                    )
                }
                // Already in flight: pressing the button again is a no-op
                Err(SubmitBlocked::InFlight) => Task::none(),
                Err(blocked) => {
                    self.status = blocked.to_string();
                    Task::none()
                }
            },

            Message::FusionResolved(seq, outcome) => {
                match self.pipeline.resolve(seq, outcome) {
                    Some(FusionState::Succeeded(artifact)) => {
                        println!(
                            "✨ Fusion succeeded: {} (id: {})",
                            artifact.url,
                            artifact.id.as_deref().unwrap_or("none")
                        );
                        let artifact = artifact.clone();
                        self.status = "Fusion complete! Publishing to the gallery…".to_string();
                        Task::perform(
                            storage::publish::publish(
                                self.config.storage_url.clone(),
                                self.guard.clone(),
                                artifact,
                                PUBLISH_LABEL.to_string(),
                            ),
                            move |result| Message::ArtifactPublished(seq, result),
                        )
                    }
                    Some(FusionState::Failed(reason)) => {
                        self.status = format!("Fusion failed: {reason}");
                        Task::none()
                    }
                    // Stale completion (e.g. finished after a newer submit)
                    _ => Task::none(),
                }
            }

            Message::ArtifactPublished(_seq, result) => match result {
                Ok(record) => {
                    println!("📸 Published to gallery: {}", record.id);
                    self.status = "Your fusion is live in the gallery!".to_string();
                    self.gallery.adopt(record);
                    self.refresh_thumbnails()
                }
                Err(error) => {
                    // The fusion itself succeeded; only the gallery copy
                    // is missing. Retry happens by fusing again.
                    eprintln!("⚠️  Publish failed: {error}");
                    self.status = format!(
                        "Fusion succeeded, but it could not be published to the gallery: {error}"
                    );
                    Task::none()
                }
            },

            Message::GalleryLoaded(epoch, result) => {
                let applied = self
                    .gallery
                    .apply_initial(epoch, result.map_err(|e| e.to_string()));
                if applied {
                    self.refresh_thumbnails()
                } else {
                    Task::none()
                }
            }

            Message::GalleryFeed(epoch, snapshot) => {
                if self.gallery.apply_feed(epoch, snapshot) {
                    self.refresh_thumbnails()
                } else {
                    Task::none()
                }
            }

            Message::ThumbnailFetched(id, bytes) => {
                self.thumbs.store(id, bytes);
                Task::none()
            }
        }
    }

    /// Begin a stamped validation for a picked or dropped file
    fn start_validation(&mut self, index: SlotIndex, path: PathBuf) -> Task<Message> {
        let generation = self.slots[index.as_usize()].begin();
        self.status = format!("Validating {}…", path.display());

        Task::perform(validator::load_and_validate(path), move |result| {
            Message::SlotValidated(index, generation, result)
        })
    }

    /// Fetch bytes for any mirrored artifact without a cached thumbnail
    fn refresh_thumbnails(&mut self) -> Task<Message> {
        let to_fetch = self.thumbs.reconcile(self.gallery.mirror().artifacts());

        Task::batch(to_fetch.into_iter().map(|artifact| {
            let GalleryArtifact { id, url, .. } = artifact;
            Task::perform(gallery::thumbs::fetch(url), move |bytes| {
                Message::ThumbnailFetched(id.clone(), bytes)
            })
        }))
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let latest = self
            .gallery
            .mirror()
            .newest()
            .and_then(|artifact| self.thumbs.get(&artifact.id));

        let content = column![
            ui::uploader::panel(&self.slots, &self.pipeline, latest, &self.status),
            ui::gallery::section(&self.gallery, &self.thumbs),
        ]
        .spacing(30)
        .padding(40);

        scrollable(
            container(content)
                .width(Length::Fill)
                .center_x(Length::Fill),
        )
        .into()
    }

    /// Window events and the gallery change feed
    fn subscription(&self) -> Subscription<Message> {
        let drops = iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        });

        if self.gallery.is_subscribed() {
            let epoch = self.gallery.epoch();
            let feed = Subscription::run_with_id(
                ("gallery-feed", epoch),
                storage::watch(self.config.storage_url.clone())
                    .map(move |snapshot| Message::GalleryFeed(epoch, snapshot)),
            );
            Subscription::batch([drops, feed])
        } else {
            drops
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application("Fusion Studio", FusionStudio::update, FusionStudio::view)
        .subscription(FusionStudio::subscription)
        .theme(FusionStudio::theme)
        .centered()
        .run_with(FusionStudio::new)
}
