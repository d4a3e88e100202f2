use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::Config;
use crate::error::{AnnotateError, Result};
use crate::export::{self, CropWriter};
use crate::scale::{self, Scale};
use crate::selection::{InteractionMode, PointerEvent, Selection, SelectionStateMachine, Viewport};
use crate::transform::Transform;
use crate::workspace;
use crate::zoom;

// ── Image under review ─────────────────────────────────────────────────────

/// One loaded image together with how it is currently shown.
pub struct ImageView {
    pub(crate) file_name: String,
    pub(crate) original: DynamicImage,
    pub(crate) display: DynamicImage,
    pub(crate) transform: Transform,
    pub(crate) selection: SelectionStateMachine,
    pub(crate) zoomed: bool,
    /// Bumped every time `display` is replaced.
    pub(crate) revision: u64,
}

impl ImageView {
    pub fn new(file_name: impl Into<String>, original: DynamicImage, config: &Config) -> Result<Self> {
        let mut view = Self {
            file_name: file_name.into(),
            display: DynamicImage::new_rgb8(1, 1),
            original,
            transform: Transform::default(),
            selection: SelectionStateMachine::default(),
            zoomed: false,
            revision: 0,
        };
        view.reset(config)?;
        Ok(view)
    }

    /// Back to the whole image at its fitting scale, no selection.
    pub fn reset(&mut self, config: &Config) -> Result<()> {
        let scale = scale::compute(
            self.original.width(),
            self.original.height(),
            config.max_width,
            config.max_height,
            config.scale_policy,
        )?;
        self.display = render(&self.original, scale);
        self.transform = Transform::new(scale);
        self.selection.clear();
        self.zoomed = false;
        self.revision += 1;
        Ok(())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn display(&self) -> &DynamicImage {
        &self.display
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.selection()
    }

    pub fn selection_mode(&self) -> InteractionMode {
        self.selection.mode()
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn viewport(&self, config: &Config) -> Viewport {
        Viewport {
            width: self.display.width(),
            height: self.display.height(),
            min_side: self.transform.scale.apply(config.min_square_px),
        }
    }
}

/// Downscales `image` by `scale`. Never produces an empty bitmap.
pub(crate) fn render(image: &DynamicImage, scale: Scale) -> DynamicImage {
    if scale == Scale::ONE {
        return image.clone();
    }
    let width = scale.apply(image.width()).max(1);
    let height = scale.apply(image.height()).max(1);
    image.resize_exact(width, height, FilterType::Triangle)
}

// ── Session ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Archive the current image and load the next one.
    Advance,
    /// Export the selection into the class bound to this key.
    Export(char),
    Zoom,
    /// Drop the selection and leave zoom.
    Reset,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// State changed, repaint.
    Redraw,
    Exported(PathBuf),
    /// A new image is loaded.
    Loaded,
    /// The last image was archived.
    Finished,
    Quit,
}

/// All state of a review run: which images are pending and the one on screen.
pub struct Session {
    root: PathBuf,
    config: Config,
    files: Vec<String>,
    index: usize,
    view: ImageView,
}

impl Session {
    /// Scans `root`, prepares the class directories and loads the first
    /// readable image.
    pub fn open(root: &Path, config: Config) -> Result<Self> {
        let files = workspace::scan_images(root, &config.extensions)?;
        workspace::provision(root, &config)?;
        log::info!("Found {} images in {}", files.len(), root.display());

        let Some((index, view)) = load_from(root, &config, &files, 0) else {
            return Err(AnnotateError::EmptyDirectory(root.to_path_buf()));
        };
        Ok(Self {
            root: root.to_path_buf(),
            config,
            files,
            index,
            view,
        })
    }

    pub fn view(&self) -> &ImageView {
        &self.view
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 1-based position and total, for the window title.
    pub fn progress(&self) -> (usize, usize) {
        (self.index + 1, self.files.len())
    }

    /// Feeds a pointer event to the selection. True if a repaint is needed.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        let viewport = self.view.viewport(&self.config);
        self.view.selection.handle(event, &viewport)
    }

    /// Runs a key command. Failed commands leave the session untouched.
    pub fn apply(&mut self, command: Command, writer: &mut impl CropWriter) -> Result<Outcome> {
        match command {
            Command::Advance => self.advance(),
            Command::Export(key) => {
                export::export(&self.view, &self.root, &self.config, key, writer)
                    .map(Outcome::Exported)
            }
            Command::Zoom => {
                zoom::zoom(&mut self.view, &self.config)?;
                Ok(Outcome::Redraw)
            }
            Command::Reset => {
                self.view.reset(&self.config)?;
                Ok(Outcome::Redraw)
            }
            Command::Quit => Ok(Outcome::Quit),
        }
    }

    fn advance(&mut self) -> Result<Outcome> {
        let moved = workspace::archive(&self.root, &self.config, &self.view.file_name)?;
        log::info!("Archived {}", moved.display());

        match load_from(&self.root, &self.config, &self.files, self.index + 1) {
            Some((index, view)) => {
                self.index = index;
                self.view = view;
                Ok(Outcome::Loaded)
            }
            None => {
                self.index = self.files.len();
                Ok(Outcome::Finished)
            }
        }
    }
}

/// First image at or after `start` that decodes. Unreadable files are
/// reported and left where they are.
fn load_from(root: &Path, config: &Config, files: &[String], start: usize) -> Option<(usize, ImageView)> {
    files.iter().enumerate().skip(start).find_map(|(index, name)| {
        let loaded = workspace::load_image(&root.join(name))
            .and_then(|original| ImageView::new(name.as_str(), original, config));
        match loaded {
            Ok(view) => {
                log::info!(
                    "Loaded {name} ({}x{}, scale 1/{})",
                    view.original.width(),
                    view.original.height(),
                    view.transform.scale.divisor()
                );
                Some((index, view))
            }
            Err(err) => {
                log::error!("Skipping {name}: {err}");
                None
            }
        }
    })
}
