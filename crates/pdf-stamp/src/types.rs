use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StampError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(
        "Crop {rect} does not fit inside page of {page_width} x {page_height} pt"
    )]
    CropOutOfBounds {
        rect: Rect,
        page_width: f32,
        page_height: f32,
    },
    #[error("Crop percentages must be non-zero")]
    InvalidCropPercent,
    #[error("Page index {index} out of range (document has {page_count} pages)")]
    PageOutOfRange { index: usize, page_count: usize },
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StampError>;

/// Rectangle in points, top-left based: `x0,y0` is the upper-left corner
/// and y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle from origin and size
    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + width,
            y1: y + height,
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x0, self.y0, self.x1, self.y1)
    }
}

/// Intrinsic size and resolution of a source image.
///
/// A resolution of zero means the format carried no density information.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelGeometry {
    pub width: u32,
    pub height: u32,
    pub x_resolution: f32,
    pub y_resolution: f32,
}

/// Which pages an image is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    /// A single zero-based page index
    Index(usize),
    /// Every page, in ascending order
    All,
}

impl Default for PageTarget {
    fn default() -> Self {
        PageTarget::Index(0)
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageTarget::Index(index) => write!(f, "page {}", index),
            PageTarget::All => f.write_str("all pages"),
        }
    }
}

/// Recoverable, per-item problems. The batch continues after each of these.
#[derive(Debug, Clone, PartialEq)]
pub enum StampWarning {
    /// A fixed image's source file does not exist
    MissingSourceFile { path: PathBuf },
    /// A random or disposable pool has no regular files
    EmptyPool { pool: PathBuf },
    /// A pool directory could not be listed
    PoolUnreadable { pool: PathBuf, reason: String },
    /// Image metadata or pixels could not be read
    UnreadableImage { path: PathBuf, reason: String },
    /// Creating a configured directory failed
    DirectoryCreationFailure { directory: PathBuf, reason: String },
    /// A placed pool image could not be moved to its disposed directory
    DisposalMoveFailure {
        path: PathBuf,
        disposed_dir: PathBuf,
        reason: String,
    },
}

impl fmt::Display for StampWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StampWarning::MissingSourceFile { path } => {
                write!(f, "image {} does not exist", path.display())
            }
            StampWarning::EmptyPool { pool } => {
                write!(f, "pool {} has no images", pool.display())
            }
            StampWarning::PoolUnreadable { pool, reason } => {
                write!(f, "pool {} can not be read: {}", pool.display(), reason)
            }
            StampWarning::UnreadableImage { path, reason } => {
                write!(f, "image {} can not be read: {}", path.display(), reason)
            }
            StampWarning::DirectoryCreationFailure { directory, reason } => {
                write!(
                    f,
                    "directory {} can not be created: {}",
                    directory.display(),
                    reason
                )
            }
            StampWarning::DisposalMoveFailure {
                path,
                disposed_dir,
                reason,
            } => write!(
                f,
                "image {} could not be moved to {}: {}",
                path.display(),
                disposed_dir.display(),
                reason
            ),
        }
    }
}

/// Outcome of one stamping run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StampReport {
    /// Whether every configured directory exists
    pub directories_ok: bool,
    /// Number of crop boxes set
    pub crops_applied: usize,
    /// Number of image draws, counting each page of an "all pages" target
    pub images_placed: usize,
    /// Files moved into a disposed directory
    pub disposed: Vec<PathBuf>,
    /// Recoverable problems, in the order they occurred
    pub warnings: Vec<StampWarning>,
}

impl StampReport {
    pub(crate) fn warn(&mut self, warning: StampWarning) {
        match warning {
            // Running a pool dry is the normal end state of disposable pools
            StampWarning::EmptyPool { .. } => log::info!("Skipping: {}", warning),
            _ => log::warn!("{}", warning),
        }
        self.warnings.push(warning);
    }
}
