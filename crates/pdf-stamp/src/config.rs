use crate::types::*;
use std::path::{Component, Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where and how large an image is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Left edge in points, measured from the left of the visible page
    #[cfg_attr(feature = "serde", serde(default))]
    pub x: f32,
    /// Top edge in points, measured from the top of the visible page
    #[cfg_attr(feature = "serde", serde(default))]
    pub y: f32,
    /// Scale factor applied to the image's natural size
    #[cfg_attr(feature = "serde", serde(rename = "size", default = "default_scale"))]
    pub scale: f32,
    pub page: PageTarget,
}

#[cfg(feature = "serde")]
fn default_scale() -> f32 {
    1.0
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            page: PageTarget::default(),
        }
    }
}

/// A fixed image file
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageSpec {
    pub path: PathBuf,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub placement: Placement,
}

/// A directory from which one image is drawn at random per run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RandomPoolSpec {
    #[cfg_attr(feature = "serde", serde(rename = "path"))]
    pub pool: PathBuf,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub placement: Placement,
}

/// A random pool whose chosen image is moved out of the pool once placed
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisposablePoolSpec {
    #[cfg_attr(feature = "serde", serde(rename = "path"))]
    pub pool: PathBuf,
    #[cfg_attr(feature = "serde", serde(rename = "disposed_path"))]
    pub disposed_dir: PathBuf,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub placement: Placement,
}

/// Everything to draw on one document.
///
/// Lists are processed in order: fixed images, random pools, then
/// disposable pools. Later draws on a page cover earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub images: Vec<ImageSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub random_images: Vec<RandomPoolSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub disposable_random_images: Vec<DisposablePoolSpec>,
}

/// File formats accepted for the placement configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// YAML for `.yaml`/`.yml`, JSON otherwise
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

impl PlacementConfig {
    /// Load a configuration from a JSON or YAML file and validate it
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let config = Self::from_slice(&bytes, ConfigFormat::from_path(path))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration without validating it
    #[cfg(feature = "serde")]
    pub fn from_slice(bytes: &[u8], format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| StampError::Config(format!("Failed to parse config: {}", e))),
            ConfigFormat::Yaml => serde_yaml::from_slice(bytes)
                .map_err(|e| StampError::Config(format!("Failed to parse config: {}", e))),
        }
    }

    /// Save the configuration as JSON or YAML, chosen by extension
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = match ConfigFormat::from_path(path) {
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| StampError::Config(format!("Failed to serialize config: {}", e)))?,
            ConfigFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|e| StampError::Config(format!("Failed to serialize config: {}", e)))?,
        };
        tokio::fs::write(path, text).await?;
        Ok(())
    }

    /// Whether there is nothing to place
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
            && self.random_images.is_empty()
            && self.disposable_random_images.is_empty()
    }

    /// Validate fields that do not depend on the target document
    pub fn validate(&self) -> Result<()> {
        for (idx, image) in self.images.iter().enumerate() {
            let label = format!("images[{}]", idx);
            require_path(&image.path, &label, "path")?;
            validate_placement(&image.placement, &label)?;
        }

        for (idx, pool) in self.random_images.iter().enumerate() {
            let label = format!("random_images[{}]", idx);
            require_path(&pool.pool, &label, "path")?;
            validate_placement(&pool.placement, &label)?;
        }

        for (idx, pool) in self.disposable_random_images.iter().enumerate() {
            let label = format!("disposable_random_images[{}]", idx);
            require_path(&pool.pool, &label, "path")?;
            require_path(&pool.disposed_dir, &label, "disposed_path")?;
            validate_placement(&pool.placement, &label)?;
            if normalized(&pool.pool) == normalized(&pool.disposed_dir) {
                return Err(StampError::Config(format!(
                    "{}: disposed_path must differ from path",
                    label
                )));
            }
        }

        Ok(())
    }

    /// Check every concrete page index against the document's page count
    pub fn validate_pages(&self, page_count: usize) -> Result<()> {
        let targets = self
            .images
            .iter()
            .map(|i| ("images", &i.placement))
            .chain(self.random_images.iter().map(|p| ("random_images", &p.placement)))
            .chain(
                self.disposable_random_images
                    .iter()
                    .map(|p| ("disposable_random_images", &p.placement)),
            );

        for (section, placement) in targets {
            if let PageTarget::Index(index) = placement.page {
                if index >= page_count {
                    return Err(StampError::Config(format!(
                        "{}: page {} is out of range (document has {} pages)",
                        section, index, page_count
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Drop `.` components and fold `..` into the preceding directory,
/// without touching the filesystem
fn normalized(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

fn require_path(path: &Path, label: &str, field: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(StampError::Config(format!("{}: {} is empty", label, field)));
    }
    Ok(())
}

fn validate_placement(placement: &Placement, label: &str) -> Result<()> {
    if !(placement.scale.is_finite() && placement.scale > 0.0) {
        return Err(StampError::Config(format!(
            "{}: size must be a positive number, got {}",
            label, placement.scale
        )));
    }
    if !placement.x.is_finite() || !placement.y.is_finite() {
        return Err(StampError::Config(format!(
            "{}: x and y must be finite",
            label
        )));
    }
    Ok(())
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    // Pages are written either as a zero-based index or as the keyword "all"
    impl Serialize for PageTarget {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            match self {
                PageTarget::Index(index) => serializer.serialize_u64(*index as u64),
                PageTarget::All => serializer.serialize_str("all"),
            }
        }
    }

    impl<'de> Deserialize<'de> for PageTarget {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            use serde::de::{self, Visitor};
            use std::fmt;

            struct PageTargetVisitor;

            impl<'de> Visitor<'de> for PageTargetVisitor {
                type Value = PageTarget;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a zero-based page index or \"all\"")
                }

                fn visit_u64<E>(self, value: u64) -> std::result::Result<PageTarget, E>
                where
                    E: de::Error,
                {
                    usize::try_from(value)
                        .map(PageTarget::Index)
                        .map_err(|_| E::custom(format!("page index {} is too large", value)))
                }

                fn visit_i64<E>(self, value: i64) -> std::result::Result<PageTarget, E>
                where
                    E: de::Error,
                {
                    if value < 0 {
                        return Err(E::invalid_value(de::Unexpected::Signed(value), &self));
                    }
                    self.visit_u64(value as u64)
                }

                fn visit_str<E>(self, value: &str) -> std::result::Result<PageTarget, E>
                where
                    E: de::Error,
                {
                    if value.eq_ignore_ascii_case("all") {
                        Ok(PageTarget::All)
                    } else {
                        Err(E::invalid_value(de::Unexpected::Str(value), &self))
                    }
                }
            }

            deserializer.deserialize_any(PageTargetVisitor)
        }
    }
}
