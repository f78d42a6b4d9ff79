//! # Repository Manifest
//!
//! The manifest is the ordered list of `(url, path)` pairs that make up the
//! device tree. A built-in manifest is compiled into the binary; a YAML file
//! with the same shape can replace it:
//!
//! ```yaml
//! - url: https://github.com/LineageOS/android_device_xiaomi_alioth
//!   path: device/xiaomi/alioth
//! - url: https://github.com/LineageOS/android_kernel_xiaomi_sm8250
//!   path: kernel/xiaomi/sm8250
//! ```
//!
//! Paths are relative to the target root given on the command line. Every
//! manifest, built-in or loaded, passes the same validation before it is
//! handed to the synchronizer.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// The repositories synchronized when no manifest file is given.
const BUILTIN: &[(&str, &str)] = &[
    (
        "https://github.com/LineageOS/android_device_xiaomi_alioth",
        "device/xiaomi/alioth",
    ),
    (
        "https://github.com/LineageOS/android_device_xiaomi_sm8250-common",
        "device/xiaomi/sm8250-common",
    ),
    (
        "https://github.com/LineageOS/android_kernel_xiaomi_sm8250",
        "kernel/xiaomi/sm8250",
    ),
    (
        "https://github.com/TheMuppets/proprietary_vendor_xiaomi_alioth",
        "vendor/xiaomi/alioth",
    ),
    (
        "https://github.com/TheMuppets/proprietary_vendor_xiaomi_sm8250-common",
        "vendor/xiaomi/sm8250-common",
    ),
    (
        "https://github.com/LineageOS/android_hardware_xiaomi",
        "hardware/xiaomi",
    ),
];

/// One repository to synchronize.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Where to clone from.
    pub url: String,
    /// Destination, relative to the target root.
    pub path: PathBuf,
}

impl ManifestEntry {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }

    /// Absolute (or root-relative) location of this entry's checkout.
    pub fn destination(&self, root: &Path) -> PathBuf {
        root.join(&self.path)
    }

    fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Manifest {
                message: format!("entry for '{}' has an empty url", self.path.display()),
            });
        }
        if self.url.starts_with('-') {
            return Err(Error::Manifest {
                message: format!("url '{}' must not start with '-'", self.url),
            });
        }
        if self.path.as_os_str().is_empty() {
            return Err(Error::Manifest {
                message: format!("entry for '{}' has an empty path", self.url),
            });
        }
        for component in self.path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => {
                    return Err(Error::Manifest {
                        message: format!(
                            "path '{}' must not contain '..'",
                            self.path.display()
                        ),
                    })
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::Manifest {
                        message: format!("path '{}' must be relative", self.path.display()),
                    })
                }
            }
        }
        Ok(())
    }
}

/// An ordered, validated list of manifest entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build a manifest, rejecting invalid entries and duplicate destinations.
    pub fn new(entries: Vec<ManifestEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Manifest {
                message: "manifest contains no repositories".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            entry.validate()?;
            let normalized: PathBuf = entry
                .path
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            if !seen.insert(normalized) {
                return Err(Error::Manifest {
                    message: format!(
                        "destination '{}' is listed more than once",
                        entry.path.display()
                    ),
                });
            }
        }

        Ok(Self { entries })
    }

    /// The manifest compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(url, path)| ManifestEntry::new(*url, *path))
                .collect(),
        }
    }

    /// Parse a YAML manifest.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        let entries: Vec<ManifestEntry> = serde_yaml::from_str(yaml_content)?;
        Self::new(entries)
    }

    /// Load and parse a YAML manifest file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
