//! Variant discovery for varmatrix-core

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{DiscoveryError, NamingError};
use crate::naming::{VariantId, VariantNaming};

/// Trait for enumerating the variants available to a project group.
pub trait VariantDiscovery {
    fn discover(&self) -> Result<Vec<VariantId>, DiscoveryError>;
}

/// Non-recursive scan of one configuration directory.
#[derive(Debug, Clone)]
pub struct DirDiscovery {
    dir: PathBuf,
    naming: VariantNaming,
    follow_symlinks: bool,
}

impl DirDiscovery {
    pub fn new(dir: impl Into<PathBuf>, naming: VariantNaming) -> Self {
        Self {
            dir: dir.into(),
            naming,
            follow_symlinks: true,
        }
    }

    /// Whether symlinked configuration files count as variants (default: yes).
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl VariantDiscovery for DirDiscovery {
    /// Returns variant numbers in ascending order.
    fn discover(&self) -> Result<Vec<VariantId>, DiscoveryError> {
        let mut found = Vec::new();

        let walker = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_symlinks);

        for entry in walker {
            let entry = entry.map_err(|source| DiscoveryError::Io {
                dir: self.dir.clone(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let lossy = entry.file_name().to_string_lossy();
            if !self.naming.matches_extension(&lossy) {
                continue;
            }

            let parsed = match entry.file_name().to_str() {
                Some(name) => self.naming.parse(name),
                None => Err(NamingError::Malformed {
                    name: lossy.into_owned(),
                    reason: "name is not valid UTF-8".to_string(),
                }),
            };

            match parsed {
                Ok(id) => found.push(id),
                Err(NamingError::NotAVariant { .. }) => continue,
                Err(source) => {
                    return Err(DiscoveryError::MalformedName {
                        path: entry.path().to_path_buf(),
                        source,
                    })
                }
            }
        }

        found.sort_unstable();
        Ok(found)
    }
}

/// Discover the variants in `dir` under `naming`.
pub fn discover(dir: &Path, naming: &VariantNaming) -> Result<Vec<VariantId>, DiscoveryError> {
    DirDiscovery::new(dir, naming.clone()).discover()
}
