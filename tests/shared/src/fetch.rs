/*
 * Copyright (C) 2022-2025 by Christian Fischer
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

//! Downloads and caches the conformance test assets into a local directory,
//! so running the suite repeatedly doesn't re-fetch gigabytes of ROMs and
//! JSON fixtures from the network every time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where the cached test assets live, relative to the workspace root.
/// Overridable via the `GEMI_TEST_DATA` environment variable so CI can point
/// it at a pre-warmed cache directory.
pub fn cache_dir() -> PathBuf {
    match std::env::var_os("GEMI_TEST_DATA") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test-data"),
    }
}

/// A handle onto the cached test-data directory, with helpers to fetch and
/// extract archives into it on demand.
pub struct TestAssets {
    root: PathBuf,
}

impl TestAssets {
    pub fn new() -> io::Result<Self> {
        let root = cache_dir();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path `relative` resolves to inside the cache directory,
    /// downloading and unpacking `archive_url` into the cache first if that
    /// path doesn't exist yet.
    pub fn ensure_extracted(&self, archive_url: &str, relative: &Path) -> io::Result<PathBuf> {
        let target = self.root.join(relative);

        if !target.exists() {
            let bytes = self.download(archive_url)?;
            zip_extract::extract(io::Cursor::new(bytes), &self.root, true)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        }

        Ok(target)
    }

    /// Returns the path of a single file, downloading it from `url` into the
    /// cache first if it isn't already present.
    pub fn ensure_file(&self, url: &str, relative: &Path) -> io::Result<PathBuf> {
        let target = self.root.join(relative);

        if !target.exists() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }

            let bytes = self.download(url)?;
            fs::write(&target, bytes)?;
        }

        Ok(target)
    }

    fn download(&self, url: &str) -> io::Result<Vec<u8>> {
        let response = reqwest::blocking::get(url)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        response.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}
