// ImageFolder — the candidate list of source images
//
// Scans a directory once for files whose extension matches a filter:
//
//   root/
//     input_0.jpg
//     input_1.JPEG
//     nested/             (only with `.recursive(true)`)
//       input_2.jpg
//
// Paths are sorted so the candidate order (and therefore seeded sampling)
// does not depend on directory iteration order.
//
// USAGE:
//
//   let folder = ImageFolder::new("data/photos")
//       .extensions(&["jpg", "jpeg"])
//       .build()?;
//   println!("{} candidates", folder.len());

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};

/// Extensions accepted when none are configured (case-insensitive).
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

// ImageFolderBuilder

/// Builder for [`ImageFolder`].
#[derive(Debug, Clone)]
pub struct ImageFolderBuilder {
    root: PathBuf,
    extensions: Vec<String>,
    recursive: bool,
}

impl ImageFolderBuilder {
    /// Create a builder rooted at the given directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        ImageFolderBuilder {
            root: root.as_ref().to_path_buf(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            recursive: false,
        }
    }

    /// Replace the extension filter. A leading dot is ignored.
    pub fn extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Descend into subdirectories.
    pub fn recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }

    /// Scan the directory and build the candidate list.
    pub fn build(self) -> Result<ImageFolder> {
        ImageFolder::scan(self.root, &self.extensions, self.recursive)
    }
}

// ImageFolder

/// An ordered, read-only list of candidate source images.
#[derive(Debug, Clone)]
pub struct ImageFolder {
    root: PathBuf,
    paths: Vec<PathBuf>,
}

impl ImageFolder {
    /// Convenience entry-point: `ImageFolder::new(root)` returns a builder.
    pub fn new<P: AsRef<Path>>(root: P) -> ImageFolderBuilder {
        ImageFolderBuilder::new(root)
    }

    /// A candidate list from explicit paths (no filesystem access).
    pub fn from_paths<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Result<Self> {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(Error::NoImages(PathBuf::new()));
        }
        Ok(Self {
            root: PathBuf::new(),
            paths,
        })
    }

    fn scan(root: PathBuf, extensions: &[String], recursive: bool) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }

        let mut paths = Vec::new();
        Self::collect_images(&root, extensions, recursive, &mut paths)?;
        paths.sort();

        if paths.is_empty() {
            return Err(Error::NoImages(root));
        }
        info!(root = %root.display(), count = paths.len(), "found candidate images");
        Ok(Self { root, paths })
    }

    fn collect_images(
        dir: &Path,
        extensions: &[String],
        recursive: bool,
        out: &mut Vec<PathBuf>,
    ) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if recursive {
                    Self::collect_images(&path, extensions, recursive, out)?;
                }
            } else if has_extension(&path, extensions) {
                out.push(path);
            }
        }
        Ok(())
    }

    /// The scanned directory (empty for [`ImageFolder::from_paths`]).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Get the file path of the i-th candidate.
    pub fn path_of(&self, index: usize) -> &Path {
        &self.paths[index]
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}
