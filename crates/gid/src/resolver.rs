// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! View resolution.
//!
//! This module provides the [`ViewResolver`] trait and implementations
//! for locating views by name.
//!
//! # Resolver Implementations
//!
//! - [`FileSystemViews`]: Loads `<views_dir>/<name>.<ext>` text views,
//!   keeping parsed views in an LRU cache
//! - [`MemoryViews`]: Views registered in memory (closures or text)
//!
//! # Custom Resolvers
//!
//! Implement [`ViewResolver`] for custom loading strategies (embedded
//! assets, database, etc.).

use crate::error::Result;
use crate::view::{TextView, View};
use lru::LruCache;
use std::collections::HashMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

/// Trait for locating views by name.
///
/// Implementations are shared between requests and must be thread-safe.
pub trait ViewResolver: Send + Sync + 'static {
    /// Looks up a view.
    ///
    /// Returns `Ok(None)` when no view has this name; errors are reserved
    /// for views that exist but cannot be loaded.
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn View>>>;
}

/// Memory-based view resolver.
#[derive(Clone, Default)]
pub struct MemoryViews {
    views: Arc<Mutex<HashMap<String, Arc<dyn View>>>>,
}

impl MemoryViews {
    /// Create a new, empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Helper to access views with a mutable reference.
    fn with_views_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HashMap<String, Arc<dyn View>>) -> R,
    {
        let mut views = self.views.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut views)
    }

    /// Adds a view.
    pub fn add(&self, name: &str, view: Arc<dyn View>) {
        self.with_views_mut(|views| {
            views.insert(name.to_string(), view);
        });
    }

    /// Adds a closure as a view.
    pub fn add_fn<F>(&self, name: &str, view: F)
    where
        F: Fn(&mut crate::TemplateEngine) -> Result<String> + Send + Sync + 'static,
    {
        self.add(name, Arc::new(view));
    }

    /// Parses `source` and adds it as a text view.
    pub fn add_text(&self, name: &str, source: &str) -> Result<()> {
        let view = TextView::parse(name, source)?;
        self.add(name, Arc::new(view));
        Ok(())
    }

    /// Removes a view.
    pub fn remove(&self, name: &str) {
        self.with_views_mut(|views| {
            views.remove(name);
        });
    }

    /// Clear all views.
    pub fn clear(&self) {
        self.with_views_mut(HashMap::clear);
    }
}

impl ViewResolver for MemoryViews {
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn View>>> {
        Ok(self.with_views_mut(|views| views.get(name).cloned()))
    }
}

#[derive(Clone)]
struct CachedView {
    modified: Option<SystemTime>,
    view: Arc<TextView>,
}

/// Filesystem-based view resolver.
///
/// Resolves `name` to `<root>/<name>.<extension>`. Names containing `..`
/// or absolute paths never resolve. Parsed views are cached and reloaded
/// when the file's modification time changes.
///
/// # Examples
///
/// ```rust,no_run
/// use gid::FileSystemViews;
///
/// let views = FileSystemViews::new("./views").with_extension("phtml");
/// ```
pub struct FileSystemViews {
    root: PathBuf,
    extension: String,
    cache: Mutex<LruCache<String, CachedView>>,
}

impl FileSystemViews {
    /// Default number of parsed views kept in memory.
    pub const DEFAULT_CACHE_CAPACITY: usize = 64;

    /// Creates a resolver rooted at `root` using the `html` extension.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_capacity(root, Self::DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a resolver with a custom cache capacity (minimum 1).
    pub fn with_capacity<P: AsRef<Path>>(root: P, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            root: root.as_ref().to_path_buf(),
            extension: "html".to_string(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Sets the file extension appended to view names.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// The views directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a view name to its file path, rejecting names that escape the root.
    pub fn view_path(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe || name.trim().is_empty() {
            return None;
        }

        let file = if self.extension.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", name, self.extension)
        };
        Some(self.root.join(file))
    }

    /// Number of parsed views currently cached.
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl ViewResolver for FileSystemViews {
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn View>>> {
        let Some(path) = self.view_path(name) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }

        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.get(name) {
                if cached.modified == modified {
                    let view: Arc<dyn View> = cached.view.clone();
                    return Ok(Some(view));
                }
            }
        }

        tracing::debug!(view = name, path = %path.display(), "loading view");
        let source = fs::read_to_string(&path)?;
        let parsed = Arc::new(TextView::parse(name, &source)?);

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(
            name.to_string(),
            CachedView {
                modified,
                view: parsed.clone(),
            },
        );

        let view: Arc<dyn View> = parsed;
        Ok(Some(view))
    }
}
