use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::bookmark::key::{BookmarkKey, KeyError, Selection, encode};
use crate::bookmark::label::{DisplayMap, LabelSource};
use crate::bookmark::set::BookmarkSet;
use crate::store::json_store::JsonStore;

/// What the table area is currently showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Context {
    /// A table reached through the regular category/mode lists.
    Normal(Selection),
    /// A table reached through the starred list; `None` when the list is empty.
    Bookmarked(Option<BookmarkKey>),
}

/// Owns the starred set and decides what to show after star, unstar and picks.
///
/// Every transition returns the selection the UI should render next, or `None`
/// when the current table stays as it is.
pub struct StarController {
    context: Context,
    bookmarks: BookmarkSet,
    display: DisplayMap,
    store: Option<Arc<JsonStore>>,
    fallback: Selection,
    dirty: bool,
    notice: Option<String>,
}

impl StarController {
    /// `fallback` is shown when the last starred table is removed from the starred list.
    pub fn new(
        bookmarks: BookmarkSet,
        store: Option<Arc<JsonStore>>,
        fallback: Selection,
    ) -> Self {
        Self {
            context: Context::Normal(fallback.clone()),
            bookmarks,
            display: DisplayMap::default(),
            store,
            fallback,
            dirty: false,
            notice: None,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn bookmarks(&self) -> &BookmarkSet {
        &self.bookmarks
    }

    pub fn display_map(&self) -> &DisplayMap {
        &self.display
    }

    pub fn in_bookmark_mode(&self) -> bool {
        matches!(self.context, Context::Bookmarked(_))
    }

    /// True while the last save failed and the file lags behind memory.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn current_selection(&self) -> Option<Selection> {
        match &self.context {
            Context::Normal(selection) => Some(selection.clone()),
            Context::Bookmarked(Some(key)) => key.decode().ok(),
            Context::Bookmarked(None) => None,
        }
    }

    /// Index of the current bookmark in the display map.
    pub fn current_index(&self) -> Option<usize> {
        match &self.context {
            Context::Bookmarked(Some(key)) => self.display.position(key),
            _ => None,
        }
    }

    /// Show a table picked through the regular lists.
    pub fn show(&mut self, selection: Selection) {
        self.context = Context::Normal(selection);
    }

    pub fn enter_bookmarks<L>(&mut self, labels: &L) -> Option<Selection>
    where
        L: LabelSource + ?Sized,
    {
        self.display = DisplayMap::build(self.bookmarks.keys(), labels);
        self.select_first()
    }

    fn select_first(&mut self) -> Option<Selection> {
        match self.display.first() {
            Some(entry) => {
                self.context = Context::Bookmarked(Some(entry.key.clone()));
                Some(entry.selection.clone())
            }
            None => {
                self.context = Context::Bookmarked(None);
                None
            }
        }
    }

    pub fn pick(&mut self, label: &str) -> Option<Selection> {
        let index = self.display.iter().position(|e| e.label == label)?;
        self.pick_index(index)
    }

    pub fn pick_index(&mut self, index: usize) -> Option<Selection> {
        if !self.in_bookmark_mode() {
            return None;
        }
        let entry = self.display.get(index)?;
        self.context = Context::Bookmarked(Some(entry.key.clone()));
        Some(entry.selection.clone())
    }

    /// Next starred table in display order, wrapping around.
    pub fn next_bookmark(&mut self) -> Option<Selection> {
        if self.display.is_empty() || !self.in_bookmark_mode() {
            return None;
        }
        let next = self
            .current_index()
            .map_or(0, |idx| (idx + 1) % self.display.len());
        self.pick_index(next)
    }

    pub fn is_starred(&self, selection: &Selection) -> bool {
        encode(selection).is_ok_and(|key| self.bookmarks.contains(&key))
    }

    pub fn current_is_starred(&self) -> bool {
        match &self.context {
            Context::Normal(selection) => self.is_starred(selection),
            Context::Bookmarked(Some(key)) => self.bookmarks.contains(key),
            Context::Bookmarked(None) => false,
        }
    }

    /// Star the current table. Returns whether the set changed; starring from the
    /// starred list itself does nothing.
    pub fn star(&mut self) -> Result<bool, KeyError> {
        let Context::Normal(selection) = &self.context else {
            return Ok(false);
        };
        let key = encode(selection)?;
        let added = self.bookmarks.add(key.clone());
        if added {
            info!(%key, "starred");
        }
        if added || self.dirty {
            self.persist();
        }
        Ok(added)
    }

    /// Unstar the current table. From the starred list this moves on to the first
    /// remaining bookmark, or back to the fallback table when none remain.
    pub fn unstar<L>(&mut self, labels: &L) -> Result<Option<Selection>, KeyError>
    where
        L: LabelSource + ?Sized,
    {
        let key = match &self.context {
            Context::Normal(selection) => encode(selection)?,
            Context::Bookmarked(Some(key)) => key.clone(),
            Context::Bookmarked(None) => return Ok(None),
        };

        match self.bookmarks.remove(&key) {
            Ok(()) => {
                info!(%key, "unstarred");
                self.persist();
            }
            Err(err) => {
                debug!(%err, "unstar of a table that is not starred");
                if self.dirty {
                    self.persist();
                }
            }
        }

        if !self.in_bookmark_mode() {
            return Ok(None);
        }

        self.display = DisplayMap::build(self.bookmarks.keys(), labels);
        if self.display.is_empty() {
            self.context = Context::Normal(self.fallback.clone());
            return Ok(Some(self.fallback.clone()));
        }
        Ok(self.select_first())
    }

    /// Retry a failed save. Called on shutdown.
    pub fn flush(&mut self) {
        if self.dirty {
            self.persist();
        }
    }

    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.save_bookmarks(&self.bookmarks) {
            Ok(()) => {
                if self.dirty {
                    info!("bookmark file back in sync");
                }
                self.dirty = false;
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed to save bookmarks");
                self.dirty = true;
                self.notice = Some("Could not save starred tables; will retry".to_string());
            }
        }
    }
}
