//! Page collection management

use std::sync::{Mutex, MutexGuard};

use biolink_core::{
    normalize_slug, new_id, tree, ContentNode, EditorCursor, EditorView, Page, PageDefaults,
    PageSummary, VisitorView,
};
use biolink_store::{load_collection, save_collection, Storage, PAGES_KEY};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// All pages of one store.
///
/// Mutations take an internal lock around load, modify and save so two
/// requests in the same process cannot interleave and drop each other's
/// edits. Separate processes sharing a store are last-writer-wins.
pub struct PageDirectory<S> {
    storage: S,
    defaults: PageDefaults,
    lock: Mutex<()>,
}

impl<S: Storage> PageDirectory<S> {
    pub fn new(storage: S, defaults: PageDefaults) -> Self {
        Self {
            storage,
            defaults,
            lock: Mutex::new(()),
        }
    }

    /// Every page, in storage order
    pub fn pages(&self) -> Vec<Page> {
        load_collection(&self.storage, PAGES_KEY)
    }

    pub fn summaries(&self) -> Vec<PageSummary> {
        self.pages().iter().map(Page::summary).collect()
    }

    pub fn page_by_id(&self, id: &str) -> Result<Page> {
        self.pages()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("page {}", id)))
    }

    pub fn page_by_slug(&self, slug: &str) -> Result<Page> {
        self.pages()
            .into_iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| Error::NotFound(format!("page /{}", slug)))
    }

    /// Public view of the page at `slug`
    pub fn visitor_view(&self, slug: &str, now: DateTime<Utc>) -> Result<VisitorView> {
        Ok(VisitorView::of(&self.page_by_slug(slug)?, now))
    }

    pub fn editor_view(&self, page_id: &str, cursor: &EditorCursor) -> Result<EditorView> {
        Ok(EditorView::of(self.page_by_id(page_id)?, cursor)?)
    }

    /// Create a page with an empty tree and persist it.
    ///
    /// Fails without touching the collection when the name is blank, the
    /// slug normalizes to nothing, or another page already has the slug.
    pub fn create_page(&self, slug: &str, display_name: &str, now: DateTime<Utc>) -> Result<Page> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(Error::Validation("display name is required".to_string()));
        }
        let normalized = normalize_slug(slug);
        if normalized.is_empty() {
            return Err(Error::Validation(format!("'{}' is not a usable slug", slug)));
        }

        let _guard = self.lock();
        let mut pages = self.pages();
        ensure_slug_free(&pages, &normalized, None)?;

        let page = Page::new(new_id(), &normalized, display_name, &self.defaults, now);
        pages.push(page.clone());
        save_collection(&self.storage, PAGES_KEY, &pages)?;

        tracing::info!("created page {} at /{}", page.id, page.slug);
        Ok(page)
    }

    /// Full-replace upsert by id.
    ///
    /// The slug is normalized and must stay unique. Trees with repeated ids
    /// or children outside folders are rejected.
    pub fn update_page(&self, mut page: Page) -> Result<Page> {
        page.slug = normalize_slug(&page.slug);
        if page.slug.is_empty() {
            return Err(Error::Validation("slug cannot be empty".to_string()));
        }
        check_tree(&mut page.links)?;

        let _guard = self.lock();
        let mut pages = self.pages();
        ensure_slug_free(&pages, &page.slug, Some(&page.id))?;

        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(existing) => *existing = page.clone(),
            None => pages.push(page.clone()),
        }
        save_collection(&self.storage, PAGES_KEY, &pages)?;

        tracing::debug!("updated page {}", page.id);
        Ok(page)
    }

    /// Remove a page. Its testimonials are left where they are.
    pub fn delete_page(&self, id: &str) -> Result<()> {
        let _guard = self.lock();
        let mut pages = self.pages();
        let before = pages.len();
        pages.retain(|p| p.id != id);
        if pages.len() == before {
            return Err(Error::NotFound(format!("page {}", id)));
        }
        save_collection(&self.storage, PAGES_KEY, &pages)?;

        tracing::info!("deleted page {}", id);
        Ok(())
    }

    /// Run a sequence edit on the folder `cursor` points at and commit it
    pub fn edit_links<F>(&self, page_id: &str, cursor: &EditorCursor, edit: F) -> Result<Page>
    where
        F: FnOnce(Vec<ContentNode>) -> Vec<ContentNode>,
    {
        let _guard = self.lock();
        let mut pages = self.pages();
        let page = pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| Error::NotFound(format!("page {}", page_id)))?;

        let links = std::mem::take(&mut page.links);
        let mut links = cursor.apply(links, edit)?;
        check_tree(&mut links)?;
        page.links = links;
        let page = page.clone();
        save_collection(&self.storage, PAGES_KEY, &pages)?;

        tracing::debug!(
            "edited page {} in {}",
            page_id,
            cursor.current_folder().unwrap_or("top level")
        );
        Ok(page)
    }

    pub fn rename_slug(&self, page_id: &str, raw: &str) -> Result<Page> {
        let slug = normalize_slug(raw);
        if slug.is_empty() {
            return Err(Error::Validation(format!("'{}' is not a usable slug", raw)));
        }

        let _guard = self.lock();
        let mut pages = self.pages();
        ensure_slug_free(&pages, &slug, Some(page_id))?;
        let page = pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| Error::NotFound(format!("page {}", page_id)))?;
        page.slug = slug;
        let page = page.clone();
        save_collection(&self.storage, PAGES_KEY, &pages)?;

        tracing::info!("page {} moved to /{}", page.id, page.slug);
        Ok(page)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // the guarded value is (), nothing can be left half-written
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn check_tree(links: &mut [ContentNode]) -> Result<()> {
    tree::check_shape(links)?;
    let dups = tree::duplicate_ids(links);
    if !dups.is_empty() {
        return Err(Error::Validation(format!("duplicate item ids: {}", dups.join(", "))));
    }
    Ok(())
}

fn ensure_slug_free(pages: &[Page], slug: &str, except_id: Option<&str>) -> Result<()> {
    let taken = pages
        .iter()
        .any(|p| p.slug == slug && Some(p.id.as_str()) != except_id);
    if taken {
        return Err(Error::Validation(format!("slug '{}' is already taken", slug)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ReadOnly;
    use biolink_core::tree::{insert, move_node, Direction};
    use biolink_core::{NewNode, NodeKind, NodePatch};
    use biolink_store::MemoryStorage;

    fn directory() -> PageDirectory<MemoryStorage> {
        PageDirectory::new(MemoryStorage::new(), PageDefaults::default())
    }

    #[test]
    fn test_create_page() {
        let dir = directory();
        let page = dir.create_page("my-site", "Test", Utc::now()).unwrap();

        assert_eq!(page.slug, "my-site");
        assert!(page.links.is_empty());
        assert!(!page.id.is_empty());
        assert_eq!(dir.page_by_id(&page.id).unwrap(), page);
    }

    #[test]
    fn test_ids_are_unique() {
        let dir = directory();
        let a = dir.create_page("a", "A", Utc::now()).unwrap();
        let b = dir.create_page("b", "B", Utc::now()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_colliding_slug_rejected() {
        let dir = directory();
        dir.create_page("my-site", "Test", Utc::now()).unwrap();

        let err = dir.create_page("My Site!", "Other", Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(dir.pages().len(), 1);
    }

    #[test]
    fn test_create_requires_name_and_slug() {
        let dir = directory();
        assert!(matches!(dir.create_page("ok", "  ", Utc::now()), Err(Error::Validation(_))));
        assert!(matches!(dir.create_page("???", "Name", Utc::now()), Err(Error::Validation(_))));
        assert!(dir.pages().is_empty());
    }

    #[test]
    fn test_create_uses_defaults() {
        let defaults = PageDefaults {
            bio: "Studio".to_string(),
            whatsapp_number: Some("0812".to_string()),
            ..PageDefaults::default()
        };
        let dir = PageDirectory::new(MemoryStorage::new(), defaults);
        let page = dir.create_page("studio", "Studio", Utc::now()).unwrap();
        assert_eq!(page.bio, "Studio");
        assert_eq!(page.whatsapp_link().as_deref(), Some("https://wa.me/0812"));
    }

    #[test]
    fn test_lookup_misses() {
        let dir = directory();
        assert!(matches!(dir.page_by_id("nope"), Err(Error::NotFound(_))));
        assert!(matches!(dir.page_by_slug("nope"), Err(Error::NotFound(_))));
        assert!(matches!(dir.visitor_view("nope", Utc::now()), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_update_page_replaces() {
        let dir = directory();
        let mut page = dir.create_page("site", "Site", Utc::now()).unwrap();
        page.bio = "New bio".to_string();
        page.hero_text = Some("Download".to_string());
        dir.update_page(page.clone()).unwrap();

        let stored = dir.page_by_id(&page.id).unwrap();
        assert_eq!(stored.bio, "New bio");
        assert_eq!(stored.hero_text.as_deref(), Some("Download"));
        assert_eq!(dir.pages().len(), 1);
    }

    #[test]
    fn test_update_rechecks_slug() {
        let dir = directory();
        dir.create_page("taken", "A", Utc::now()).unwrap();
        let mut page = dir.create_page("mine", "B", Utc::now()).unwrap();

        page.slug = "Taken".to_string();
        assert!(matches!(dir.update_page(page.clone()), Err(Error::Validation(_))));

        // keeping its own slug is fine
        page.slug = "mine".to_string();
        assert!(dir.update_page(page).is_ok());
    }

    #[test]
    fn test_update_rejects_duplicate_ids() {
        let dir = directory();
        let mut page = dir.create_page("site", "Site", Utc::now()).unwrap();
        page.links = vec![
            ContentNode::new("x", "One", NodeKind::Header),
            ContentNode::new("x", "Two", NodeKind::Header),
        ];
        assert!(matches!(dir.update_page(page), Err(Error::Validation(_))));
    }

    #[test]
    fn test_update_rejects_children_outside_folders() {
        let dir = directory();
        let page = dir.create_page("shop", "Shop", Utc::now()).unwrap();
        let mut body = serde_json::to_value(&page).unwrap();
        body["links"] = serde_json::json!([{
            "id": "l", "type": "link", "title": "Menu", "url": "https://menu.example",
            "children": [{ "id": "secret", "type": "link", "title": "S", "isActive": false }]
        }]);
        let replaced: Page = serde_json::from_value(body).unwrap();

        assert!(matches!(dir.update_page(replaced), Err(Error::Validation(_))));
        assert!(dir.page_by_id(&page.id).unwrap().links.is_empty());
    }

    #[test]
    fn test_update_fills_missing_folder_children() {
        let dir = directory();
        let mut page = dir.create_page("trip", "Trip", Utc::now()).unwrap();
        let mut folder = ContentNode::new("f", "Day 1", NodeKind::Folder);
        folder.children = None;
        page.links = vec![folder];

        let stored = dir.update_page(page).unwrap();
        assert_eq!(stored.links[0].children, Some(vec![]));
    }

    #[test]
    fn test_edit_links_rejects_repeated_ids() {
        let dir = directory();
        let page = dir.create_page("site", "Site", Utc::now()).unwrap();
        let root = EditorCursor::root();
        let folder = ContentNode::new("f", "F", NodeKind::Folder);
        let link = ContentNode::new("l", "L", NodeKind::Link);
        dir.edit_links(&page.id, &root, |seq| insert(insert(seq, folder), link))
            .unwrap();

        let copy = vec![ContentNode::new("l", "Again", NodeKind::Link)];
        let err = dir
            .edit_links(&page.id, &root, |seq| {
                tree::update_by_id(seq, "f", &NodePatch::children(copy))
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let stored = dir.page_by_id(&page.id).unwrap();
        assert!(tree::duplicate_ids(&stored.links).is_empty());
        assert!(stored.links[0].children().is_empty());
    }

    #[test]
    fn test_created_at_survives_reload() {
        let dir = directory();
        let now = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let page = dir.create_page("site", "Site", now).unwrap();

        assert_eq!(page.created_at.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(dir.page_by_id(&page.id).unwrap(), page);
    }

    #[test]
    fn test_rename_slug() {
        let dir = directory();
        dir.create_page("other", "Other", Utc::now()).unwrap();
        let page = dir.create_page("old", "Old", Utc::now()).unwrap();

        let renamed = dir.rename_slug(&page.id, "New Name").unwrap();
        assert_eq!(renamed.slug, "new-name");
        assert!(dir.page_by_slug("new-name").is_ok());
        assert!(dir.page_by_slug("old").is_err());

        assert!(matches!(dir.rename_slug(&page.id, "other"), Err(Error::Validation(_))));
        assert!(matches!(dir.rename_slug("ghost", "free"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete_page() {
        let dir = directory();
        let page = dir.create_page("gone", "Gone", Utc::now()).unwrap();
        dir.create_page("stays", "Stays", Utc::now()).unwrap();

        dir.delete_page(&page.id).unwrap();
        assert_eq!(dir.pages().len(), 1);
        assert!(matches!(dir.delete_page(&page.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_folder_with_visible_child() {
        let dir = directory();
        let page = dir.create_page("trip", "Trip", Utc::now()).unwrap();
        let root = EditorCursor::root();

        let folder = NewNode::new(NodeKind::Folder, "Day 1").build("day1").unwrap();
        let page = dir.edit_links(&page.id, &root, |seq| insert(seq, folder)).unwrap();

        let cursor = EditorCursor::locate(&page.links, "day1").unwrap();
        let photo = NewNode::link("Photo", "example.com/photo").build("photo").unwrap();
        dir.edit_links(&page.id, &cursor, |seq| insert(seq, photo)).unwrap();

        let view = dir.visitor_view("trip", Utc::now()).unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].title, "Day 1");
        let children = view.items[0].children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].title, "Photo");
        assert_eq!(children[0].url, "https://example.com/photo");
    }

    #[test]
    fn test_edit_links_commits_each_step() {
        let dir = directory();
        let page = dir.create_page("site", "Site", Utc::now()).unwrap();
        let root = EditorCursor::root();

        for id in ["a", "b"] {
            let node = ContentNode::new(id, id, NodeKind::Header);
            dir.edit_links(&page.id, &root, |seq| insert(seq, node)).unwrap();
        }
        dir.edit_links(&page.id, &root, |seq| move_node(seq, 1, Direction::Up))
            .unwrap();
        dir.edit_links(&page.id, &root, |seq| {
            tree::update_by_id(seq, "a", &NodePatch::active(false))
        })
        .unwrap();

        let stored = dir.page_by_id(&page.id).unwrap();
        let ids: Vec<&str> = stored.links.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert!(!stored.links[1].is_active);
    }

    #[test]
    fn test_edit_links_unknown_page_or_folder() {
        let dir = directory();
        let page = dir.create_page("site", "Site", Utc::now()).unwrap();
        let root = EditorCursor::root();
        assert!(matches!(dir.edit_links("ghost", &root, |s| s), Err(Error::NotFound(_))));

        let folder = ContentNode::new("f", "F", NodeKind::Folder);
        let page = dir.edit_links(&page.id, &root, |seq| insert(seq, folder)).unwrap();
        let cursor = EditorCursor::locate(&page.links, "f").unwrap();
        dir.edit_links(&page.id, &root, |seq| tree::delete_by_id(seq, "f"))
            .unwrap();
        assert!(matches!(dir.edit_links(&page.id, &cursor, |s| s), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_summaries() {
        let dir = directory();
        let page = dir.create_page("site", "Site", Utc::now()).unwrap();
        let node = ContentNode::new("h", "Hi", NodeKind::Header);
        dir.edit_links(&page.id, &EditorCursor::root(), |seq| insert(seq, node))
            .unwrap();

        let summaries = dir.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].slug, "site");
        assert_eq!(summaries[0].item_count, 1);
    }

    #[test]
    fn test_write_failure_surfaces() {
        let dir = PageDirectory::new(ReadOnly, PageDefaults::default());
        assert!(matches!(dir.create_page("site", "Site", Utc::now()), Err(Error::Storage(_))));
    }

    #[test]
    fn test_corrupt_store_reads_empty() {
        let storage = MemoryStorage::new();
        storage.write(PAGES_KEY, "oops").unwrap();
        let dir = PageDirectory::new(storage, PageDefaults::default());
        assert!(dir.pages().is_empty());
        assert!(dir.create_page("fresh", "Fresh", Utc::now()).is_ok());
    }
}
