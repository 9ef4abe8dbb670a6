//! Application state for the web service

use std::sync::Arc;

use biolink_config::Config;
use biolink_core::{EditorCursor, PageDefaults};
use biolink_gemini::{CopyClient, CopySuggester};
use biolink_pages::{PageDirectory, TestimonialBook};
use biolink_store::{FileStorage, MemoryStorage, Storage};

pub type SharedStorage = Arc<dyn Storage>;

pub struct AppState {
    pub directory: PageDirectory<SharedStorage>,
    pub testimonials: TestimonialBook<SharedStorage>,
    pub copy: Arc<dyn CopySuggester>,
}

impl AppState {
    pub fn new(storage: SharedStorage, defaults: PageDefaults, copy: Arc<dyn CopySuggester>) -> Self {
        Self {
            directory: PageDirectory::new(storage.clone(), defaults),
            testimonials: TestimonialBook::new(storage),
            copy,
        }
    }

    /// File storage under the configured data dir and a live copy client
    pub fn from_config(config: &Config) -> biolink_store::Result<Self> {
        let storage = FileStorage::open(&config.storage.data_dir)?;
        Ok(Self::new(
            Arc::new(storage),
            config.defaults.clone(),
            Arc::new(CopyClient::from_config(&config.copy)),
        ))
    }

    /// Throwaway state kept in memory
    pub fn in_memory(copy: Arc<dyn CopySuggester>) -> Self {
        Self::new(Arc::new(MemoryStorage::new()), PageDefaults::default(), copy)
    }

    /// Cursor for `?folder=<id>` on a page, the top level when absent
    pub fn cursor(&self, page_id: &str, folder: Option<&str>) -> biolink_pages::Result<EditorCursor> {
        match folder.filter(|f| !f.is_empty()) {
            None => Ok(EditorCursor::root()),
            Some(folder) => {
                let page = self.directory.page_by_id(page_id)?;
                Ok(EditorCursor::locate(&page.links, folder)?)
            }
        }
    }
}
