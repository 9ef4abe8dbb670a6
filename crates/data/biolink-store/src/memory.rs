//! In-process storage for tests and throwaway servers

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{Error, Result, Storage};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> Error {
    Error::Io(std::io::Error::other("memory storage lock poisoned"))
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents.get(key).cloned())
    }

    fn write(&self, key: &str, document: &str) -> Result<()> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        documents.insert(key.to_string(), document.to_string());
        Ok(())
    }
}
