// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tracing::trace;

use crate::{
    ast::CompiledTemplate,
    error::MappingError,
    parser::{Parser, PlaceholderPattern},
};

use super::Template;

type CacheKey = (PlaceholderPattern, String);

/// Memoizes template compilation. Shared by reference between engines;
/// a compiled template never changes once stored.
#[derive(Default)]
pub struct TemplateCache {
    entries: RwLock<HashMap<CacheKey, Arc<CompiledTemplate>>>,
}

impl TemplateCache {
    pub fn new() -> TemplateCache {
        TemplateCache::default()
    }

    pub fn get_or_compile(
        &self,
        pattern: PlaceholderPattern,
        template: &Template,
    ) -> Result<Arc<CompiledTemplate>, MappingError> {
        let key = (pattern, template.cache_key());
        let cached = self.read().get(&key).cloned();
        if let Some(compiled) = cached {
            trace!(%pattern, "template cache hit");
            return Ok(compiled);
        }

        let compiled = Arc::new(template.compile(&Parser::new(pattern))?);
        // Another thread may have compiled the same template meanwhile; keep the first.
        let compiled = self.write().entry(key).or_insert(compiled).clone();
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Arc<CompiledTemplate>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Arc<CompiledTemplate>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
