//! Loader extensions
//!
//! Extra behaviour is attached by composition: an [`ExtendedLoader`] owns
//! the loader next to an extension value, and extension code receives the
//! loader explicitly instead of being grafted onto it.

use std::ops::{Deref, DerefMut};

use crate::module::loader::loader::ModuleLoader;

/// A module loader paired with caller-defined extension state
pub struct ExtendedLoader<T, E> {
    loader: ModuleLoader<T>,
    extension: E,
}

impl<T, E> ExtendedLoader<T, E> {
    pub fn new(loader: ModuleLoader<T>, extension: E) -> Self {
        Self { loader, extension }
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }

    pub fn extension_mut(&mut self) -> &mut E {
        &mut self.extension
    }

    /// Run extension code with the loader as its receiver
    pub fn with<R>(&mut self, f: impl FnOnce(&mut E, &mut ModuleLoader<T>) -> R) -> R {
        f(&mut self.extension, &mut self.loader)
    }

    /// Split back into the loader and the extension
    pub fn into_parts(self) -> (ModuleLoader<T>, E) {
        (self.loader, self.extension)
    }
}

impl<T, E> Deref for ExtendedLoader<T, E> {
    type Target = ModuleLoader<T>;

    fn deref(&self) -> &Self::Target {
        &self.loader
    }
}

impl<T, E> DerefMut for ExtendedLoader<T, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.loader
    }
}
