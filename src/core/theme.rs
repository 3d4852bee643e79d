//! Light / dark theme state.
//!
//! One [`ThemeStore`] owns the mode.  It is loaded once from a
//! [`KeyValueStore`], only changes through [`ThemeStore::toggle`], persists
//! on every change and notifies subscribers.  Read failures and unknown
//! values fall back to dark; write failures are logged and swallowed.

#[cfg(test)]
use std::collections::HashMap;

use super::error::StoreError;
use super::scope::Liveness;

/// Key under which the mode is persisted.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    /// Anything other than `"light"` reads as dark.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim() {
            "light" => ThemeMode::Light,
            _ => ThemeMode::Dark,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

// ───────────────────────────────────────── persistence ───────

/// "Read/write a named value" is all the engine asks of persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Volatile store for tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ───────────────────────────────────────── store ─────────────

type Listener = Box<dyn FnMut(ThemeMode)>;

pub struct ThemeStore<S: KeyValueStore> {
    mode: ThemeMode,
    backend: S,
    listeners: Vec<(Liveness, Listener)>,
}

impl<S: KeyValueStore> std::fmt::Debug for ThemeStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("mode", &self.mode)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: KeyValueStore> ThemeStore<S> {
    /// Read the persisted mode, defaulting to dark.
    pub fn load(backend: S) -> Self {
        let mode = match backend.get(THEME_KEY) {
            Ok(Some(raw)) => {
                let mode = ThemeMode::parse_or_default(&raw);
                if mode.as_str() != raw.trim() {
                    tracing::debug!("unrecognised theme value {raw:?}, using dark");
                }
                mode
            }
            Ok(None) => ThemeMode::Dark,
            Err(err) => {
                tracing::warn!("could not read theme, using dark: {err}");
                ThemeMode::Dark
            }
        };
        tracing::debug!(theme = mode.as_str(), "theme loaded");
        Self {
            mode,
            backend,
            listeners: Vec::new(),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Flip the mode, persist it, notify subscribers and return the new mode.
    pub fn toggle(&mut self) -> ThemeMode {
        self.mode = self.mode.flipped();
        if let Err(err) = self.backend.set(THEME_KEY, self.mode.as_str()) {
            tracing::warn!("could not persist theme: {err}");
        }
        let mode = self.mode;
        self.listeners.retain(|(alive, _)| alive.is_alive());
        for (_, listener) in &mut self.listeners {
            listener(mode);
        }
        mode
    }

    /// Be told about every future change until `liveness` drops.
    pub fn subscribe(&mut self, liveness: Liveness, listener: impl FnMut(ThemeMode) + 'static) {
        self.listeners.push((liveness, Box::new(listener)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scope::SectionScope;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disk on fire".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk on fire".into()))
        }
    }

    #[test]
    fn defaults_to_dark() {
        assert_eq!(ThemeStore::load(MemoryStore::new()).mode(), ThemeMode::Dark);
        assert_eq!(
            ThemeStore::load(MemoryStore::new().with(THEME_KEY, "sepia")).mode(),
            ThemeMode::Dark
        );
        assert_eq!(ThemeStore::load(BrokenStore).mode(), ThemeMode::Dark);
    }

    #[test]
    fn loads_light() {
        let store = ThemeStore::load(MemoryStore::new().with(THEME_KEY, "light"));
        assert_eq!(store.mode(), ThemeMode::Light);
    }

    #[test]
    fn toggle_twice_round_trips_and_persists() {
        let mut store = ThemeStore::load(MemoryStore::new());
        let original = store.mode();

        let first = store.toggle();
        assert_eq!(
            store.backend().get(THEME_KEY).expect("memory store").as_deref(),
            Some(first.as_str())
        );

        let second = store.toggle();
        assert_eq!(second, original);
        assert_eq!(
            store.backend().get(THEME_KEY).expect("memory store").as_deref(),
            Some(second.as_str())
        );
    }

    #[test]
    fn toggle_survives_write_failure() {
        let mut store = ThemeStore::load(BrokenStore);
        assert_eq!(store.toggle(), ThemeMode::Light);
    }

    #[test]
    fn subscribers_hear_changes_until_torn_down() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let scope = SectionScope::new("nav");
        let mut store = ThemeStore::load(MemoryStore::new());
        {
            let seen = Rc::clone(&seen);
            store.subscribe(scope.liveness(), move |mode| seen.borrow_mut().push(mode));
        }
        store.toggle();
        scope.teardown();
        store.toggle();
        assert_eq!(*seen.borrow(), vec![ThemeMode::Light]);
    }
}
