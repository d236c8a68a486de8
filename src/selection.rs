//! Selected and hovered shop, shared between event handlers and the host UI.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Point-in-time copy of the selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub selected: Option<String>,
    pub hovered: Option<String>,
}

impl SelectionSnapshot {
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered.as_deref() == Some(id)
    }
}

/// Notification sent to subscribers when a field changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Selected(Option<String>),
    Hovered(Option<String>),
}

type Listener = Box<dyn Fn(&SelectionEvent) + Send + Sync>;

#[derive(Default)]
struct Inner {
    state: Mutex<SelectionSnapshot>,
    listeners: Mutex<Vec<Listener>>,
}

/// Observable holder of `selected`/`hovered` shop ids.
///
/// Cloning shares the same state. Writes are last-write-wins and only
/// notify subscribers when the value actually changes. Listeners run on
/// the writer's thread and must not subscribe from inside the callback.
#[derive(Clone, Default)]
pub struct SelectionStore {
    inner: Arc<Inner>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.inner.state.lock().clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.inner.state.lock().selected.clone()
    }

    pub fn hovered(&self) -> Option<String> {
        self.inner.state.lock().hovered.clone()
    }

    /// Set the selected id. Returns true if it changed.
    pub fn select(&self, id: Option<&str>) -> bool {
        let changed = {
            let mut state = self.inner.state.lock();
            if state.selected.as_deref() == id {
                false
            } else {
                state.selected = id.map(str::to_owned);
                true
            }
        };
        if changed {
            self.notify(&SelectionEvent::Selected(id.map(str::to_owned)));
        }
        changed
    }

    /// Set the hovered id. Returns true if it changed.
    pub fn hover(&self, id: Option<&str>) -> bool {
        let changed = {
            let mut state = self.inner.state.lock();
            if state.hovered.as_deref() == id {
                false
            } else {
                state.hovered = id.map(str::to_owned);
                true
            }
        };
        if changed {
            self.notify(&SelectionEvent::Hovered(id.map(str::to_owned)));
        }
        changed
    }

    /// Clear both fields, as on a data reload.
    pub fn reset(&self) {
        self.select(None);
        self.hover(None);
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&SelectionEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.lock().push(Box::new(listener));
    }

    fn notify(&self, event: &SelectionEvent) {
        for listener in self.inner.listeners.lock().iter() {
            listener(event);
        }
    }
}

impl fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionStore")
            .field("state", &*self.inner.state.lock())
            .field("listeners", &self.inner.listeners.lock().len())
            .finish()
    }
}
