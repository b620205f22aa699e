use std::collections::BTreeSet;

use parking_lot::RwLock;

pub const DARK_CLASS: &str = "dark";

/// Receives the visual side effect of the dark-mode flag.
///
/// `apply` must depend on `dark` alone so that replaying it after
/// rehydration never toggles anything twice.
pub trait ThemeSink: Send + Sync {
    fn apply(&self, dark: bool);
}

/// Class markers on the document root.
#[derive(Debug, Default)]
pub struct RootClasses {
    classes: RwLock<BTreeSet<String>>,
}

impl RootClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.read().contains(class)
    }

    pub fn list(&self) -> Vec<String> {
        self.classes.read().iter().cloned().collect()
    }
}

impl ThemeSink for RootClasses {
    fn apply(&self, dark: bool) {
        let mut classes = self.classes.write();
        if dark {
            classes.insert(DARK_CLASS.to_string());
        } else {
            classes.remove(DARK_CLASS);
        }
    }
}
