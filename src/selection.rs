use crate::catalog::Catalog;

/// Which intervals the next exam draws from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSelection {
    ids: Vec<u32>,
}

impl IntervalSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only ids that exist in `catalog`, without duplicates.
    pub fn from_ids(catalog: &Catalog, ids: &[u32]) -> Self {
        let mut selection = Self::new();
        for id in ids {
            if catalog.get(*id).is_some() && !selection.ids.contains(id) {
                selection.ids.push(*id);
            }
        }
        selection
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Adds `id` if absent, removes it otherwise. The last selected id
    /// cannot be removed this way.
    pub fn toggle(&mut self, id: u32) {
        if let Some(pos) = self.ids.iter().position(|x| *x == id) {
            if self.ids.len() <= 1 {
                return;
            }
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    pub fn select_all(&mut self, catalog: &Catalog) {
        self.ids = catalog.ids();
    }

    pub fn select_none(&mut self) {
        self.ids.clear();
    }
}
