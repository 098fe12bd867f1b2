/* Content-addressed string table shared by every enum */

use indexmap::IndexSet;

/* Index of the empty sentinel, shared by every enum's invalid constant */
pub const SENTINEL_INDEX: usize = 0;

/* Ordered set of unique strings. Index 0 is always the empty sentinel. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    entries: IndexSet<String>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    pub fn new() -> Self {
        let mut entries = IndexSet::new();
        entries.insert(String::new());
        Self { entries }
    }

    /* Index of `s`, appending it first if it has not been seen */
    pub fn intern_or_lookup(&mut self, s: &str) -> usize {
        if let Some(index) = self.entries.get_index_of(s) {
            return index;
        }
        let (index, _) = self.entries.insert_full(s.to_string());
        index
    }

    pub fn index_of(&self, s: &str) -> Option<usize> {
        self.entries.get_index_of(s)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get_index(index).map(String::as_str)
    }

    /* Entry count, sentinel included */
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_sentinel() {
        let table = StringTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(SENTINEL_INDEX), Some(""));
        assert!(!table.is_empty());
    }

    #[test]
    fn empty_string_resolves_to_sentinel() {
        let mut table = StringTable::new();
        assert_eq!(table.intern_or_lookup(""), SENTINEL_INDEX);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn assigns_indices_in_visit_order() {
        let mut table = StringTable::new();
        assert_eq!(table.intern_or_lookup("rgba8unorm"), 1);
        assert_eq!(table.intern_or_lookup("rgba8unorm-srgb"), 2);
        assert_eq!(table.intern_or_lookup("nearest"), 3);
        assert_eq!(table.to_vec(), vec!["", "rgba8unorm", "rgba8unorm-srgb", "nearest"]);
    }

    #[test]
    fn lookup_does_not_mutate() {
        let mut table = StringTable::new();
        let first = table.intern_or_lookup("auto");
        table.intern_or_lookup("other");
        let again = table.intern_or_lookup("auto");
        assert_eq!(first, again);
        assert_eq!(table.len(), 3);
        assert_eq!(table.index_of("auto"), Some(1));
        assert_eq!(table.index_of("missing"), None);
    }
}
