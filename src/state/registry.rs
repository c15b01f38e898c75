use std::collections::BTreeMap;

/// Anything stored in a [`Registry`]: identified by a decimal string id.
pub trait Record: Clone {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// Keyed store for courts and scoreboards, ordered by numeric id.
///
/// New ids are `max(existing) + 1`, so deleting a record never lets the next insert reuse
/// an id that is still referenced elsewhere.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: BTreeMap<u64, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: BTreeMap::new() }
    }
}

impl<T: Record> Registry<T> {
    /// Build from stored records. Records whose id is not a number, or repeats one already
    /// taken, get a fresh id; the returned flag says whether that happened.
    pub fn from_records(records: Vec<T>) -> (Self, bool) {
        let mut registry = Self::default();
        let mut orphans = Vec::new();

        for record in records {
            match record.id().trim().parse::<u64>() {
                Ok(key) if !registry.items.contains_key(&key) => {
                    registry.items.insert(key, record);
                }
                _ => orphans.push(record),
            }
        }

        let reassigned = !orphans.is_empty();
        for mut record in orphans {
            let key = registry.next_key();
            record.set_id(key.to_string());
            registry.items.insert(key, record);
        }
        (registry, reassigned)
    }

    fn next_key(&self) -> u64 {
        self.items.keys().next_back().map_or(1, |max| max + 1)
    }

    /// Insert a record built around the next free id.
    pub fn create(&mut self, build: impl FnOnce(String) -> T) -> &T {
        let key = self.next_key();
        self.items.entry(key).or_insert_with(|| build(key.to_string()))
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.get(&id.trim().parse().ok()?)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.get_mut(&id.trim().parse().ok()?)
    }

    pub fn delete(&mut self, id: &str) -> Option<T> {
        self.items.remove(&id.trim().parse().ok()?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn filter<'a>(&'a self, keep: impl Fn(&T) -> bool + 'a) -> impl Iterator<Item = &'a T> {
        self.items.values().filter(move |item| keep(item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: String,
        label: &'static str,
    }

    impl Record for Tag {
        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    fn tag(id: &str, label: &'static str) -> Tag {
        Tag { id: id.to_string(), label }
    }

    #[test]
    fn test_orders_by_numeric_id() {
        let (reg, reassigned) =
            Registry::from_records(vec![tag("10", "ten"), tag("2", "two"), tag("1", "one")]);
        assert!(!reassigned);
        let labels: Vec<_> = reg.iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["one", "two", "ten"]);
    }

    #[test]
    fn test_create_uses_max_plus_one_after_delete() {
        let (mut reg, _) = Registry::from_records(vec![tag("1", "a"), tag("2", "b"), tag("3", "c")]);
        assert_eq!(reg.delete("2").map(|t| t.label), Some("b"));
        let created = reg.create(|id| tag(&id, "d"));
        assert_eq!(created.id, "4");
        assert_eq!(reg.len(), 3);
        assert!(reg.find("2").is_none());
    }

    #[test]
    fn test_empty_registry_starts_at_one() {
        let mut reg: Registry<Tag> = Registry::default();
        assert!(reg.is_empty());
        let created = reg.create(|id| tag(&id, "first"));
        assert_eq!(created.id, "1");
        assert_eq!(reg.find("1").map(|t| t.label), Some("first"));
    }

    #[test]
    fn test_bad_and_duplicate_ids_are_reassigned() {
        let (reg, reassigned) = Registry::from_records(vec![
            tag("1", "a"),
            tag("court-x", "b"),
            tag("1", "c"),
        ]);
        assert!(reassigned);
        assert_eq!(reg.find("1").map(|t| t.label), Some("a"));
        assert_eq!(reg.find("2").map(|t| t.label), Some("b"));
        assert_eq!(reg.find("3").map(|t| t.label), Some("c"));
    }

    #[test]
    fn test_find_mut_and_filter() {
        let (mut reg, _) = Registry::from_records(vec![tag("1", "a"), tag("2", "b")]);
        if let Some(t) = reg.find_mut(" 2 ") {
            t.label = "z";
        }
        let zs: Vec<_> = reg.filter(|t| t.label == "z").map(|t| t.id.clone()).collect();
        assert_eq!(zs, vec!["2".to_string()]);
        assert!(reg.find("nope").is_none());
        assert!(reg.delete("nope").is_none());
    }
}
