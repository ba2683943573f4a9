/// Link store
/// Bidirectional adjacency between signed segment ids. Every link (u -> v)
/// is stored together with its reverse-complement twin (-v -> -u), and a
/// reverse view mirrors the forward view at all times:
///   v in forward[u]  <=>  u in reverse[v]
/// Adjacency lists are ordered and duplicate-free; the order carries no
/// meaning but stays stable within a run.

use std::collections::{HashMap, HashSet};

const NO_LINKS: &[i64] = &[];

#[derive(Clone, Debug, Default)]
pub struct LinkStore {
    forward: HashMap<i64, Vec<i64>>,
    reverse: HashMap<i64, Vec<i64>>,
}

impl LinkStore {
    pub fn new() -> Self {
        LinkStore {
            forward: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    /// Build a store from the forward map a codec produced. Twins that the
    /// file only stated in one direction are completed first, then the
    /// reverse view is derived. Running this on already-consistent input
    /// changes nothing.
    pub fn from_forward_map(mut forward: HashMap<i64, Vec<i64>>) -> Self {
        let stated: Vec<(i64, i64)> = forward
            .iter()
            .flat_map(|(start, ends)| ends.iter().map(move |end| (*start, *end)))
            .collect();
        for (start, end) in stated {
            let twins = forward.entry(-end).or_default();
            if !twins.contains(&-start) {
                twins.push(-start);
            }
        }

        let mut reverse: HashMap<i64, Vec<i64>> = HashMap::new();
        for (start, ends) in &forward {
            for end in ends {
                let entry = reverse.entry(*end).or_default();
                if !entry.contains(start) {
                    entry.push(*start);
                }
            }
        }
        LinkStore { forward, reverse }
    }

    fn insert(map: &mut HashMap<i64, Vec<i64>>, key: i64, value: i64) {
        let list = map.entry(key).or_default();
        if !list.contains(&value) {
            list.push(value);
        }
    }

    fn erase(map: &mut HashMap<i64, Vec<i64>>, key: i64, value: i64) {
        if let Some(list) = map.get_mut(&key) {
            list.retain(|x| *x != value);
            if list.is_empty() {
                map.remove(&key);
            }
        }
    }

    /// Add a link and its reverse-complement twin to both views. Adding an
    /// existing link is a no-op.
    pub fn add(&mut self, start: i64, end: i64) {
        Self::insert(&mut self.forward, start, end);
        Self::insert(&mut self.forward, -end, -start);
        Self::insert(&mut self.reverse, end, start);
        Self::insert(&mut self.reverse, -start, -end);
    }

    /// Remove a link and its reverse-complement twin from both views.
    pub fn remove(&mut self, start: i64, end: i64) {
        Self::erase(&mut self.forward, start, end);
        Self::erase(&mut self.forward, -end, -start);
        Self::erase(&mut self.reverse, end, start);
        Self::erase(&mut self.reverse, -start, -end);
    }

    /// Drop every link that touches either strand of any of the given
    /// positive segment ids, then drop emptied adjacency lists.
    pub fn remove_segments(&mut self, numbers: &HashSet<i64>) {
        for map in [&mut self.forward, &mut self.reverse] {
            map.retain(|key, _| !numbers.contains(&key.abs()));
            for list in map.values_mut() {
                list.retain(|value| !numbers.contains(&value.abs()));
            }
            map.retain(|_, list| !list.is_empty());
        }
    }

    /// Successors of a signed id; empty when the strand has none.
    pub fn outgoing(&self, id: i64) -> &[i64] {
        self.forward.get(&id).map_or(NO_LINKS, |list| list.as_slice())
    }

    /// Predecessors of a signed id; empty when the strand has none.
    pub fn incoming(&self, id: i64) -> &[i64] {
        self.reverse.get(&id).map_or(NO_LINKS, |list| list.as_slice())
    }

    /// All (start, end) entries of the forward view, sorted by key for
    /// deterministic output.
    pub fn sorted_entries(&self) -> Vec<(i64, i64)> {
        let mut keys: Vec<i64> = self.forward.keys().copied().collect();
        keys.sort_unstable();
        let mut entries = Vec::new();
        for start in keys {
            for end in &self.forward[&start] {
                entries.push((start, *end));
            }
        }
        entries
    }

    /// Number of directed forward entries (twins counted separately).
    pub fn entry_count(&self) -> usize {
        self.forward.values().map(|list| list.len()).sum()
    }
}
