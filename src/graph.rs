/// Assembly graph container
/// Owns the segments, the link store, the named paths and the per-segment
/// copy-depth vectors, together with the single graph-wide overlap size.
/// Structural mutators live in their own modules and operate on this type;
/// the container itself provides lookups, length and depth metrics, segment
/// removal and the fixed-order cleanup pipeline.

use std::collections::{HashMap, HashSet};

use log::{info, warn};

use crate::depth_filter;
use crate::junction_repair;
use crate::links::LinkStore;
use crate::merge;
use crate::segment::Segment;

pub struct AssemblyGraph {
    pub segments: HashMap<i64, Segment>,
    pub links: LinkStore,
    pub paths: HashMap<String, Vec<i64>>,
    pub copy_depths: HashMap<i64, Vec<f64>>,
    pub overlap: usize,
}

impl AssemblyGraph {
    pub fn new(overlap: usize) -> Self {
        AssemblyGraph {
            segments: HashMap::new(),
            links: LinkStore::new(),
            paths: HashMap::new(),
            copy_depths: HashMap::new(),
            overlap,
        }
    }

    /// Insert a segment, keyed by its positive number.
    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.insert(segment.number, segment);
    }

    /// Add a link between two signed ids (twin and reverse view included).
    pub fn add_link(&mut self, start: i64, end: i64) {
        self.links.add(start, end);
    }

    /// The strand sequence a signed id designates. The segment must exist.
    pub fn sequence_of(&self, signed: i64) -> &str {
        let segment = &self.segments[&signed.abs()];
        if signed > 0 {
            &segment.forward_sequence
        } else {
            &segment.reverse_sequence
        }
    }

    /// Smallest positive id not yet in use (always max + 1, so ids freed by
    /// removal are not recycled within a run).
    pub fn next_free_number(&self) -> i64 {
        self.segments.keys().max().copied().unwrap_or(0) + 1
    }

    /// Remove segments by positive id, dropping every link that touches
    /// either strand and every path that references either strand.
    pub fn remove_segments(&mut self, numbers: &[i64]) {
        let removing: HashSet<i64> = numbers.iter().copied().collect();
        self.segments.retain(|number, _| !removing.contains(number));
        self.links.remove_segments(&removing);
        self.paths
            .retain(|_, path| !path.iter().any(|id| removing.contains(&id.abs())));
    }

    pub fn total_length(&self) -> usize {
        self.segments.values().map(|segment| segment.length()).sum()
    }

    pub fn total_length_no_overlap(&self) -> i64 {
        self.segments
            .values()
            .map(|segment| segment.length_no_overlap(self.overlap))
            .sum()
    }

    /// Length of the segment at which the longest-first cumulative length
    /// reaches the given percentage of the total (the N50 for 50.0).
    /// Overlap-compensated lengths are used throughout.
    pub fn n_segment_length(&self, percentile: f64) -> i64 {
        let target = self.total_length_no_overlap() as f64 * (percentile / 100.0);
        let mut lengths: Vec<i64> = self
            .segments
            .values()
            .map(|segment| segment.length_no_overlap(self.overlap))
            .collect();
        lengths.sort_unstable_by(|a, b| b.cmp(a));
        let mut length_so_far = 0;
        for length in lengths {
            length_so_far += length;
            if length_so_far as f64 >= target {
                return length;
            }
        }
        0
    }

    /// Median read depth by base over the whole graph.
    pub fn median_depth_by_base(&self) -> f64 {
        let numbers: Vec<i64> = self.segments.keys().copied().collect();
        self.median_depth_by_base_of(&numbers)
    }

    /// Median read depth by base over a subset of segments: sort by depth,
    /// walk the overlap-compensated lengths and report the depth of the
    /// segment straddling the halfway base.
    pub fn median_depth_by_base_of(&self, numbers: &[i64]) -> f64 {
        let mut entries: Vec<(f64, i64)> = numbers
            .iter()
            .map(|number| {
                let segment = &self.segments[number];
                (segment.depth, segment.length_no_overlap(self.overlap))
            })
            .collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        let total_length: i64 = entries.iter().map(|(_, length)| length).sum();
        let halfway = total_length / 2;
        let mut length_so_far = 0;
        for (depth, length) in entries {
            length_so_far += length;
            if length_so_far >= halfway {
                return depth;
            }
        }
        0.0
    }

    /// Divide every depth by the median, so the typical segment sits at 1.
    /// Applying this twice is the same as applying it once.
    pub fn normalise_depths(&mut self) {
        let median = self.median_depth_by_base();
        if median <= 0.0 {
            warn!("median depth is {}, skipping depth normalisation", median);
            return;
        }
        for segment in self.segments.values_mut() {
            segment.divide_depth(median);
        }
    }

    /// Run the structural cleanup pipeline in its fixed order: junction
    /// repair, depth filtering, homopolymer-island filtering, unbranching
    /// merging, depth normalisation.
    pub fn clean(&mut self, read_depth_filter: f64) {
        let repaired = junction_repair::repair_four_way_junctions(self);
        info!("Repaired {} four-way junctions", repaired);

        let before = self.segments.len();
        depth_filter::filter_by_depth(self, read_depth_filter);
        info!(
            "Removed {} low-depth segments",
            before.saturating_sub(self.segments.len())
        );

        let before = self.segments.len();
        depth_filter::filter_homopolymer_components(self);
        info!(
            "Removed {} homopolymer-island segments",
            before.saturating_sub(self.segments.len())
        );

        let before = self.segments.len();
        merge::merge_unbranching_paths(self);
        info!(
            "Merged away {} segments on unbranching paths",
            before.saturating_sub(self.segments.len())
        );

        self.normalise_depths();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_lengths(overlap: usize, specs: &[(i64, f64, usize)]) -> AssemblyGraph {
        let mut graph = AssemblyGraph::new(overlap);
        for (number, depth, length) in specs {
            let mut segment = Segment::new(*number, *depth, &"A".repeat(*length), true);
            segment.derive_missing_strand();
            graph.add_segment(segment);
        }
        graph
    }

    #[test]
    fn test_sequence_of_selects_strand() {
        let mut graph = AssemblyGraph::new(0);
        let mut segment = Segment::new(1, 1.0, "AATTG", true);
        segment.derive_missing_strand();
        graph.add_segment(segment);
        assert_eq!(graph.sequence_of(1), "AATTG");
        assert_eq!(graph.sequence_of(-1), "CAATT");
    }

    #[test]
    fn test_total_lengths() {
        let graph = graph_with_lengths(2, &[(1, 1.0, 10), (2, 1.0, 6)]);
        assert_eq!(graph.total_length(), 16);
        assert_eq!(graph.total_length_no_overlap(), 12);
    }

    #[test]
    fn test_n_segment_length_boundaries() {
        let graph = graph_with_lengths(0, &[(1, 1.0, 100), (2, 1.0, 60), (3, 1.0, 40)]);
        // the full percentile reaches down to the shortest segment
        assert_eq!(graph.n_segment_length(100.0), 40);
        // a tiny percentile stops at the longest
        assert_eq!(graph.n_segment_length(0.1), 100);
        assert_eq!(graph.n_segment_length(50.0), 100);
        assert_eq!(graph.n_segment_length(80.0), 60);
    }

    #[test]
    fn test_median_depth_by_base() {
        let graph = graph_with_lengths(0, &[(1, 100.0, 10), (2, 100.0, 10), (3, 5.0, 10), (4, 100.0, 10)]);
        assert!((graph.median_depth_by_base() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalise_depths_is_idempotent() {
        let mut graph = graph_with_lengths(0, &[(1, 10.0, 50), (2, 20.0, 50), (3, 40.0, 50)]);
        graph.normalise_depths();
        assert!((graph.median_depth_by_base() - 1.0).abs() < 1e-12);
        let depths_once: Vec<f64> = (1..=3).map(|n| graph.segments[&n].depth).collect();
        graph.normalise_depths();
        let depths_twice: Vec<f64> = (1..=3).map(|n| graph.segments[&n].depth).collect();
        assert_eq!(depths_once, depths_twice);
    }

    #[test]
    fn test_remove_segments_drops_links_and_paths() {
        let mut graph = graph_with_lengths(0, &[(1, 1.0, 5), (2, 1.0, 5), (3, 1.0, 5)]);
        graph.add_link(1, 2);
        graph.add_link(2, 3);
        graph.paths.insert("keep".to_string(), vec![1, 3]);
        graph.paths.insert("drop".to_string(), vec![1, -2, 3]);
        graph.remove_segments(&[2]);
        assert!(!graph.segments.contains_key(&2));
        assert!(graph.links.outgoing(1).is_empty());
        assert!(graph.links.incoming(3).is_empty());
        assert!(graph.paths.contains_key("keep"));
        assert!(!graph.paths.contains_key("drop"));
    }

    #[test]
    fn test_next_free_number() {
        let mut graph = graph_with_lengths(0, &[(3, 1.0, 5), (7, 1.0, 5)]);
        assert_eq!(graph.next_free_number(), 8);
        graph.remove_segments(&[7]);
        assert_eq!(graph.next_free_number(), 4);
        assert_eq!(AssemblyGraph::new(0).next_free_number(), 1);
    }
}
