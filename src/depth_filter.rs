/// Depth and homopolymer filtering
/// Two removal passes over whole connected components:
/// 1. drop segments whose depth falls below a relative cutoff, when doing
///    so is structurally safe
/// 2. drop components that consist of nothing but one repeated base

use crate::graph::AssemblyGraph;
use crate::graph_analysis::{
    all_below_depth, connected_components, dead_end_count, removal_creates_dead_end,
};
use crate::sequence::is_homopolymer;

/// Remove segments whose depth is below the relative cutoff, measured
/// against the whole-graph median and against their component's median.
/// A below-cutoff segment only goes when at least one of these holds:
///   1. it already has a dead end
///   2. its entire component is below the whole-graph cutoff
///   3. deleting it would not create any new dead end
pub fn filter_by_depth(graph: &mut AssemblyGraph, relative_depth_cutoff: f64) {
    let whole_graph_cutoff = graph.median_depth_by_base() * relative_depth_cutoff;
    let mut numbers_to_remove: Vec<i64> = Vec::new();

    for component in connected_components(graph) {
        let component_cutoff =
            graph.median_depth_by_base_of(&component) * relative_depth_cutoff;
        for number in &component {
            let depth = graph.segments[number].depth;
            if depth >= whole_graph_cutoff && depth >= component_cutoff {
                continue;
            }
            if dead_end_count(graph, *number) > 0
                || all_below_depth(graph, &component, whole_graph_cutoff)
                || !removal_creates_dead_end(graph, *number)
            {
                numbers_to_remove.push(*number);
            }
        }
    }
    graph.remove_segments(&numbers_to_remove);
}

/// Remove every connected component whose segments are all made of the one
/// same base. Components are dropped whole or not at all.
pub fn filter_homopolymer_components(graph: &mut AssemblyGraph) {
    let mut numbers_to_remove: Vec<i64> = Vec::new();
    for component in connected_components(graph) {
        if component_is_one_base(graph, &component) {
            numbers_to_remove.extend(component);
        }
    }
    graph.remove_segments(&numbers_to_remove);
}

/// True when every non-empty segment of the component is a homopolymer and
/// all of them carry the same base on one strand or the other. The base is
/// taken from the first non-empty segment's forward strand; components with
/// only empty segments do not qualify.
fn component_is_one_base(graph: &AssemblyGraph, component: &[i64]) -> bool {
    let non_empty: Vec<i64> = component
        .iter()
        .filter(|number| graph.segments[*number].length() > 0)
        .copied()
        .collect();
    let first = match non_empty.first() {
        Some(number) => &graph.segments[number],
        None => return false,
    };
    let base = first
        .forward_sequence
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
        .unwrap_or('n');
    for number in &non_empty {
        let segment = &graph.segments[number];
        if !is_homopolymer(&segment.forward_sequence) {
            return false;
        }
        let forward_base = segment
            .forward_sequence
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase());
        let reverse_base = segment
            .reverse_sequence
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase());
        if forward_base != Some(base) && reverse_base != Some(base) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;

    fn add_segment(graph: &mut AssemblyGraph, number: i64, depth: f64, seq: &str) {
        let mut segment = Segment::new(number, depth, seq, true);
        segment.derive_missing_strand();
        graph.add_segment(segment);
    }

    #[test]
    fn test_filter_removes_low_depth_dead_end() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 100.0, "ACGTACGTAC");
        add_segment(&mut graph, 2, 100.0, "ACGTACGTAC");
        add_segment(&mut graph, 3, 5.0, "ACGTACGTAC");
        add_segment(&mut graph, 4, 100.0, "ACGTACGTAC");
        graph.add_link(1, 2);
        graph.add_link(2, 3);
        filter_by_depth(&mut graph, 0.1);
        assert!(!graph.segments.contains_key(&3));
        assert!(graph.segments.contains_key(&1));
        assert!(graph.segments.contains_key(&2));
        assert!(graph.segments.contains_key(&4));
    }

    #[test]
    fn test_filter_keeps_structural_segment() {
        // 3 is low depth but sits on a cycle with no dead ends of its own;
        // removing it would create two, and its component is not uniformly low
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 100.0, "ACGTACGTAC");
        add_segment(&mut graph, 2, 100.0, "ACGTACGTAC");
        add_segment(&mut graph, 3, 5.0, "ACGTACGTAC");
        add_segment(&mut graph, 4, 100.0, "ACGTACGTAC");
        graph.add_link(1, 2);
        graph.add_link(2, 3);
        graph.add_link(3, 4);
        graph.add_link(4, 1);
        filter_by_depth(&mut graph, 0.1);
        assert!(graph.segments.contains_key(&3));
    }

    #[test]
    fn test_homopolymer_filter_drops_whole_component() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 1.0, "AAAA");
        add_segment(&mut graph, 2, 1.0, "TTTTTT");
        graph.add_link(1, 2);
        add_segment(&mut graph, 3, 1.0, "ACGT");
        filter_homopolymer_components(&mut graph);
        // A and T strands of the same component share the base through the
        // reverse strand, so the whole island goes
        assert!(!graph.segments.contains_key(&1));
        assert!(!graph.segments.contains_key(&2));
        assert!(graph.segments.contains_key(&3));
    }

    #[test]
    fn test_homopolymer_filter_never_partial() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 1.0, "AAAA");
        add_segment(&mut graph, 2, 1.0, "ACGT");
        graph.add_link(1, 2);
        filter_homopolymer_components(&mut graph);
        assert!(graph.segments.contains_key(&1));
        assert!(graph.segments.contains_key(&2));
    }
}
