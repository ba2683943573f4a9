/// Graph traversal and connectivity queries
/// Everything here is read-only: connected components over the
/// strand-agnostic neighbour relation, dead-end counting, and the
/// exclusive-neighbour queries the copy-depth propagation relies on.

use std::collections::{HashSet, VecDeque};

use crate::graph::AssemblyGraph;

/// Positive ids of all segments directly linked to the given one, on either
/// strand and in either direction.
pub fn neighbouring_segments(graph: &AssemblyGraph, number: i64) -> Vec<i64> {
    let mut connected: HashSet<i64> = HashSet::new();
    for linked in graph.links.outgoing(number) {
        connected.insert(linked.abs());
    }
    for linked in graph.links.incoming(number) {
        connected.insert(linked.abs());
    }
    connected.into_iter().collect()
}

/// Partition the positive segment ids into connected components with a
/// breadth-first sweep over the undirected neighbour relation. Because it
/// is undirected, both incoming and outgoing links are walked, so every
/// segment of a component is reached from any of its members.
pub fn connected_components(graph: &AssemblyGraph) -> Vec<Vec<i64>> {
    let mut starts: Vec<i64> = graph.segments.keys().copied().collect();
    starts.sort_unstable();

    let mut visited: HashSet<i64> = HashSet::new();
    let mut components: Vec<Vec<i64>> = Vec::new();

    for start in starts {
        if visited.contains(&start) {
            continue;
        }
        let mut component: Vec<i64> = Vec::new();
        let mut queue: VecDeque<i64> = VecDeque::from([start]);
        visited.insert(start);

        while let Some(current) = queue.pop_front() {
            component.push(current);
            for neighbour in neighbouring_segments(graph, current) {
                if !visited.contains(&neighbour) {
                    visited.insert(neighbour);
                    queue.push_back(neighbour);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Number of dead ends of one segment: 0, 1 or 2. A missing forward
/// adjacency on the positive strand is one dead end, a missing reverse
/// adjacency the other.
pub fn dead_end_count(graph: &AssemblyGraph, number: i64) -> usize {
    let mut dead_ends = 0;
    if graph.links.outgoing(number).is_empty() {
        dead_ends += 1;
    }
    if graph.links.incoming(number).is_empty() {
        dead_ends += 1;
    }
    dead_ends
}

/// Total dead ends over the whole graph.
pub fn total_dead_ends(graph: &AssemblyGraph) -> usize {
    graph
        .segments
        .keys()
        .map(|number| dead_end_count(graph, *number))
        .sum()
}

/// Outgoing neighbours of the positive strand of a segment.
pub fn all_outputs(graph: &AssemblyGraph, number: i64) -> Vec<i64> {
    graph.links.outgoing(number).to_vec()
}

/// Incoming neighbours of the positive strand of a segment.
pub fn all_inputs(graph: &AssemblyGraph, number: i64) -> Vec<i64> {
    graph.links.incoming(number).to_vec()
}

/// Whether the first signed id links forward to the second and nowhere else.
pub fn leads_only_to(graph: &AssemblyGraph, from: i64, to: i64) -> bool {
    graph.links.outgoing(from) == [to]
}

/// Whether the first signed id is linked from the second and nowhere else.
pub fn comes_only_from(graph: &AssemblyGraph, to: i64, from: i64) -> bool {
    graph.links.incoming(to) == [from]
}

/// Positive ids of the segments that lead into the given one and into
/// nothing else. Empty when no predecessor is exclusive, which is a valid
/// answer rather than an error.
pub fn exclusive_inputs(graph: &AssemblyGraph, number: i64) -> Vec<i64> {
    graph
        .links
        .incoming(number)
        .iter()
        .filter(|input| leads_only_to(graph, **input, number))
        .map(|input| input.abs())
        .collect()
}

/// Positive ids of the segments the given one leads to that take input from
/// nothing else. The mirror of exclusive_inputs.
pub fn exclusive_outputs(graph: &AssemblyGraph, number: i64) -> Vec<i64> {
    graph
        .links
        .outgoing(number)
        .iter()
        .filter(|output| comes_only_from(graph, **output, number))
        .map(|output| output.abs())
        .collect()
}

/// Whether deleting the segment would leave some neighbour with a newly
/// missing adjacency.
pub fn removal_creates_dead_end(graph: &AssemblyGraph, number: i64) -> bool {
    for downstream in graph.links.outgoing(number) {
        if graph.links.incoming(*downstream).len() == 1 {
            return true;
        }
    }
    for upstream in graph.links.incoming(number) {
        if graph.links.outgoing(*upstream).len() == 1 {
            return true;
        }
    }
    false
}

/// Whether every listed segment sits below the given depth cutoff.
pub fn all_below_depth(graph: &AssemblyGraph, numbers: &[i64], cutoff: f64) -> bool {
    numbers
        .iter()
        .all(|number| graph.segments[number].depth < cutoff)
}
