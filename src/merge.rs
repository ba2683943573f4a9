/// Unbranching-path merging
/// Finds pairs of segments joined by a one-in/one-out link and fuses them
/// into a single segment, repeating until no such pair is left. Sequences
/// are joined on the strands the link designates, depths are combined as a
/// length-weighted mean, and paths through either segment are rewritten or
/// split.

use std::collections::HashMap;

use crate::graph::AssemblyGraph;
use crate::paths::{find_replace, split_on_all};
use crate::segment::Segment;
use crate::sequence::reverse_complement;

/// Merge mergeable pairs until none remain.
pub fn merge_unbranching_paths(graph: &mut AssemblyGraph) {
    loop {
        let mut numbers: Vec<i64> = graph.segments.keys().copied().collect();
        numbers.sort_unstable();

        let mut merged = false;
        'scan: for number in numbers {
            for signed in [number, -number] {
                let outgoing = graph.links.outgoing(signed);
                if outgoing.len() == 1 {
                    let next = outgoing[0];
                    if try_merge_pair(graph, signed, next) {
                        merged = true;
                        break 'scan;
                    }
                }
            }
        }
        if !merged {
            break;
        }
    }
}

/// Merge the two strands if they form a simple, unbranching path; report
/// whether a merge happened.
fn try_merge_pair(graph: &mut AssemblyGraph, first: i64, second: i64) -> bool {
    if first == second {
        return false;
    }
    if graph.links.outgoing(first) != [second] {
        return false;
    }
    if graph.links.incoming(second) != [first] {
        return false;
    }
    merge_pair(graph, first, second);
    true
}

/// Fuse two strands that are known to be mergeable.
fn merge_pair(graph: &mut AssemblyGraph, first: i64, second: i64) {
    let overlap = graph.overlap;
    let first_length = graph.segments[&first.abs()].length_no_overlap(overlap);
    let second_length = graph.segments[&second.abs()].length_no_overlap(overlap);
    let first_depth = graph.segments[&first.abs()].depth;
    let second_depth = graph.segments[&second.abs()].depth;

    // The junction bases are shared, so the first strand loses its final
    // overlap-sized chunk before the second strand is appended.
    let first_seq = graph.sequence_of(first);
    let mut merged_forward =
        first_seq[..first_seq.len().saturating_sub(overlap)].to_string();
    merged_forward.push_str(graph.sequence_of(second));
    let merged_reverse = reverse_complement(&merged_forward);

    let length_sum = (first_length + second_length) as f64;
    let merged_depth = if length_sum > 0.0 {
        first_depth * (first_length as f64 / length_sum)
            + second_depth * (second_length as f64 / length_sum)
    } else {
        1.0
    };

    // The longer input keeps its number; a tie gets a fresh one.
    let merged_number = if first_length > second_length {
        first.abs()
    } else if second_length > first_length {
        second.abs()
    } else {
        graph.next_free_number()
    };

    let outgoing: Vec<i64> = graph.links.outgoing(second).to_vec();
    let incoming: Vec<i64> = graph.links.incoming(first).to_vec();
    let old_paths = std::mem::take(&mut graph.paths);
    graph.remove_segments(&[first.abs(), second.abs()]);

    let mut merged_segment = Segment::new(merged_number, merged_depth, &merged_forward, true);
    merged_segment.attach_sequence(&merged_reverse, false);
    graph.add_segment(merged_segment);
    for link in outgoing {
        graph.add_link(merged_number, link);
    }
    for link in incoming {
        graph.add_link(link, merged_number);
    }

    graph.paths = rewrite_paths(old_paths, first, second, merged_number);
}

/// Substitute the merged pair in every path, then split any path that still
/// references either input on either strand. A path that splits into several
/// fragments keeps them all under numbered names.
fn rewrite_paths(
    old_paths: HashMap<String, Vec<i64>>,
    first: i64,
    second: i64,
    merged_number: i64,
) -> HashMap<String, Vec<i64>> {
    let mut new_paths = HashMap::new();
    for (name, path) in old_paths {
        let path = find_replace(&path, &[first, second], merged_number);
        let path = find_replace(&path, &[-second, -first], -merged_number);
        let fragments = split_on_all(&path, &[first, second, -first, -second]);
        if fragments.len() == 1 {
            new_paths.insert(name, fragments.into_iter().next().unwrap());
        } else {
            for (i, fragment) in fragments.into_iter().enumerate() {
                new_paths.insert(format!("{}_{}", name, i + 1), fragment);
            }
        }
    }
    new_paths
}
