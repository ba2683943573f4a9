/// Copy-depth propagation
/// Assigns each segment a vector of copy depths (one entry per inferred
/// genome copy, summing to roughly the segment's read depth). Assignment is
/// iterative and best-effort: seed an obvious single-copy segment, then
/// push depth information across exclusive neighbour relations until no
/// step can act within the error margin, and repeat until seeding fails.
/// Segments with awkward connections simply stay unassigned.

use log::debug;

use crate::graph::AssemblyGraph;
use crate::graph_analysis::{exclusive_inputs, exclusive_outputs};

/// Drive the propagation to its fixed point. `min_single_copy_length` is
/// the minimum length for a segment to be seeded as single copy;
/// `error_margin` bounds the relative depth error any assignment may carry.
pub fn determine_copy_depth(
    graph: &mut AssemblyGraph,
    min_single_copy_length: usize,
    error_margin: f64,
) {
    loop {
        let seeded = assign_single_copy(graph, min_single_copy_length);
        propagate(graph, error_margin);
        if seeded == 0 {
            break;
        }
    }
}

/// Alternate the propagation sub-steps until none of them makes progress:
/// merging runs dry, then one redistribution round; a successful
/// redistribution re-opens merging opportunities, so recurse.
fn propagate(graph: &mut AssemblyGraph, error_margin: f64) {
    while merge_copy_depths(graph, error_margin) {}
    if redistribute_copy_depths(graph, error_margin) {
        propagate(graph, error_margin);
    }
    while resolve_simple_loops(graph) {}
}

/// Seed the longest unassigned segment that is at least
/// `min_single_copy_length` long and has no more than one link on either
/// end with a single-copy vector. Returns the number of seeds made (0 or 1).
pub fn assign_single_copy(graph: &mut AssemblyGraph, min_single_copy_length: usize) -> usize {
    let mut candidates: Vec<i64> = unassigned_segments(graph);
    candidates.sort_by_key(|number| {
        (std::cmp::Reverse(graph.segments[number].length()), *number)
    });
    for number in candidates {
        if graph.segments[&number].length() >= min_single_copy_length
            && at_most_one_link_per_end(graph, number)
        {
            let depth = graph.segments[&number].depth;
            debug!("seeding segment {} as single copy at depth {:.3}", number, depth);
            graph.copy_depths.insert(number, vec![depth]);
            return 1;
        }
    }
    0
}

/// Assign copy depths to the one unassigned segment whose exclusive,
/// fully-assigned input (or output) set matches its depth best, provided
/// that the relative error stays under the margin. One assignment per call;
/// returns whether one was made.
pub fn merge_copy_depths(graph: &mut AssemblyGraph, error_margin: f64) -> bool {
    let mut unassigned = unassigned_segments(graph);
    if unassigned.is_empty() {
        return false;
    }
    unassigned.sort_unstable();

    let mut best: Option<(i64, Vec<f64>)> = None;
    let mut lowest_error = f64::INFINITY;
    for number in unassigned {
        let sides = [
            exclusive_inputs(graph, number),
            exclusive_outputs(graph, number),
        ];
        for connections in sides {
            if connections.is_empty() || !all_assigned(graph, &connections) {
                continue;
            }
            let (depths, error) = scale_from_sources(graph, number, &connections);
            if error < lowest_error {
                lowest_error = error;
                best = Some((number, depths));
            }
        }
    }

    match best {
        Some((number, depths)) if lowest_error < error_margin => {
            debug!(
                "merged copy depths onto segment {} (error {:.3})",
                number, lowest_error
            );
            graph.copy_depths.insert(number, depths);
            true
        }
        _ => false,
    }
}

/// Spread the copy depths of a multi-copy segment over an exclusive
/// neighbour set that still has unassigned members. Every arrangement of
/// the depth entries into per-neighbour bins is scored by its worst
/// relative error; the best arrangement is applied if it fits the margin.
/// Returns whether any neighbour gained an assignment.
pub fn redistribute_copy_depths(graph: &mut AssemblyGraph, error_margin: f64) -> bool {
    let mut multi_copy: Vec<i64> = graph
        .segments
        .keys()
        .filter(|number| {
            graph
                .copy_depths
                .get(*number)
                .is_some_and(|depths| depths.len() > 1)
        })
        .copied()
        .collect();
    if multi_copy.is_empty() {
        return false;
    }
    multi_copy.sort_unstable();

    for number in multi_copy {
        // Prefer the input side; fall back to the output side. Either must
        // have at least one member still waiting for an assignment.
        let mut connections = exclusive_inputs(graph, number);
        if connections.is_empty() || all_assigned(graph, &connections) {
            connections = exclusive_outputs(graph, number);
        }
        if connections.is_empty() || all_assigned(graph, &connections) {
            continue;
        }

        let copy_depths = graph.copy_depths[&number].clone();
        let bins = vec![Vec::new(); connections.len()];
        let targets: Vec<Option<usize>> = connections
            .iter()
            .map(|connection| graph.copy_depths.get(connection).map(|depths| depths.len()))
            .collect();
        let arrangements = shuffle_into_bins(&copy_depths, bins, &targets);
        if arrangements.is_empty() {
            continue;
        }

        let mut lowest_error = f64::INFINITY;
        let mut best_arrangement = None;
        for arrangement in arrangements {
            let error = arrangement_error(graph, &connections, &arrangement);
            if error < lowest_error {
                lowest_error = error;
                best_arrangement = Some(arrangement);
            }
        }
        if lowest_error < error_margin
            && assign_where_needed(graph, &connections, &best_arrangement.unwrap(), error_margin)
        {
            debug!(
                "redistributed copy depths of segment {} (error {:.3})",
                number, lowest_error
            );
            return true;
        }
    }
    false
}

/// Loop structures get no automatic copy depths: a loop traversed once
/// could be assigned safely, but repeat counts are too uncertain to act on,
/// so this step always reports no progress and leaves loops unassigned.
pub fn resolve_simple_loops(_graph: &mut AssemblyGraph) -> bool {
    false
}

/// Scale source depths so they sum to the target, and report the relative
/// error of the fit. The scaled depths come back sorted, largest first.
pub fn scale_copy_depths(target_depth: f64, source_depths: &[f64]) -> (Vec<f64>, f64) {
    let source_sum: f64 = source_depths.iter().sum();
    let scaling_factor = target_depth / source_sum;
    let mut scaled: Vec<f64> = source_depths.iter().map(|depth| depth * scaling_factor).collect();
    scaled.sort_by(|a, b| b.total_cmp(a));
    (scaled, relative_error(source_sum, target_depth))
}

/// Relative error of assigning a source value to a target value; infinite
/// when the target is not positive.
pub fn relative_error(source: f64, target: f64) -> f64 {
    if target > 0.0 {
        (source - target).abs() / target
    } else {
        f64::INFINITY
    }
}

fn unassigned_segments(graph: &AssemblyGraph) -> Vec<i64> {
    graph
        .segments
        .keys()
        .filter(|number| !graph.copy_depths.contains_key(*number))
        .copied()
        .collect()
}

fn at_most_one_link_per_end(graph: &AssemblyGraph, number: i64) -> bool {
    graph.links.outgoing(number).len() <= 1 && graph.links.incoming(number).len() <= 1
}

fn all_assigned(graph: &AssemblyGraph, numbers: &[i64]) -> bool {
    numbers
        .iter()
        .all(|number| graph.copy_depths.contains_key(number))
}

/// Concatenate the neighbours' copy depths and scale them to the segment's
/// own depth.
fn scale_from_sources(graph: &AssemblyGraph, number: i64, sources: &[i64]) -> (Vec<f64>, f64) {
    let source_depths: Vec<f64> = sources
        .iter()
        .flat_map(|source| graph.copy_depths[source].iter().copied())
        .collect();
    scale_copy_depths(graph.segments[&number].depth, &source_depths)
}

/// Worst per-neighbour relative error of an arrangement.
fn arrangement_error(graph: &AssemblyGraph, numbers: &[i64], arrangement: &[Vec<f64>]) -> f64 {
    let mut max_error: f64 = 0.0;
    for (i, number) in numbers.iter().enumerate() {
        let bin_sum: f64 = arrangement[i].iter().sum();
        max_error = max_error.max(relative_error(bin_sum, graph.segments[number].depth));
    }
    max_error
}

/// Give every still-unassigned listed segment its bin from the arrangement,
/// rescaled to the segment's own depth, when the rescaling error allows it.
fn assign_where_needed(
    graph: &mut AssemblyGraph,
    numbers: &[i64],
    arrangement: &[Vec<f64>],
    error_margin: f64,
) -> bool {
    let mut success = false;
    for (i, number) in numbers.iter().enumerate() {
        if graph.copy_depths.contains_key(number) {
            continue;
        }
        let (scaled, error) = scale_copy_depths(graph.segments[number].depth, &arrangement[i]);
        if error <= error_margin {
            graph.copy_depths.insert(*number, scaled);
            success = true;
        }
    }
    success
}

/// Enumerate every way of dealing the items into the bins such that no bin
/// stays empty and every bin with a target size ends up exactly that big.
fn shuffle_into_bins(
    items: &[f64],
    bins: Vec<Vec<f64>>,
    targets: &[Option<usize>],
) -> Vec<Vec<Vec<f64>>> {
    let mut arrangements = Vec::new();
    if let Some((first, rest)) = items.split_first() {
        for i in 0..bins.len() {
            let mut bins_copy = bins.clone();
            bins_copy[i].push(*first);
            arrangements.extend(shuffle_into_bins(rest, bins_copy, targets));
        }
    } else if bins.iter().all(|bin| !bin.is_empty())
        && targets
            .iter()
            .enumerate()
            .all(|(i, target)| target.is_none_or(|size| size == bins[i].len()))
    {
        arrangements.push(bins);
    }
    arrangements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;

    fn add_segment(graph: &mut AssemblyGraph, number: i64, depth: f64, length: usize) {
        let mut segment = Segment::new(number, depth, &"A".repeat(length), true);
        segment.derive_missing_strand();
        graph.add_segment(segment);
    }

    #[test]
    fn test_seed_single_copy_isolated_segment() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 37.4, 2000);
        assert_eq!(assign_single_copy(&mut graph, 1000), 1);
        assert_eq!(graph.copy_depths[&1], vec![37.4]);
        // nothing left to seed
        assert_eq!(assign_single_copy(&mut graph, 1000), 0);
    }

    #[test]
    fn test_seed_skips_short_and_branching_segments() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 10.0, 500);
        add_segment(&mut graph, 2, 10.0, 3000);
        add_segment(&mut graph, 3, 10.0, 3000);
        add_segment(&mut graph, 4, 10.0, 3000);
        // 2 fans out twice, so only 3 and 4 qualify; 3 wins on number
        graph.add_link(2, 3);
        graph.add_link(2, 4);
        assert_eq!(assign_single_copy(&mut graph, 1000), 1);
        assert!(graph.copy_depths.contains_key(&3));
    }

    #[test]
    fn test_merge_from_exclusive_inputs() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 10.0, 100);
        add_segment(&mut graph, 2, 20.0, 100);
        add_segment(&mut graph, 3, 30.0, 100);
        graph.add_link(1, 3);
        graph.add_link(2, 3);
        graph.copy_depths.insert(1, vec![10.0]);
        graph.copy_depths.insert(2, vec![20.0]);
        assert!(merge_copy_depths(&mut graph, 1.0));
        assert_eq!(graph.copy_depths[&3], vec![20.0, 10.0]);
        // no unassigned segments remain
        assert!(!merge_copy_depths(&mut graph, 1.0));
    }

    #[test]
    fn test_merge_respects_error_margin() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 10.0, 100);
        add_segment(&mut graph, 2, 100.0, 100);
        graph.add_link(1, 2);
        graph.copy_depths.insert(1, vec![10.0]);
        // sources sum to 10 against a target of 100: error 0.9 rejected
        assert!(!merge_copy_depths(&mut graph, 0.5));
        assert!(merge_copy_depths(&mut graph, 0.95));
    }

    #[test]
    fn test_redistribute_to_exclusive_outputs() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 30.0, 100);
        add_segment(&mut graph, 2, 20.0, 100);
        add_segment(&mut graph, 3, 10.0, 100);
        graph.add_link(1, 2);
        graph.add_link(1, 3);
        graph.copy_depths.insert(1, vec![20.0, 10.0]);
        assert!(redistribute_copy_depths(&mut graph, 1.0));
        assert_eq!(graph.copy_depths[&2], vec![20.0]);
        assert_eq!(graph.copy_depths[&3], vec![10.0]);
    }

    #[test]
    fn test_full_propagation_over_a_chain() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 10.0, 2000);
        add_segment(&mut graph, 2, 10.5, 400);
        graph.add_link(1, 2);
        determine_copy_depth(&mut graph, 1000, 1.0);
        assert_eq!(graph.copy_depths[&1], vec![10.0]);
        assert_eq!(graph.copy_depths[&2].len(), 1);
        assert!((graph.copy_depths[&2][0] - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_scale_copy_depths() {
        let (scaled, error) = scale_copy_depths(30.0, &[5.0, 10.0]);
        assert_eq!(scaled, vec![20.0, 10.0]);
        assert!((error - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.6, 2.0) - 0.2).abs() < 1e-9);
        assert_eq!(relative_error(1.0, 0.0), f64::INFINITY);
        assert_eq!(relative_error(2.0, 2.0), 0.0);
    }

    #[test]
    fn test_shuffle_into_bins_requires_non_empty_bins() {
        let arrangements = shuffle_into_bins(&[20.0, 10.0], vec![Vec::new(), Vec::new()], &[None, None]);
        assert_eq!(arrangements.len(), 2);
        assert!(arrangements.contains(&vec![vec![20.0], vec![10.0]]));
        assert!(arrangements.contains(&vec![vec![10.0], vec![20.0]]));
    }

    #[test]
    fn test_shuffle_into_bins_honours_targets() {
        let arrangements = shuffle_into_bins(
            &[30.0, 20.0, 10.0],
            vec![Vec::new(), Vec::new()],
            &[Some(2), None],
        );
        assert_eq!(arrangements.len(), 3);
        for arrangement in &arrangements {
            assert_eq!(arrangement[0].len(), 2);
            assert_eq!(arrangement[1].len(), 1);
        }
    }

    #[test]
    fn test_simple_loops_left_unassigned() {
        let mut graph = AssemblyGraph::new(0);
        add_segment(&mut graph, 1, 10.0, 100);
        graph.add_link(1, 1);
        assert!(!resolve_simple_loops(&mut graph));
        assert!(graph.copy_depths.is_empty());
    }
}
