/// Four-way-junction repair
/// A four-way junction is two strands that both fan out to the same two
/// ends. Copy-depth propagation cannot see through such a crossing, so it
/// is rebuilt around a zero-effective-length bridge segment: where a and b
/// both led to c and d, the repaired graph has a -> x, b -> x, x -> c and
/// x -> d, with the twin view kept symmetric throughout.

use std::collections::HashSet;

use log::debug;

use crate::graph::AssemblyGraph;
use crate::paths::insert_between;
use crate::segment::Segment;

/// Find and repair every four-way junction; returns how many were rebuilt.
pub fn repair_four_way_junctions(graph: &mut AssemblyGraph) -> usize {
    let mut repaired = 0;

    let mut numbers: Vec<i64> = graph.segments.keys().copied().collect();
    numbers.sort_unstable();
    let signed_ids: Vec<i64> = numbers
        .iter()
        .copied()
        .chain(numbers.iter().map(|number| -number))
        .collect();

    for start in signed_ids {
        let ends: Vec<i64> = graph.links.outgoing(start).to_vec();
        if ends.len() != 2 {
            continue;
        }
        let (end_1, end_2) = (ends[0], ends[1]);
        if graph.links.incoming(end_1).len() != 2 || graph.links.incoming(end_2).len() != 2 {
            continue;
        }
        // Exactly two distinct strands must feed both ends.
        let starts: HashSet<i64> = graph
            .links
            .incoming(end_1)
            .iter()
            .chain(graph.links.incoming(end_2))
            .copied()
            .collect();
        if starts.len() != 2 {
            continue;
        }
        let start_1 = start;
        let start_2 = *starts.iter().find(|other| **other != start_1).unwrap();
        // Both starts must fan out to exactly these two ends.
        let second_fan = graph.links.outgoing(start_2);
        if second_fan.len() != 2 || !second_fan.contains(&end_1) || !second_fan.contains(&end_2) {
            continue;
        }

        repair_junction(graph, [start_1, start_2], [end_1, end_2]);
        repaired += 1;
    }
    repaired
}

fn repair_junction(graph: &mut AssemblyGraph, starts: [i64; 2], ends: [i64; 2]) {
    // The bridge carries the junction's shared overlap bases, taken from
    // the strand of the first end that the link designates.
    let end_segment = &graph.segments[&ends[0].abs()];
    let end_sequence = if ends[0] > 0 {
        &end_segment.forward_sequence
    } else {
        &end_segment.reverse_sequence
    };
    let bridge_sequence = &end_sequence[..graph.overlap.min(end_sequence.len())];

    let bridge_depth = starts
        .iter()
        .chain(ends.iter())
        .map(|id| graph.segments[&id.abs()].depth)
        .sum::<f64>()
        / 2.0;
    let bridge_number = graph.next_free_number();
    debug!(
        "bridging junction {:?} -> {:?} with new segment {}",
        starts, ends, bridge_number
    );

    let mut bridge = Segment::new(bridge_number, bridge_depth, bridge_sequence, true);
    bridge.derive_missing_strand();
    graph.add_segment(bridge);

    for start in starts {
        for end in ends {
            graph.links.remove(start, end);
        }
        graph.add_link(start, bridge_number);
    }
    for end in ends {
        graph.add_link(bridge_number, end);
    }

    // Any path that stepped straight across the junction now goes through
    // the bridge (or its twin, on the reverse strand).
    let names: Vec<String> = graph.paths.keys().cloned().collect();
    for name in names {
        let mut path = graph.paths[&name].clone();
        for start in starts {
            for end in ends {
                path = insert_between(&path, start, end, bridge_number);
                path = insert_between(&path, -end, -start, -bridge_number);
            }
        }
        graph.paths.insert(name, path);
    }
}
