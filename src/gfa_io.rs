/// GFA reading and writing
/// The tab-delimited graph format: S lines carry segments (integer names,
/// depth in a DP tag), L lines carry oriented links whose overlaps must all
/// equal the graph-wide overlap, P lines carry named paths. Anything
/// malformed fails the load; there is no partial recovery.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use log::info;

use crate::error::GraphError;
use crate::graph::AssemblyGraph;
use crate::links::LinkStore;
use crate::segment::Segment;
use crate::utils::{int_to_signed_string, is_link_canonical, sign_string, signed_string_to_int};

pub fn load_gfa(path: &str, overlap: usize) -> Result<AssemblyGraph, GraphError> {
    info!("Reading GFA graph: {}", path);
    let reader = BufReader::new(File::open(path)?);

    let mut graph = AssemblyGraph::new(overlap);
    let mut forward_map: HashMap<i64, Vec<i64>> = HashMap::new();

    for line in reader.lines() {
        let line = line?;
        let parts: Vec<&str> = line.trim_end().split('\t').collect();
        match parts.first() {
            Some(&"S") => {
                let (number, segment) = parse_segment_line(&parts)?;
                graph.segments.insert(number, segment);
            }
            Some(&"L") => {
                let (start, end) = parse_link_line(&parts, overlap)?;
                let ends = forward_map.entry(start).or_default();
                if !ends.contains(&end) {
                    ends.push(end);
                }
            }
            Some(&"P") => {
                let (name, segments) = parse_path_line(&parts)?;
                graph.paths.insert(name, segments);
            }
            _ => {}
        }
    }

    graph.links = LinkStore::from_forward_map(forward_map);
    info!(
        "Loaded {} segments and {} link entries",
        graph.segments.len(),
        graph.links.entry_count()
    );
    Ok(graph)
}

fn parse_segment_line(parts: &[&str]) -> Result<(i64, Segment), GraphError> {
    if parts.len() < 3 {
        return Err(GraphError::new("segment line with missing fields"));
    }
    let number: i64 = parts[1]
        .parse()
        .map_err(|_| GraphError::new(&format!("segment name '{}' is not an integer", parts[1])))?;
    if number < 1 {
        return Err(GraphError::new(&format!(
            "segment name '{}' is not a positive integer",
            parts[1]
        )));
    }
    let mut depth = 1.0;
    for part in parts {
        if let Some(tagged) = part.strip_prefix("DP:") {
            let value = tagged.get(2..).unwrap_or("");
            depth = value.parse().map_err(|_| {
                GraphError::new(&format!("unparseable depth tag '{}'", part))
            })?;
        }
    }
    let mut segment = Segment::new(number, depth, parts[2], true);
    segment.derive_missing_strand();
    Ok((number, segment))
}

fn parse_link_line(parts: &[&str], overlap: usize) -> Result<(i64, i64), GraphError> {
    if parts.len() < 6 {
        return Err(GraphError::new("link line with missing fields"));
    }
    let start = signed_string_to_int(&format!("{}{}", parts[1], parts[2]))?;
    let end = signed_string_to_int(&format!("{}{}", parts[3], parts[4]))?;
    let expected = format!("{}M", overlap);
    if parts[5] != expected {
        return Err(GraphError::new(&format!(
            "link overlap '{}' does not match the graph overlap of {}",
            parts[5], overlap
        )));
    }
    Ok((start, end))
}

fn parse_path_line(parts: &[&str]) -> Result<(String, Vec<i64>), GraphError> {
    if parts.len() < 3 {
        return Err(GraphError::new("path line with missing fields"));
    }
    let segments = parts[2]
        .split(',')
        .map(signed_string_to_int)
        .collect::<Result<Vec<i64>, GraphError>>()?;
    Ok((parts[1].to_string(), segments))
}

pub fn save_gfa(graph: &AssemblyGraph, path: &str) -> std::io::Result<()> {
    info!("Writing GFA graph: {}", path);
    let mut file = File::create(path)?;

    let mut numbers: Vec<i64> = graph.segments.keys().copied().collect();
    numbers.sort_unstable();
    for number in numbers {
        let segment = &graph.segments[&number];
        write!(
            file,
            "S\t{}\t{}\tLN:i:{}\tDP:f:{}",
            segment.number,
            segment.forward_sequence,
            segment.length(),
            segment.depth
        )?;
        if graph.copy_depths.contains_key(&number) {
            write!(
                file,
                "\tLB:z:{}\tCL:z:{}",
                depth_string(graph, number),
                copy_number_colour(graph, number)
            )?;
        }
        writeln!(file)?;
    }

    for (start, end) in graph.links.sorted_entries() {
        if is_link_canonical(start, end) {
            writeln!(
                file,
                "L\t{}\t{}\t{}\t{}\t{}M",
                start.abs(),
                sign_string(start),
                end.abs(),
                sign_string(end),
                graph.overlap
            )?;
        }
    }

    let mut path_names: Vec<&String> = graph.paths.keys().collect();
    path_names.sort();
    let overlap_cigar = format!("{}M", graph.overlap);
    for name in path_names {
        let segments = &graph.paths[name];
        let ids: Vec<String> = segments.iter().map(|id| int_to_signed_string(*id)).collect();
        let cigars = vec![overlap_cigar.as_str(); segments.len().saturating_sub(1)];
        writeln!(file, "P\t{}\t{}\t{}", name, ids.join(","), cigars.join(","))?;
    }
    Ok(())
}

/// The copy depths of a segment as a display string, three decimals each.
pub fn depth_string(graph: &AssemblyGraph, number: i64) -> String {
    match graph.copy_depths.get(&number) {
        Some(depths) => depths
            .iter()
            .map(|depth| format!("{:.3}", depth))
            .collect::<Vec<String>>()
            .join(", "),
        None => String::new(),
    }
}

/// Visualisation colour for a segment's copy number.
pub fn copy_number_colour(graph: &AssemblyGraph, number: i64) -> &'static str {
    match graph.copy_depths.get(&number).map(|depths| depths.len()) {
        None => "black",
        Some(1) => "forestgreen",
        Some(2) => "gold",
        Some(3) => "darkorange",
        Some(_) => "red",
    }
}
