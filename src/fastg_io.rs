/// FASTG reading and writing, FASTA export, contig-path sidecar loading
/// The FASTG flavour handled here is the SPAdes one: every strand of every
/// segment gets a header of the form
///   >EDGE_<id>_length_<len>_cov_<depth>['][:<neighbour>,<neighbour>...];
/// where a trailing apostrophe marks the reverse strand and the optional
/// neighbour list carries the strand's outgoing links.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use log::info;

use crate::error::GraphError;
use crate::graph::AssemblyGraph;
use crate::links::LinkStore;
use crate::segment::Segment;
use crate::sequence::wrap_sequence;
use crate::utils::signed_string_to_int;

const WRAP_WIDTH: usize = 60;

pub fn load_fastg(path: &str, overlap: usize) -> Result<AssemblyGraph, GraphError> {
    info!("Reading FASTG graph: {}", path);
    let (headers, sequences) = read_headers_and_sequences(path)?;

    let mut graph = AssemblyGraph::new(overlap);
    for (header, sequence) in headers.iter().zip(&sequences) {
        let number = header_number(header)?;
        let positive = header_is_positive(header);
        match graph.segments.get_mut(&number) {
            Some(segment) => segment.attach_sequence(sequence, positive),
            None => {
                let depth = header_depth(header)?;
                graph
                    .segments
                    .insert(number, Segment::new(number, depth, sequence, positive));
            }
        }
    }
    for segment in graph.segments.values_mut() {
        segment.derive_missing_strand();
    }

    let mut forward_map: HashMap<i64, Vec<i64>> = HashMap::new();
    for header in &headers {
        let (start, ends) = header_links(header)?;
        if !ends.is_empty() {
            forward_map.insert(start, ends);
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

/// Accumulate '>'-headed blocks into parallel header and sequence lists.
/// Headers are stored without the marker and without the trailing ';'.
fn read_headers_and_sequences(path: &str) -> Result<(Vec<String>, Vec<String>), GraphError> {
    let reader = BufReader::new(File::open(path)?);
    let mut headers: Vec<String> = Vec::new();
    let mut sequences: Vec<String> = Vec::new();
    let mut header = String::new();
    let mut sequence = String::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(stripped) = line.strip_prefix('>') {
            if !header.is_empty() {
                headers.push(header);
                sequences.push(sequence);
                sequence = String::new();
            }
            header = stripped.trim_end_matches(';').to_string();
        } else {
            sequence.push_str(line);
        }
    }
    if !header.is_empty() {
        headers.push(header);
        sequences.push(sequence);
    }
    Ok((headers, sequences))
}

/// The part of a header naming this strand, before any link list.
fn header_name(header: &str) -> &str {
    header.split(':').next().unwrap_or(header)
}

fn header_is_positive(header: &str) -> bool {
    !header_name(header).ends_with('\'')
}

fn header_number(header: &str) -> Result<i64, GraphError> {
    let name = header_name(header);
    name.split('_')
        .nth(1)
        .and_then(|field| field.parse::<i64>().ok())
        .filter(|number| *number > 0)
        .ok_or_else(|| GraphError::new(&format!("unparseable header '{}'", name)))
}

fn header_signed_number(header: &str) -> Result<i64, GraphError> {
    let number = header_number(header)?;
    Ok(if header_is_positive(header) { number } else { -number })
}

fn header_depth(header: &str) -> Result<f64, GraphError> {
    let name = header_name(header).trim_end_matches('\'');
    name.split('_')
        .nth(5)
        .and_then(|field| field.parse::<f64>().ok())
        .ok_or_else(|| GraphError::new(&format!("unparseable coverage in header '{}'", name)))
}

/// A header's outgoing links: the strand it names and the strands listed
/// after the colon, if any.
fn header_links(header: &str) -> Result<(i64, Vec<i64>), GraphError> {
    let start = header_signed_number(header)?;
    let mut ends: Vec<i64> = Vec::new();
    if let Some((_, link_list)) = header.split_once(':') {
        for piece in link_list.split(',') {
            let end = header_signed_number(piece)?;
            if !ends.contains(&end) {
                ends.push(end);
            }
        }
    }
    Ok((start, ends))
}

/// One strand's header, without the leading '>' or closing ';'.
fn fastg_header(segment: &Segment, positive: bool) -> String {
    let mut header = format!(
        "EDGE_{}_length_{}_cov_{}",
        segment.number,
        segment.length(),
        segment.depth
    );
    if !positive {
        header.push('\'');
    }
    header
}

fn fastg_header_with_links(graph: &AssemblyGraph, segment: &Segment, positive: bool) -> String {
    let signed = if positive { segment.number } else { -segment.number };
    let mut header = format!(">{}", fastg_header(segment, positive));
    let nexts = graph.links.outgoing(signed);
    if !nexts.is_empty() {
        let neighbour_headers: Vec<String> = nexts
            .iter()
            .map(|next| fastg_header(&graph.segments[&next.abs()], *next > 0))
            .collect();
        header.push(':');
        header.push_str(&neighbour_headers.join(","));
    }
    header.push_str(";\n");
    header
}

pub fn save_fastg(graph: &AssemblyGraph, path: &str) -> std::io::Result<()> {
    info!("Writing FASTG graph: {}", path);
    let mut file = File::create(path)?;
    let mut numbers: Vec<i64> = graph.segments.keys().copied().collect();
    numbers.sort_unstable();
    for number in numbers {
        let segment = &graph.segments[&number];
        file.write_all(fastg_header_with_links(graph, segment, true).as_bytes())?;
        file.write_all(wrap_sequence(&segment.forward_sequence, WRAP_WIDTH).as_bytes())?;
        file.write_all(fastg_header_with_links(graph, segment, false).as_bytes())?;
        file.write_all(wrap_sequence(&segment.reverse_sequence, WRAP_WIDTH).as_bytes())?;
    }
    Ok(())
}

/// Plain FASTA of the forward sequences.
pub fn save_fasta(graph: &AssemblyGraph, path: &str) -> std::io::Result<()> {
    info!("Writing FASTA: {}", path);
    let mut file = File::create(path)?;
    let mut numbers: Vec<i64> = graph.segments.keys().copied().collect();
    numbers.sort_unstable();
    for number in numbers {
        let segment = &graph.segments[&number];
        writeln!(file, ">{}", segment.number)?;
        file.write_all(wrap_sequence(&segment.forward_sequence, WRAP_WIDTH).as_bytes())?;
    }
    Ok(())
}

/// Load contig paths from the sidecar file that accompanies a FASTG graph.
/// Blocks are headed by NODE lines; bodies are comma-separated signed ids,
/// with ';' breaking a block into independent sub-paths. Reverse-strand
/// blocks and single-segment sub-paths are dropped, and a block with
/// several kept sub-paths stores them under numbered names.
pub fn load_contig_paths(graph: &mut AssemblyGraph, path: &str) -> Result<(), GraphError> {
    info!("Reading contig paths: {}", path);
    let reader = BufReader::new(File::open(path)?);

    let mut names: Vec<String> = Vec::new();
    let mut bodies: Vec<String> = Vec::new();
    let mut name = String::new();
    let mut body = String::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("NODE") {
            if !name.is_empty() {
                names.push(name);
                bodies.push(body);
                body = String::new();
            }
            name = line.to_string();
        } else {
            body.push_str(line);
        }
    }
    if !name.is_empty() {
        names.push(name);
        bodies.push(body);
    }

    for (name, body) in names.iter().zip(&bodies) {
        if name.ends_with('\'') {
            continue;
        }
        let name_parts: Vec<&str> = name.split('_').collect();
        if name_parts.len() < 2 || body.is_empty() {
            continue;
        }
        let short_name = name_parts[..2].join("_");
        let sub_paths: Vec<&str> = body
            .split(';')
            .filter(|part| part.split(',').count() > 1)
            .collect();
        for (i, sub_path) in sub_paths.iter().enumerate() {
            let mut path_name = short_name.clone();
            if sub_paths.len() > 1 {
                path_name.push_str(&format!("_{}", i + 1));
            }
            let segments = sub_path
                .split(',')
                .map(signed_string_to_int)
                .collect::<Result<Vec<i64>, GraphError>>()?;
            graph.paths.insert(path_name, segments);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(name)
            .to_str()
            .unwrap()
            .to_string()
    }

    fn small_graph() -> AssemblyGraph {
        let mut graph = AssemblyGraph::new(3);
        for (number, depth, seq) in [(1, 10.0, "ACGTACG"), (2, 20.5, "ACGTTTT")] {
            let mut segment = Segment::new(number, depth, seq, true);
            segment.derive_missing_strand();
            graph.add_segment(segment);
        }
        graph.add_link(1, 2);
        graph
    }

    #[test]
    fn test_fastg_round_trip() {
        let path = temp_path("round_trip.fastg");
        save_fastg(&small_graph(), &path).unwrap();
        let graph = load_fastg(&path, 3).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(graph.segments.len(), 2);
        assert_eq!(graph.segments[&1].forward_sequence, "ACGTACG");
        assert_eq!(graph.segments[&2].reverse_sequence, "AAAACGT");
        assert!((graph.segments[&2].depth - 20.5).abs() < 1e-9);
        assert_eq!(graph.links.outgoing(1), &[2]);
        assert_eq!(graph.links.outgoing(-2), &[-1]);
    }

    #[test]
    fn test_fastg_headers_carry_links_and_strands() {
        let path = temp_path("headers.fastg");
        save_fastg(&small_graph(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(written.contains(">EDGE_1_length_7_cov_10:EDGE_2_length_7_cov_20.5;\n"));
        assert!(written.contains(">EDGE_1_length_7_cov_10';\n"));
        assert!(written.contains(">EDGE_2_length_7_cov_20.5':EDGE_1_length_7_cov_10';\n"));
    }

    #[test]
    fn test_fastg_long_sequences_are_wrapped() {
        let mut graph = AssemblyGraph::new(0);
        let mut segment = Segment::new(1, 1.0, &"A".repeat(130), true);
        segment.derive_missing_strand();
        graph.add_segment(segment);
        let path = temp_path("wrapped.fastg");
        save_fastg(&graph, &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        let longest_line = written.lines().map(str::len).max().unwrap();
        assert!(longest_line <= 60);
        // and the graph still loads back whole
        let reload_path = temp_path("wrapped_reload.fastg");
        fs::write(&reload_path, &written).unwrap();
        let reloaded = load_fastg(&reload_path, 0).unwrap();
        fs::remove_file(&reload_path).unwrap();
        assert_eq!(reloaded.segments[&1].length(), 130);
    }

    #[test]
    fn test_save_fasta() {
        let path = temp_path("export.fasta");
        save_fasta(&small_graph(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(written, ">1\nACGTACG\n>2\nACGTTTT\n");
    }

    #[test]
    fn test_load_contig_paths() {
        let path = temp_path("contigs.paths");
        fs::write(
            &path,
            "NODE_1_length_100_cov_5\n1+,2-\nNODE_1_length_100_cov_5'\n2+,1-\n\
             NODE_2_length_80_cov_4\n3+,4+;5-,6+\nNODE_3_length_10_cov_2\n7+\n",
        )
        .unwrap();
        let mut graph = AssemblyGraph::new(0);
        load_contig_paths(&mut graph, &path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(graph.paths["NODE_1"], vec![1, -2]);
        assert_eq!(graph.paths["NODE_2_1"], vec![3, 4]);
        assert_eq!(graph.paths["NODE_2_2"], vec![-5, 6]);
        // reverse-strand block and single-segment path are dropped
        assert_eq!(graph.paths.len(), 3);
    }

    #[test]
    fn test_load_rejects_bad_header() {
        let path = temp_path("bad_header.fastg");
        fs::write(&path, ">EDGE_one_length_4_cov_1;\nACGT\n").unwrap();
        let result = load_fastg(&path, 0);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
