mod cli;
mod configs;
mod copy_depth;
mod depth_filter;
mod error;
mod fastg_io;
mod gfa_io;
mod graph;
mod graph_analysis;
mod junction_repair;
mod links;
mod logger;
mod merge;
mod paths;
mod segment;
mod sequence;
mod utils;

use clap::Parser;
use log::info;

use cli::{Cli, Commands};
use error::GraphError;
use graph::AssemblyGraph;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match &cli.command {
        Commands::Stats(args) => {
            let config: configs::StatsConfig = args.into();
            let graph = load_graph(&config.input_graph, config.overlap)?;
            report_stats(&graph);
        }
        Commands::Clean(args) => {
            let config: configs::CleanConfig = match &args.config {
                Some(path) => configs::load_yaml(path)?,
                None => args.into(),
            };
            let mut graph = load_graph(&config.input_graph, config.overlap)?;
            if let Some(contig_paths) = &config.contig_paths {
                fastg_io::load_contig_paths(&mut graph, contig_paths)?;
            }

            let segments_before = graph.segments.len();
            graph.clean(config.read_depth_filter);
            info!(
                "Cleanup finished: {} of {} segments remain, {} dead ends",
                graph.segments.len(),
                segments_before,
                graph_analysis::total_dead_ends(&graph)
            );

            let out_dir = std::path::Path::new(&config.output_dir);
            std::fs::create_dir_all(out_dir)?;
            let gfa_path = out_dir.join(format!("{}.gfa", config.output_prefix));
            gfa_io::save_gfa(&graph, gfa_path.to_str().ok_or("invalid output path")?)?;
            let fastg_path = out_dir.join(format!("{}.fastg", config.output_prefix));
            fastg_io::save_fastg(&graph, fastg_path.to_str().ok_or("invalid output path")?)?;
            let fasta_path = out_dir.join(format!("{}.fasta", config.output_prefix));
            fastg_io::save_fasta(&graph, fasta_path.to_str().ok_or("invalid output path")?)?;
        }
        Commands::CopyDepth(args) => {
            let config: configs::CopyDepthConfig = match &args.config {
                Some(path) => configs::load_yaml(path)?,
                None => args.into(),
            };
            let mut graph = load_graph(&config.input_graph, config.overlap)?;
            copy_depth::determine_copy_depth(
                &mut graph,
                config.min_single_copy_length,
                config.error_margin,
            );
            info!(
                "Assigned copy depths to {} of {} segments",
                graph.copy_depths.len(),
                graph.segments.len()
            );

            let out_dir = std::path::Path::new(&config.output_dir);
            std::fs::create_dir_all(out_dir)?;
            let gfa_path = out_dir.join(format!("{}.gfa", config.output_prefix));
            gfa_io::save_gfa(&graph, gfa_path.to_str().ok_or("invalid output path")?)?;
        }
    }

    Ok(())
}

/// Pick the codec from the file name: FASTG for .fastg, GFA otherwise.
fn load_graph(path: &str, overlap: usize) -> Result<AssemblyGraph, GraphError> {
    if path.ends_with(".fastg") {
        fastg_io::load_fastg(path, overlap)
    } else {
        gfa_io::load_gfa(path, overlap)
    }
}

fn report_stats(graph: &AssemblyGraph) {
    let branching = graph
        .segments
        .keys()
        .filter(|number| {
            graph_analysis::all_outputs(graph, **number).len() > 1
                || graph_analysis::all_inputs(graph, **number).len() > 1
        })
        .count();
    println!("Segments:                  {}", graph.segments.len());
    println!("Links:                     {}", graph.links.entry_count());
    println!("Paths:                     {}", graph.paths.len());
    println!("Branching segments:        {}", branching);
    println!("Total length:              {}", graph.total_length());
    println!("Total length (no overlap): {}", graph.total_length_no_overlap());
    println!("N50:                       {}", graph.n_segment_length(50.0));
    println!("Median depth (by base):    {}", graph.median_depth_by_base());
    println!("Dead ends:                 {}", graph_analysis::total_dead_ends(graph));
    println!(
        "Connected components:      {}",
        graph_analysis::connected_components(graph).len()
    );
}
