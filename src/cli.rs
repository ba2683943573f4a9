use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "Veltig",
    version = "1.0",
    about = "Assembly graph cleanup and copy-depth annotation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable per-step debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report graph metrics
    Stats(StatsArgs),

    /// Repair, filter, merge and normalise a graph
    Clean(CleanArgs),

    /// Infer per-segment copy depths
    CopyDepth(CopyDepthArgs),
}

#[derive(Args)]
pub struct StatsArgs {
    /// Input graph file (GFA, or FASTG when the name ends in .fastg)
    #[arg(short = 'i', long)]
    pub input_graph: String,

    /// Link overlap size shared by the whole graph
    #[arg(short = 'k', long, default_value_t = 0)]
    pub overlap: usize,
}

impl From<&StatsArgs> for crate::configs::StatsConfig {
    fn from(args: &StatsArgs) -> Self {
        Self {
            input_graph: args.input_graph.clone(),
            overlap: args.overlap,
        }
    }
}

#[derive(Args)]
pub struct CleanArgs {
    /// Input graph file (GFA, or FASTG when the name ends in .fastg)
    #[arg(short = 'i', long)]
    pub input_graph: String,

    /// Contig-path sidecar file to load alongside the graph
    #[arg(long)]
    pub contig_paths: Option<String>,

    /// Link overlap size shared by the whole graph
    #[arg(short = 'k', long, default_value_t = 0)]
    pub overlap: usize,

    /// Relative read-depth cutoff for the depth filter
    #[arg(short = 'd', long, default_value_t = 0.25)]
    pub read_depth_filter: f64,

    /// Output directory
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: String,

    /// Output prefix
    #[arg(short = 'p', long, default_value = "cleaned")]
    pub output_prefix: String,

    /// YAML run configuration (replaces the other options)
    #[arg(long)]
    pub config: Option<String>,
}

impl From<&CleanArgs> for crate::configs::CleanConfig {
    fn from(args: &CleanArgs) -> Self {
        Self {
            input_graph: args.input_graph.clone(),
            contig_paths: args.contig_paths.clone(),
            overlap: args.overlap,
            read_depth_filter: args.read_depth_filter,
            output_dir: args.output_dir.clone(),
            output_prefix: args.output_prefix.clone(),
        }
    }
}

#[derive(Args)]
pub struct CopyDepthArgs {
    /// Input graph file (GFA, or FASTG when the name ends in .fastg)
    #[arg(short = 'i', long)]
    pub input_graph: String,

    /// Link overlap size shared by the whole graph
    #[arg(short = 'k', long, default_value_t = 0)]
    pub overlap: usize,

    /// Minimum length for a segment to be seeded as single copy
    #[arg(short = 'l', long, default_value_t = 1000)]
    pub min_single_copy_length: usize,

    /// Relative depth error allowed per assignment
    #[arg(short = 'e', long, default_value_t = 1.0)]
    pub error_margin: f64,

    /// Output directory
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: String,

    /// Output prefix
    #[arg(short = 'p', long, default_value = "depths")]
    pub output_prefix: String,

    /// YAML run configuration (replaces the other options)
    #[arg(long)]
    pub config: Option<String>,
}

impl From<&CopyDepthArgs> for crate::configs::CopyDepthConfig {
    fn from(args: &CopyDepthArgs) -> Self {
        Self {
            input_graph: args.input_graph.clone(),
            overlap: args.overlap,
            min_single_copy_length: args.min_single_copy_length,
            error_margin: args.error_margin,
            output_dir: args.output_dir.clone(),
            output_prefix: args.output_prefix.clone(),
        }
    }
}
