/// Run configurations for the subcommands. Each one can be built from the
/// command-line arguments or loaded whole from a YAML file.

use serde::Deserialize;

use crate::error::GraphError;

#[derive(Debug, Deserialize)]
pub struct StatsConfig {
    pub input_graph: String,
    #[serde(default)]
    pub overlap: usize,
}

#[derive(Debug, Deserialize)]
pub struct CleanConfig {
    pub input_graph: String,
    #[serde(default)]
    pub contig_paths: Option<String>,
    #[serde(default)]
    pub overlap: usize,
    #[serde(default = "default_read_depth_filter")]
    pub read_depth_filter: f64,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_clean_prefix")]
    pub output_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct CopyDepthConfig {
    pub input_graph: String,
    #[serde(default)]
    pub overlap: usize,
    #[serde(default = "default_min_single_copy_length")]
    pub min_single_copy_length: usize,
    #[serde(default = "default_error_margin")]
    pub error_margin: f64,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_depth_prefix")]
    pub output_prefix: String,
}

fn default_read_depth_filter() -> f64 {
    0.25
}

fn default_min_single_copy_length() -> usize {
    1000
}

fn default_error_margin() -> f64 {
    1.0
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_clean_prefix() -> String {
    "cleaned".to_string()
}

fn default_depth_prefix() -> String {
    "depths".to_string()
}

/// Load any of the run configurations from a YAML file.
pub fn load_yaml<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, GraphError> {
    let file = std::fs::File::open(path)?;
    serde_yaml::from_reader(file).map_err(|why| GraphError::new(&why.to_string()))
}
