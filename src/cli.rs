//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use tiercloud::pipeline::{DEFAULT_ASSIGNMENT, DEFAULT_TREE, DEFAULT_VOCABULARY, DEFAULT_WEIGHTS};
use tiercloud::CloudConfig;

/// tiercloud - word clouds for every node of a cluster hierarchy
///
/// Reads a document weight matrix, its vocabulary, a cluster assignment and
/// a merge tree over the clusters, then writes one PNG per tree node.
///
/// Examples:
///   tiercloud
///   tiercloud --prefix clouds/ward_
///   tiercloud --weights tfidf.json --tree linkage.json -v
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Document weight matrix (dense rows or CSR JSON)
    #[arg(long, default_value = DEFAULT_WEIGHTS, value_name = "FILE")]
    pub weights: PathBuf,

    /// Vocabulary, one term per matrix column
    #[arg(long, default_value = DEFAULT_VOCABULARY, value_name = "FILE")]
    pub vocabulary: PathBuf,

    /// Cluster id of each leading document
    #[arg(long, default_value = DEFAULT_ASSIGNMENT, value_name = "FILE")]
    pub labels: PathBuf,

    /// Cluster hierarchy (arena or linkage JSON)
    #[arg(long, default_value = DEFAULT_TREE, value_name = "FILE")]
    pub tree: PathBuf,

    /// Prepended to every output file name; may include a directory
    #[arg(short, long, default_value = "")]
    pub prefix: String,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::WARN
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Run configuration for these arguments.
    pub fn to_config(&self) -> CloudConfig {
        CloudConfig::new()
            .with_inputs(&self.weights, &self.vocabulary, &self.labels, &self.tree)
            .with_prefix(self.prefix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["tiercloud"]).unwrap();
        let config = args.to_config();
        assert_eq!(config.weights_path, PathBuf::from("Tfidf_Matrix.json"));
        assert_eq!(config.tree_path, PathBuf::from("ward_tree.json"));
        assert!(config.prefix.is_empty());
        assert_eq!(config.output_path(3), PathBuf::from("cloud3.png"));
    }

    #[test]
    fn test_paths_and_prefix() {
        let args = Args::try_parse_from([
            "tiercloud",
            "--weights",
            "m.json",
            "--labels",
            "l.json",
            "-p",
            "out/",
        ])
        .unwrap();
        let config = args.to_config();
        assert_eq!(config.weights_path, PathBuf::from("m.json"));
        assert_eq!(config.assignment_path, PathBuf::from("l.json"));
        assert_eq!(config.output_path(0), PathBuf::from("out/cloud0.png"));
    }

    #[test]
    fn test_log_level() {
        let mut args = Args::try_parse_from(["tiercloud"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["tiercloud", "-v", "-q"]).is_err());
    }
}
