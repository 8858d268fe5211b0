//! Directory and file names of the plot trees, relative to the plots root.

pub const DISTRIBUTION_PLOTS_DIR: &str = "distribution_plots";
pub const LITERAL_PLOTS_DIR: &str = "literal_distribution_plots";
pub const SAMPLING_METHOD_PLOTS_DIR: &str = "sampling_method_distribution_plots";

pub const LAYOUT_CONFIG_FILE: &str = "dashboard.toml";
