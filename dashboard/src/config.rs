//! Behavioral constants for plot lookup and page rendering.

pub const DEFAULT_VERSION_PREFIX: &str = "v";
pub const DEFAULT_SPLITS: &[&str] = &["Dev", "Train"];
pub const DEFAULT_LEGACY_DISTRIBUTIONS: &[&str] = &["uniform", "zipf_query_len", "zipf_random"];

pub const DEFAULT_IMAGES_PER_ROW: usize = 2;
pub const MAX_IMAGES_PER_ROW: usize = 3;

/// Benchmark label for gallery files whose names don't follow the convention.
pub const UNKNOWN_BENCHMARK: &str = "Unknown";

pub const SAMPLING_METHOD_SUFFIX: &str = "_sampling_method_distribution";
pub const GROUPED_SUFFIX: &str = "_grouped";
pub const LITERAL_SUFFIX: &str = "_literal_distribution";
pub const DISTRIBUTION_TITLE_SEPARATOR: &str = "_-_";

pub const IMAGE_EXTENSION: &str = "png";
