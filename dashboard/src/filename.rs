//! Plot file naming conventions.
//!
//! Every plot names its benchmark and database as `{Benchmark}_{DB}`, with a
//! kind-specific prefix or suffix around it. Benchmarks never contain `_`, so
//! the first underscore separates the two; database names keep any further
//! underscores (`BIRD_codebase_community`).

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{
    DISTRIBUTION_TITLE_SEPARATOR, GROUPED_SUFFIX, IMAGE_EXTENSION, LITERAL_SUFFIX,
    SAMPLING_METHOD_SUFFIX, UNKNOWN_BENCHMARK,
};

static GALLERY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)_(.+?)_sampling_method_distribution(?:_grouped)?\.png$")
        .expect("gallery file pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlotSubject {
    pub benchmark: String,
    pub database: String,
}

impl PlotSubject {
    pub fn new(benchmark: impl Into<String>, database: impl Into<String>) -> Self {
        PlotSubject {
            benchmark: benchmark.into(),
            database: database.into(),
        }
    }
}

fn split_subject(name: &str) -> Option<PlotSubject> {
    let (benchmark, database) = name.split_once('_')?;
    if benchmark.is_empty() || database.is_empty() {
        return None;
    }
    Some(PlotSubject::new(benchmark, database))
}

/// `{Benchmark}_{DB}_sampling_method_distribution[_grouped]`
pub fn parse_sampling_method_stem(stem: &str) -> Option<PlotSubject> {
    let name = stem.strip_suffix(GROUPED_SUFFIX).unwrap_or(stem);
    let name = name.strip_suffix(SAMPLING_METHOD_SUFFIX).unwrap_or(name);
    split_subject(name)
}

/// `{Split}_{Benchmark}_{DB}_-_{Distribution Title}_Distribution`
pub fn parse_distribution_stem(stem: &str, split: &str) -> Option<PlotSubject> {
    let name = stem
        .strip_prefix(split)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(stem);
    let name = match name.split_once(DISTRIBUTION_TITLE_SEPARATOR) {
        Some((head, _)) => head,
        None => name,
    };
    split_subject(name)
}

/// `{Benchmark}_{DB}_literal_distribution`
pub fn parse_literal_stem(stem: &str) -> Option<PlotSubject> {
    split_subject(stem.strip_suffix(LITERAL_SUFFIX).unwrap_or(stem))
}

/// Parses a gallery file name. Names off the convention are kept under the
/// `Unknown` benchmark with the stem as database.
pub fn parse_gallery_name(file_name: &str) -> PlotSubject {
    if let Some(caps) = GALLERY_PATTERN.captures(file_name) {
        return PlotSubject::new(&caps[1], &caps[2]);
    }
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    PlotSubject::new(UNKNOWN_BENCHMARK, stem)
}

/// Title-cases a distribution name: `zipf_query_len` -> `Zipf Query Len`.
pub fn distribution_title(distribution: &str) -> String {
    let mut title = String::with_capacity(distribution.len());
    let mut prev_alpha = false;
    for c in distribution.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_alpha {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            title.push(c);
            prev_alpha = false;
        }
    }
    title
}

pub fn distribution_file_name(
    split: &str,
    subject: &PlotSubject,
    distribution: &str,
) -> String {
    format!(
        "{split}_{}_{}{DISTRIBUTION_TITLE_SEPARATOR}{}_Distribution.{IMAGE_EXTENSION}",
        subject.benchmark,
        subject.database,
        distribution_title(distribution).replace(' ', "_"),
    )
}

/// Prefix shared by every distribution plot of a subject, whatever its title.
/// Ends at the title separator so `formula` never matches `formula_1`.
pub fn distribution_prefix(split: &str, subject: &PlotSubject) -> String {
    format!(
        "{split}_{}_{}{DISTRIBUTION_TITLE_SEPARATOR}",
        subject.benchmark, subject.database
    )
}

pub fn sampling_method_file_name(subject: &PlotSubject, grouped: bool) -> String {
    format!(
        "{}_{}{SAMPLING_METHOD_SUFFIX}{}.{IMAGE_EXTENSION}",
        subject.benchmark,
        subject.database,
        if grouped { GROUPED_SUFFIX } else { "" },
    )
}

pub fn literal_file_name(subject: &PlotSubject) -> String {
    format!(
        "{}_{}{LITERAL_SUFFIX}.{IMAGE_EXTENSION}",
        subject.benchmark, subject.database
    )
}
