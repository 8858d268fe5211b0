use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::IMAGE_EXTENSION;
use crate::error::{DashboardError, Result};
use crate::filename::{self, PlotSubject};
use crate::layout_config::LayoutConfig;
use crate::paths::{DISTRIBUTION_PLOTS_DIR, LITERAL_PLOTS_DIR, SAMPLING_METHOD_PLOTS_DIR};

/// The three plot families rendered side by side on the viewer page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Distribution,
    Literal,
    SamplingMethod,
}

impl PlotKind {
    pub const ALL: [PlotKind; 3] = [
        PlotKind::Distribution,
        PlotKind::Literal,
        PlotKind::SamplingMethod,
    ];

    pub fn root_dir(&self) -> &'static str {
        match self {
            PlotKind::Distribution => DISTRIBUTION_PLOTS_DIR,
            PlotKind::Literal => LITERAL_PLOTS_DIR,
            PlotKind::SamplingMethod => SAMPLING_METHOD_PLOTS_DIR,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlotKind::Distribution => "Distribution Comparison",
            PlotKind::Literal => "Literal Distribution",
            PlotKind::SamplingMethod => "Sampling Method Distribution",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PlotKind::Distribution => {
                "Initial template distribution compared with the generated distribution."
            }
            PlotKind::Literal => {
                "Queries and original templates per masked literal count."
            }
            PlotKind::SamplingMethod => "Sampling method mix per masked literal count.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotSelection {
    pub version: String,
    pub split: String,
    pub distribution: String,
    pub subject: PlotSubject,
}

#[derive(Debug, Clone)]
pub struct GalleryImage {
    /// Path relative to the plots root, `/`-separated.
    pub relative: String,
    pub file_name: String,
    pub subject: PlotSubject,
    pub modified: Option<DateTime<Local>>,
}

/// Read-only view over the plot trees under one root directory.
pub struct PlotCatalog {
    root: PathBuf,
    layout: LayoutConfig,
}

/// Names of the child directories of `dir`. Missing or unreadable
/// directories list as empty.
fn subdirs(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect()
}

/// Image files directly inside `dir`, sorted by file name.
fn image_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
        })
        .collect();
    files.sort();
    files
}

fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Sort key putting `v16` after `v9`: the number following the prefix, then
/// the full name.
fn version_key(name: &str, prefix: &str) -> (Option<u64>, String) {
    let digits: String = name
        .strip_prefix(prefix)
        .unwrap_or(name)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    (digits.parse().ok(), name.to_owned())
}

pub fn content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

impl PlotCatalog {
    pub fn new(root: PathBuf, layout: LayoutConfig) -> Self {
        PlotCatalog { root, layout }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    fn kind_dir(&self, kind: PlotKind) -> PathBuf {
        self.root.join(kind.root_dir())
    }

    fn selection_dir(&self, kind: PlotKind, version: &str, split: &str, distribution: &str) -> PathBuf {
        self.kind_dir(kind).join(version).join(split).join(distribution)
    }

    fn legacy_distribution_dir(&self, version: &str, distribution: &str) -> Option<PathBuf> {
        self.layout
            .legacy_distributions
            .iter()
            .any(|d| d == distribution)
            .then(|| self.kind_dir(PlotKind::Distribution).join(version).join(distribution))
    }

    fn sort_versions(&self, names: impl IntoIterator<Item = String>) -> Vec<String> {
        let prefix = self.layout.version_prefix.as_str();
        let unique: BTreeSet<String> = names
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect();

        let mut versions: Vec<String> = unique.into_iter().collect();
        versions.sort_by_key(|name| Reverse(version_key(name, prefix)));
        versions
    }

    /// Version directories across every plot tree, newest first.
    pub fn versions(&self) -> Vec<String> {
        self.sort_versions(
            PlotKind::ALL
                .iter()
                .flat_map(|&kind| subdirs(&self.kind_dir(kind))),
        )
    }

    pub fn splits(&self, version: &str) -> Vec<String> {
        let splits: BTreeSet<String> = PlotKind::ALL
            .iter()
            .flat_map(|&kind| subdirs(&self.kind_dir(kind).join(version)))
            .filter(|name| self.layout.splits.contains(name))
            .collect();
        splits.into_iter().collect()
    }

    pub fn distributions(&self, version: &str, split: &str) -> Vec<String> {
        let mut distributions: BTreeSet<String> = PlotKind::ALL
            .iter()
            .flat_map(|&kind| subdirs(&self.kind_dir(kind).join(version).join(split)))
            .collect();

        distributions.extend(
            subdirs(&self.kind_dir(PlotKind::Distribution).join(version))
                .into_iter()
                .filter(|name| self.layout.legacy_distributions.contains(name)),
        );

        distributions.into_iter().collect()
    }

    /// Benchmark -> databases with at least one plot for this selection.
    pub fn benchmarks_and_dbs(
        &self,
        version: &str,
        split: &str,
        distribution: &str,
    ) -> BTreeMap<String, BTreeSet<String>> {
        let mut subjects: Vec<PlotSubject> = Vec::new();

        let sampling = self.selection_dir(PlotKind::SamplingMethod, version, split, distribution);
        subjects.extend(
            image_files(&sampling)
                .iter()
                .filter_map(|path| file_stem(path))
                .filter_map(filename::parse_sampling_method_stem),
        );

        let literal = self.selection_dir(PlotKind::Literal, version, split, distribution);
        subjects.extend(
            image_files(&literal)
                .iter()
                .filter_map(|path| file_stem(path))
                .filter_map(filename::parse_literal_stem),
        );

        let comparison = self.selection_dir(PlotKind::Distribution, version, split, distribution);
        subjects.extend(
            image_files(&comparison)
                .iter()
                .filter_map(|path| file_stem(path))
                .filter_map(|stem| filename::parse_distribution_stem(stem, split)),
        );

        if let Some(legacy) = self.legacy_distribution_dir(version, distribution) {
            let split_prefix = format!("{split}_");
            subjects.extend(
                image_files(&legacy)
                    .iter()
                    .filter_map(|path| file_stem(path))
                    .filter(|stem| stem.starts_with(&split_prefix))
                    .filter_map(|stem| filename::parse_distribution_stem(stem, split)),
            );
        }

        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for subject in subjects {
            map.entry(subject.benchmark)
                .or_default()
                .insert(subject.database);
        }
        map
    }

    /// Finds the plot of `kind` for a selection, or `None` when nothing on
    /// disk matches.
    pub fn find_plot(&self, kind: PlotKind, selection: &PlotSelection) -> Option<PathBuf> {
        let PlotSelection {
            version,
            split,
            distribution,
            subject,
        } = selection;

        match kind {
            PlotKind::Distribution => {
                let exact = filename::distribution_file_name(split, subject, distribution);
                let prefix = filename::distribution_prefix(split, subject);
                let find_in = |dir: &Path| {
                    let path = dir.join(&exact);
                    if path.is_file() {
                        return Some(path);
                    }
                    image_files(dir)
                        .into_iter()
                        .find(|path| file_name(path).is_some_and(|name| name.starts_with(&prefix)))
                };

                find_in(&self.selection_dir(kind, version, split, distribution)).or_else(|| {
                    self.legacy_distribution_dir(version, distribution)
                        .and_then(|dir| find_in(&dir))
                })
            }
            PlotKind::SamplingMethod => {
                let dir = self.selection_dir(kind, version, split, distribution);
                [true, false]
                    .into_iter()
                    .map(|grouped| dir.join(filename::sampling_method_file_name(subject, grouped)))
                    .find(|path| path.is_file())
            }
            PlotKind::Literal => {
                let path = self
                    .selection_dir(kind, version, split, distribution)
                    .join(filename::literal_file_name(subject));
                path.is_file().then_some(path)
            }
        }
    }

    /// Versions present in the sampling-method tree, newest first.
    pub fn gallery_versions(&self) -> Vec<String> {
        self.sort_versions(subdirs(&self.kind_dir(PlotKind::SamplingMethod)))
    }

    /// Split directories under a sampling-method version. Empty for flat
    /// version directories that hold the images directly.
    pub fn gallery_splits(&self, version: &str) -> Vec<String> {
        let mut splits: Vec<String> =
            subdirs(&self.kind_dir(PlotKind::SamplingMethod).join(version))
                .into_iter()
                .filter(|name| self.layout.splits.contains(name))
                .collect();
        splits.sort();
        splits
    }

    pub fn gallery_distributions(&self, version: &str, split: &str) -> Vec<String> {
        let mut distributions =
            subdirs(&self.kind_dir(PlotKind::SamplingMethod).join(version).join(split));
        distributions.sort();
        distributions
    }

    /// Directory browsed by the gallery. Split and distribution are optional
    /// so flat per-version directories still work.
    pub fn gallery_dir(&self, version: &str, split: Option<&str>, distribution: Option<&str>) -> PathBuf {
        let mut dir = self.kind_dir(PlotKind::SamplingMethod).join(version);
        if let Some(split) = split {
            dir.push(split);
            if let Some(distribution) = distribution {
                dir.push(distribution);
            }
        }
        dir
    }

    /// Every image in `dir`, sorted by file name. A missing directory gives
    /// an empty list.
    pub fn gallery_images(&self, dir: &Path) -> Vec<GalleryImage> {
        image_files(dir)
            .into_iter()
            .filter_map(|path| {
                let relative = self.relative(&path)?;
                let file_name = file_name(&path)?.to_owned();
                let modified = fs::metadata(&path)
                    .and_then(|meta| meta.modified())
                    .ok()
                    .map(DateTime::<Local>::from);
                Some(GalleryImage {
                    relative,
                    subject: filename::parse_gallery_name(&file_name),
                    file_name,
                    modified,
                })
            })
            .collect()
    }

    /// `/`-separated path of `path` relative to the plots root.
    pub fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Option<Vec<&str>> = relative
            .components()
            .map(|component| match component {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();
        Some(parts?.join("/"))
    }

    /// Maps a request path onto an image file inside one of the plot trees.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let requested = Path::new(relative);
        let mut components = requested.components();

        let tree = match components.next() {
            Some(Component::Normal(first)) => PlotKind::ALL
                .iter()
                .map(|kind| kind.root_dir())
                .find(|dir| first.to_str() == Some(*dir)),
            _ => None,
        };
        let Some(tree) = tree else {
            return Err(DashboardError::invalid_path(relative));
        };
        if !components.all(|c| matches!(c, Component::Normal(_)))
            || content_type(requested).is_none()
        {
            return Err(DashboardError::invalid_path(relative));
        }

        let path = self.root.join(requested);
        if !path.is_file() {
            return Err(DashboardError::not_found(relative));
        }

        // Symlinks must not lead outside the plot tree they sit in.
        let tree = self.root.join(tree).canonicalize()?;
        if !path.canonicalize()?.starts_with(&tree) {
            return Err(DashboardError::invalid_path(relative));
        }

        Ok(path)
    }
}
