use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use maud::{Markup, html};

use crate::catalog::{GalleryImage, PlotCatalog};
use crate::config::MAX_IMAGES_PER_ROW;
use crate::state::AppState;
use crate::styles::{Layout, Plots};

use super::{
    Notice, Page, SelectField, download_url, metric, notice, page_shell, pick, plot_url,
    select_field,
};

const FORM_ID: &str = "gallery-filters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Grid,
    List,
}

impl DisplayMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "grid" => Some(DisplayMode::Grid),
            "list" => Some(DisplayMode::List),
            _ => None,
        }
    }

    fn key(&self) -> &'static str {
        match self {
            DisplayMode::Grid => "grid",
            DisplayMode::List => "list",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DisplayMode::Grid => "Grid view",
            DisplayMode::List => "List view",
        }
    }
}

/// Gallery query string. Benchmarks and databases repeat, so this is built
/// from raw pairs rather than a derived struct.
#[derive(Debug, Default, Clone)]
pub struct GalleryQuery {
    pub version: Option<String>,
    pub split: Option<String>,
    pub distribution: Option<String>,
    pub benchmarks: Vec<String>,
    pub databases: Vec<String>,
    pub per_row: Option<usize>,
    pub mode: Option<DisplayMode>,
}

impl GalleryQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = GalleryQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "version" => query.version = Some(value),
                "split" => query.split = Some(value),
                "distribution" => query.distribution = Some(value),
                "benchmark" => query.benchmarks.push(value),
                "database" => query.databases.push(value),
                "per_row" => query.per_row = value.parse().ok(),
                "mode" => query.mode = DisplayMode::parse(&value),
                _ => {}
            }
        }
        query
    }
}

/// Keeps only requested values that exist. An empty result means "all".
fn effective_filter(requested: &[String], available: &BTreeSet<String>) -> BTreeSet<String> {
    let chosen: BTreeSet<String> = requested
        .iter()
        .filter(|value| available.contains(*value))
        .cloned()
        .collect();
    if chosen.is_empty() {
        available.clone()
    } else {
        chosen
    }
}

pub fn filter_images<'a>(
    images: &'a [GalleryImage],
    benchmarks: &BTreeSet<String>,
    databases: &BTreeSet<String>,
) -> Vec<&'a GalleryImage> {
    images
        .iter()
        .filter(|image| {
            benchmarks.contains(&image.subject.benchmark)
                && databases.contains(&image.subject.database)
        })
        .collect()
}

#[derive(Debug)]
pub struct GalleryState {
    pub fields: Vec<SelectField>,
    pub directory: Option<PathBuf>,
    pub images: Vec<GalleryImage>,
    pub benchmark_options: BTreeSet<String>,
    pub database_options: BTreeSet<String>,
    pub selected_benchmarks: BTreeSet<String>,
    pub selected_databases: BTreeSet<String>,
    pub per_row: usize,
    pub mode: DisplayMode,
}

impl GalleryState {
    pub fn filtered(&self) -> Vec<&GalleryImage> {
        filter_images(
            &self.images,
            &self.selected_benchmarks,
            &self.selected_databases,
        )
    }
}

pub fn resolve(catalog: &PlotCatalog, query: &GalleryQuery) -> GalleryState {
    let per_row = query
        .per_row
        .filter(|n| (1..=MAX_IMAGES_PER_ROW).contains(n))
        .unwrap_or(catalog.layout().default_images_per_row);
    let mut state = GalleryState {
        fields: Vec::new(),
        directory: None,
        images: Vec::new(),
        benchmark_options: BTreeSet::new(),
        database_options: BTreeSet::new(),
        selected_benchmarks: BTreeSet::new(),
        selected_databases: BTreeSet::new(),
        per_row,
        mode: query.mode.unwrap_or_default(),
    };

    let versions = catalog.gallery_versions();
    let Some(version) = pick(query.version.as_deref(), &versions).cloned() else {
        return state;
    };
    state.fields.push(SelectField {
        name: "version",
        label: "Version",
        options: versions,
        selected: version.clone(),
    });

    let splits = catalog.gallery_splits(&version);
    let split = pick(query.split.as_deref(), &splits).cloned();
    let mut distribution = None;
    if let Some(split) = &split {
        let distributions = catalog.gallery_distributions(&version, split);
        distribution = pick(query.distribution.as_deref(), &distributions).cloned();
        state.fields.push(SelectField {
            name: "split",
            label: "Split",
            options: splits,
            selected: split.clone(),
        });
        if let Some(distribution) = &distribution {
            state.fields.push(SelectField {
                name: "distribution",
                label: "Distribution",
                options: distributions,
                selected: distribution.clone(),
            });
        }
    }

    let directory = catalog.gallery_dir(&version, split.as_deref(), distribution.as_deref());
    state.images = catalog.gallery_images(&directory);
    state.directory = Some(directory);

    state.benchmark_options = state
        .images
        .iter()
        .map(|image| image.subject.benchmark.clone())
        .collect();
    state.database_options = state
        .images
        .iter()
        .map(|image| image.subject.database.clone())
        .collect();
    state.selected_benchmarks = effective_filter(&query.benchmarks, &state.benchmark_options);
    state.selected_databases = effective_filter(&query.databases, &state.database_options);
    state
}

pub async fn gallery(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Markup {
    let catalog = &state.catalog;
    let query = GalleryQuery::from_pairs(pairs);
    let gallery = resolve(catalog, &query);
    let filtered = gallery.filtered();
    tracing::debug!(
        directory = ?gallery.directory,
        total = gallery.images.len(),
        filtered = filtered.len(),
        "resolved sampling gallery"
    );

    let sidebar = html! {
        h2 { "Filters" }
        form #(FORM_ID) method="get" action="/gallery" {
            @for field in &gallery.fields {
                (select_field(field, FORM_ID, true))
            }
            @if !gallery.images.is_empty() {
                (multi_select("benchmark", "Benchmarks", &gallery.benchmark_options, &gallery.selected_benchmarks))
                (multi_select("database", "Databases", &gallery.database_options, &gallery.selected_databases))
                hr;
                (metric("Total images", gallery.images.len()))
                (metric("Filtered images", filtered.len()))
                hr;
                h2 { "Display" }
                label.(Layout::FIELD) {
                    span { "Images per row" }
                    select name="per_row" {
                        @for n in 1..=MAX_IMAGES_PER_ROW {
                            option value=(n) selected[n == gallery.per_row] { (n) }
                        }
                    }
                }
                div.(Layout::FIELD) {
                    span { "Display mode" }
                    @for mode in [DisplayMode::Grid, DisplayMode::List] {
                        label {
                            input type="radio" name="mode" value=(mode.key()) checked[mode == gallery.mode];
                            " " (mode.label())
                        }
                    }
                }
            }
            button type="submit" { "Apply" }
        }
    };

    let content = html! {
        h1 { "Sampling Method Distribution Dashboard" }
        p.(Layout::SUMMARY) {
            "Sampling method distributions per benchmark and database. "
            "Use the sidebar to filter by benchmark and database."
        }
        @if gallery.images.is_empty() {
            @let location = gallery
                .directory
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| catalog.root().display().to_string());
            (notice(&Notice::error(format!("No image files found. Check the path: {location}"))))
        } @else if filtered.is_empty() {
            (notice(&Notice::warning("No images match the selected filters. Adjust the filters.")))
        } @else {
            @match gallery.mode {
                DisplayMode::Grid => { (render_grid(&filtered, gallery.per_row)) }
                DisplayMode::List => { (render_list(&filtered)) }
            }
        }
        hr;
        div.(Layout::FOOTER) { "Sampling Method Distribution Dashboard" }
    };

    page_shell(
        "Sampling Method Distribution Dashboard",
        Page::Gallery,
        sidebar,
        content,
    )
}

fn multi_select(
    name: &str,
    label: &str,
    options: &BTreeSet<String>,
    selected: &BTreeSet<String>,
) -> Markup {
    html! {
        label.(Layout::FIELD) {
            span { (label) }
            select name=(name) multiple size=(options.len().clamp(2, 8)) {
                @for option in options {
                    option value=(option) selected[selected.contains(option)] { (option) }
                }
            }
        }
    }
}

fn render_grid(images: &[&GalleryImage], per_row: usize) -> Markup {
    html! {
        @for row in images.chunks(per_row) {
            div.(Plots::PANEL_ROW) style=(format!("grid-template-columns: repeat({per_row}, minmax(0, 1fr))")) {
                @for image in row {
                    div.(Plots::PANEL) {
                        img.(Plots::PLOT_IMAGE) src=(plot_url(&image.relative)) alt=(image.file_name);
                        p.(Plots::CAPTION) { (image.subject.benchmark) " - " (image.subject.database) }
                        a.(Plots::DOWNLOAD_BTN) href=(download_url(&image.relative)) download=(image.file_name) {
                            "Download"
                        }
                    }
                }
            }
        }
    }
}

fn render_list(images: &[&GalleryImage]) -> Markup {
    html! {
        @for image in images {
            hr;
            section.(Plots::LIST_ITEM) {
                h3 { (image.subject.benchmark) " - " (image.subject.database) }
                img.(Plots::PLOT_IMAGE) src=(plot_url(&image.relative)) alt=(image.file_name);
                div.(Plots::FILE_META) {
                    (image.file_name)
                    @if let Some(modified) = image.modified {
                        " · modified " (modified.format("%Y-%m-%d %H:%M"))
                    }
                }
                a.(Plots::DOWNLOAD_BTN) href=(download_url(&image.relative)) download=(image.file_name) {
                    "Download " (image.file_name)
                }
            }
        }
    }
}
