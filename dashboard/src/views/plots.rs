use std::sync::Arc;

use axum::extract::{Query, State};
use maud::{Markup, html};
use serde::Deserialize;

use crate::catalog::{PlotCatalog, PlotKind, PlotSelection};
use crate::filename::PlotSubject;
use crate::state::AppState;
use crate::styles::{Layout, Plots};

use super::{Notice, Page, SelectField, download_url, notice, page_shell, pick, plot_url, select_field};

const FORM_ID: &str = "plot-filters";

#[derive(Deserialize, Default, Debug)]
pub struct ViewerQuery {
    pub version: Option<String>,
    pub split: Option<String>,
    pub distribution: Option<String>,
    pub benchmark: Option<String>,
    pub database: Option<String>,
}

/// Outcome of walking the viewer's select boxes top to bottom. Stops at the
/// first select with nothing to offer.
#[derive(Debug)]
pub struct ViewerState {
    pub sidebar: Vec<SelectField>,
    pub subject: Vec<SelectField>,
    pub outcome: Result<PlotSelection, Notice>,
}

fn field(name: &'static str, label: &'static str, options: Vec<String>, selected: &str) -> SelectField {
    SelectField {
        name,
        label,
        options,
        selected: selected.to_owned(),
    }
}

pub fn resolve(catalog: &PlotCatalog, query: &ViewerQuery) -> ViewerState {
    let mut state = ViewerState {
        sidebar: Vec::new(),
        subject: Vec::new(),
        outcome: Err(Notice::error(format!(
            "No plot versions found under {}",
            catalog.root().display()
        ))),
    };

    let versions = catalog.versions();
    let Some(version) = pick(query.version.as_deref(), &versions).cloned() else {
        return state;
    };
    state.sidebar.push(field("version", "Version", versions, &version));

    let splits = catalog.splits(&version);
    let Some(split) = pick(query.split.as_deref(), &splits).cloned() else {
        state.outcome = Err(Notice::warning(format!("No splits available for version {version}")));
        return state;
    };
    state.sidebar.push(field("split", "Split", splits, &split));

    let distributions = catalog.distributions(&version, &split);
    let Some(distribution) = pick(query.distribution.as_deref(), &distributions).cloned() else {
        state.outcome = Err(Notice::warning(format!(
            "No distributions available for split {split}"
        )));
        return state;
    };
    state
        .sidebar
        .push(field("distribution", "Distribution", distributions, &distribution));

    let subjects = catalog.benchmarks_and_dbs(&version, &split, &distribution);
    let benchmarks: Vec<String> = subjects.keys().cloned().collect();
    let Some(benchmark) = pick(query.benchmark.as_deref(), &benchmarks).cloned() else {
        state.outcome = Err(Notice::warning("No data available for the selected settings"));
        return state;
    };
    let databases: Vec<String> = subjects
        .get(&benchmark)
        .map(|dbs| dbs.iter().cloned().collect())
        .unwrap_or_default();
    let Some(database) = pick(query.database.as_deref(), &databases).cloned() else {
        state.outcome = Err(Notice::warning("No data available for the selected settings"));
        return state;
    };
    state.subject.push(field("benchmark", "Benchmark", benchmarks, &benchmark));
    state.subject.push(field("database", "Database", databases, &database));

    state.outcome = Ok(PlotSelection {
        version,
        split,
        distribution,
        subject: PlotSubject::new(benchmark, database),
    });
    state
}

pub async fn plot_viewer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewerQuery>,
) -> Markup {
    let catalog = &state.catalog;
    let viewer = resolve(catalog, &query);
    tracing::debug!(?query, selection = ?viewer.outcome.as_ref().ok(), "resolved plot viewer");

    let sidebar = html! {
        h2 { "Settings" }
        form #(FORM_ID) method="get" action="/" {
            @for field in &viewer.sidebar {
                (select_field(field, FORM_ID, true))
            }
            noscript { button type="submit" { "Apply" } }
        }
        @if let Ok(selection) = &viewer.outcome {
            hr;
            div.(Layout::SUMMARY) {
                strong { "Current selection" }
                div { "Version: " code { (selection.version) } }
                div { "Split: " code { (selection.split) } }
                div { "Distribution: " code { (selection.distribution) } }
            }
        }
    };

    let content = html! {
        h1 { "Workload Analysis Dashboard" }
        hr;
        @if !viewer.subject.is_empty() {
            div.(Layout::FIELD_ROW) {
                @for field in &viewer.subject {
                    (select_field(field, FORM_ID, true))
                }
            }
            hr;
        }
        @match &viewer.outcome {
            Ok(selection) => { (render_panels(catalog, selection)) }
            Err(n) => { (notice(n)) }
        }
    };

    page_shell("Workload Analysis Dashboard", Page::Plots, sidebar, content)
}

fn render_panels(catalog: &PlotCatalog, selection: &PlotSelection) -> Markup {
    let found: Vec<(PlotKind, Option<String>)> = PlotKind::ALL
        .iter()
        .map(|&kind| {
            let relative = catalog
                .find_plot(kind, selection)
                .and_then(|path| catalog.relative(&path));
            (kind, relative)
        })
        .collect();

    html! {
        h2 { "Plots: " (selection.subject.benchmark) " - " (selection.subject.database) }
        div.(Plots::PANEL_ROW) style=(format!("grid-template-columns: repeat({}, minmax(0, 1fr))", found.len())) {
            @for (kind, relative) in &found {
                section.(Plots::PANEL) {
                    h3 { (kind.display_name()) }
                    @match relative {
                        Some(relative) => {
                            img.(Plots::PLOT_IMAGE) src=(plot_url(relative)) alt=(kind.display_name());
                            a.(Plots::DOWNLOAD_BTN) href=(download_url(relative)) download { "Download" }
                        }
                        None => { (notice(&Notice::warning("Plot not found"))) }
                    }
                }
            }
        }
        details.(Plots::INFO) {
            summary { "Plot information" }
            ul {
                @for (kind, _) in &found {
                    li { strong { (kind.display_name()) } ": " (kind.description()) }
                }
            }
            @for (kind, relative) in &found {
                @if let Some(relative) = relative {
                    div { (kind.display_name()) " path: " code { (relative) } }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::layout_config::LayoutConfig;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"png").unwrap();
    }

    fn catalog(files: &[&str]) -> (TempDir, PlotCatalog) {
        let dir = TempDir::new().unwrap();
        for file in files {
            touch(dir.path(), file);
        }
        let catalog = PlotCatalog::new(dir.path().to_path_buf(), LayoutConfig::default());
        (dir, catalog)
    }

    #[test]
    fn empty_root_reports_no_versions() {
        let (_dir, catalog) = catalog(&[]);
        let viewer = resolve(&catalog, &ViewerQuery::default());
        assert!(viewer.sidebar.is_empty());
        let notice = viewer.outcome.unwrap_err();
        assert!(notice.message.starts_with("No plot versions found"));
    }

    #[test]
    fn version_without_splits_stops_early() {
        let (dir, catalog) = catalog(&[]);
        fs::create_dir_all(dir.path().join("sampling_method_distribution_plots/v3/misc")).unwrap();
        let viewer = resolve(&catalog, &ViewerQuery::default());
        assert_eq!(viewer.sidebar.len(), 1);
        assert_eq!(
            viewer.outcome.unwrap_err().message,
            "No splits available for version v3"
        );
    }

    #[test]
    fn defaults_to_first_options() {
        let (_dir, catalog) = catalog(&[
            "sampling_method_distribution_plots/v16/Dev/uniform/EHRSQL_eicu_sampling_method_distribution_grouped.png",
            "sampling_method_distribution_plots/v16/Dev/uniform/BIRD_superhero_sampling_method_distribution_grouped.png",
            "sampling_method_distribution_plots/v15/Train/zipf_random/BIRD_retails_sampling_method_distribution_grouped.png",
        ]);
        let viewer = resolve(&catalog, &ViewerQuery::default());
        let selection = viewer.outcome.unwrap();
        assert_eq!(selection.version, "v16");
        assert_eq!(selection.split, "Dev");
        assert_eq!(selection.distribution, "uniform");
        assert_eq!(selection.subject, PlotSubject::new("BIRD", "superhero"));
        assert_eq!(viewer.subject[0].options, vec!["BIRD", "EHRSQL"]);
    }

    #[test]
    fn honors_valid_query_and_replaces_stale_values() {
        let (_dir, catalog) = catalog(&[
            "sampling_method_distribution_plots/v16/Dev/uniform/EHRSQL_eicu_sampling_method_distribution_grouped.png",
            "sampling_method_distribution_plots/v15/Train/zipf_random/BIRD_retails_sampling_method_distribution_grouped.png",
        ]);
        let query = ViewerQuery {
            version: Some("v15".to_owned()),
            split: Some("Dev".to_owned()),
            distribution: None,
            benchmark: Some("EHRSQL".to_owned()),
            database: None,
        };
        let selection = resolve(&catalog, &query).outcome.unwrap();
        assert_eq!(selection.version, "v15");
        assert_eq!(selection.split, "Train");
        assert_eq!(selection.distribution, "zipf_random");
        assert_eq!(selection.subject, PlotSubject::new("BIRD", "retails"));
    }

    #[test]
    fn panels_warn_for_missing_plots() {
        let (_dir, catalog) = catalog(&[
            "sampling_method_distribution_plots/v16/Dev/uniform/BIRD_superhero_sampling_method_distribution_grouped.png",
        ]);
        let selection = resolve(&catalog, &ViewerQuery::default()).outcome.unwrap();
        let html = render_panels(&catalog, &selection).into_string();
        assert!(html.contains(
            "/plots/sampling_method_distribution_plots/v16/Dev/uniform/BIRD_superhero_sampling_method_distribution_grouped.png"
        ));
        assert_eq!(html.matches("Plot not found").count(), 2);
    }
}
