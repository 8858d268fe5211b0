use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use plot_dashboard::build_router;
use plot_dashboard::catalog::PlotCatalog;
use plot_dashboard::layout_config::LayoutConfig;
use plot_dashboard::state::AppState;
use tempfile::{TempDir, tempdir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const SAMPLING_PLOT: &str = "sampling_method_distribution_plots/v16/Dev/uniform/BIRD_codebase_community_sampling_method_distribution_grouped.png";
const DISTRIBUTION_PLOT: &str = "distribution_plots/v16/Dev/uniform/Dev_BIRD_codebase_community_-_Uniform_Distribution.png";

struct HttpResponse {
    status: u16,
    head: String,
    body: Vec<u8>,
}

impl HttpResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Value of the sidebar metric whose label is `label`.
    fn metric(&self, label: &str) -> Option<usize> {
        let html = self.text();
        let after_label = html.split_once(&format!("{label}</div>"))?.1;
        let value = after_label.split_once('>')?.1;
        value.split_once('<')?.0.trim().parse().ok()
    }
}

fn fake_png(seed: u8) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    bytes.extend((0..=255u8).map(|b| b ^ seed));
    bytes
}

fn write(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, bytes).expect("write plot");
}

fn plot_tree() -> TempDir {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), SAMPLING_PLOT, &fake_png(1));
    write(dir.path(), DISTRIBUTION_PLOT, &fake_png(2));
    write(
        dir.path(),
        "sampling_method_distribution_plots/v15/EHRSQL_eicu_sampling_method_distribution.png",
        &fake_png(3),
    );
    write(
        dir.path(),
        "sampling_method_distribution_plots/v14/BIRD_superhero_sampling_method_distribution.png",
        &fake_png(5),
    );
    write(
        dir.path(),
        "sampling_method_distribution_plots/v14/EHRSQL_mimic_iii_sampling_method_distribution.png",
        &fake_png(6),
    );
    write(dir.path(), "private/secret.png", &fake_png(4));
    write(
        dir.path(),
        "distribution_plots/v16/Dev/uniform/overlay.svg",
        b"<svg xmlns=\"http://www.w3.org/2000/svg\"><script>alert(1)</script></svg>",
    );
    dir
}

async fn spawn_server(root: &Path) -> SocketAddr {
    let catalog = PlotCatalog::new(root.to_path_buf(), LayoutConfig::default());
    let app = build_router(Arc::new(AppState::new(catalog)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    addr
}

async fn get(addr: SocketAddr, target: &str) -> HttpResponse {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");

    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).into_owned();
    let body = raw[split + 4..].to_vec();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status code");
    HttpResponse { status, head, body }
}

#[tokio::test]
async fn download_returns_source_bytes() {
    let tree = plot_tree();
    let addr = spawn_server(tree.path()).await;

    let response = get(addr, &format!("/download/{SAMPLING_PLOT}")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, fs::read(tree.path().join(SAMPLING_PLOT)).unwrap());
    assert_eq!(response.header("content-type"), Some("image/png"));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"BIRD_codebase_community_sampling_method_distribution_grouped.png\"")
    );
}

#[tokio::test]
async fn inline_plot_matches_download() {
    let tree = plot_tree();
    let addr = spawn_server(tree.path()).await;

    let inline = get(addr, &format!("/plots/{DISTRIBUTION_PLOT}")).await;
    let download = get(addr, &format!("/download/{DISTRIBUTION_PLOT}")).await;
    assert_eq!(inline.status, 200);
    assert_eq!(inline.header("content-disposition"), None);
    assert_eq!(inline.body, download.body);
}

#[tokio::test]
async fn missing_and_escaping_paths_are_refused() {
    let tree = plot_tree();
    let addr = spawn_server(tree.path()).await;

    let missing = get(addr, "/plots/distribution_plots/v16/Dev/uniform/nope.png").await;
    assert_eq!(missing.status, 404);

    let outside = get(addr, "/download/private/secret.png").await;
    assert_eq!(outside.status, 400);

    let traversal = get(addr, "/plots/distribution_plots/%2E%2E/private/secret.png").await;
    assert_eq!(traversal.status, 400);

    let svg = get(addr, "/plots/distribution_plots/v16/Dev/uniform/overlay.svg").await;
    assert_eq!(svg.status, 400);
}

#[tokio::test]
async fn viewer_renders_selected_plots() {
    let tree = plot_tree();
    let addr = spawn_server(tree.path()).await;

    let page = get(addr, "/?version=v16&split=Dev&distribution=uniform").await;
    assert_eq!(page.status, 200);
    let html = page.text();
    assert!(html.contains("Workload Analysis Dashboard"));
    assert!(html.contains(&format!("/plots/{SAMPLING_PLOT}")));
    assert!(html.contains(&format!("/plots/{DISTRIBUTION_PLOT}")));
    // No literal plot exists for this selection.
    assert_eq!(html.matches("Plot not found").count(), 1);
}

#[tokio::test]
async fn viewer_without_plots_still_renders() {
    let empty = tempdir().expect("tempdir");
    let addr = spawn_server(empty.path()).await;

    let page = get(addr, "/").await;
    assert_eq!(page.status, 200);
    assert!(page.text().contains("No plot versions found"));
    assert!(!page.text().contains("<img"));
}

#[tokio::test]
async fn gallery_filters_images() {
    let tree = plot_tree();
    let addr = spawn_server(tree.path()).await;

    let all = get(addr, "/gallery?version=v15").await;
    assert_eq!(all.status, 200);
    assert_eq!(all.text().matches("<img").count(), 1);
    assert!(all.text().contains("EHRSQL - eicu"));

    let filtered = get(
        addr,
        "/gallery?version=v16&benchmark=BIRD&database=eicu&database=codebase_community&mode=list",
    )
    .await;
    assert_eq!(filtered.status, 200);
    assert_eq!(filtered.text().matches("<img").count(), 1);
    assert!(filtered.text().contains("Download BIRD_codebase_community"));
    assert_eq!(filtered.metric("Total images"), Some(1));
    assert_eq!(filtered.metric("Filtered images"), Some(1));

    let narrowed = get(addr, "/gallery?version=v14&benchmark=EHRSQL").await;
    assert_eq!(narrowed.status, 200);
    assert_eq!(narrowed.metric("Total images"), Some(2));
    assert_eq!(narrowed.metric("Filtered images"), Some(1));
    assert_eq!(narrowed.text().matches("<img").count(), 1);
    assert!(narrowed.text().contains("EHRSQL - mimic_iii"));

    let stale_split = get(addr, "/gallery?version=v15&benchmark=EHRSQL&database=eicu&split=Dev").await;
    assert_eq!(stale_split.text().matches("<img").count(), 1);
}

#[tokio::test]
async fn stylesheet_is_served() {
    let tree = plot_tree();
    let addr = spawn_server(tree.path()).await;

    let css = get(addr, "/styles.css").await;
    assert_eq!(css.status, 200);
    assert!(css.header("content-type").unwrap_or_default().starts_with("text/css"));
    assert!(css.text().contains("--background"));
}
