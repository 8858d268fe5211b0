use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::catalog::content_type;
use crate::error::Result;
use crate::state::AppState;

/// How the browser should treat served plot bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Inline,
    Attachment,
}

/// Quoted file name for `Content-Disposition`. Quotes, backslashes and
/// control characters are replaced so the header stays well-formed.
fn attachment_header(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

async fn serve(state: &AppState, relative: &str, disposition: Disposition) -> Result<Response> {
    let path = state.catalog.resolve(relative)?;
    let bytes = tokio::fs::read(&path).await?;
    let mime = content_type(&path).unwrap_or("application/octet-stream");
    tracing::debug!(path = %path.display(), len = bytes.len(), ?disposition, "serving plot");

    let response = match disposition {
        Disposition::Inline => ([(header::CONTENT_TYPE, mime.to_owned())], bytes).into_response(),
        Disposition::Attachment => {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("plot.png");
            (
                [
                    (header::CONTENT_TYPE, mime.to_owned()),
                    (header::CONTENT_DISPOSITION, attachment_header(file_name)),
                ],
                bytes,
            )
                .into_response()
        }
    };
    Ok(response)
}

pub async fn serve_plot(
    State(state): State<Arc<AppState>>,
    Path(relative): Path<String>,
) -> Result<Response> {
    serve(&state, &relative, Disposition::Inline).await
}

pub async fn download_plot(
    State(state): State<Arc<AppState>>,
    Path(relative): Path<String>,
) -> Result<Response> {
    serve(&state, &relative, Disposition::Attachment).await
}
