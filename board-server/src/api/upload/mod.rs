//! Evidence Upload Routes
//!
//! Problem and re-clean evidence photos. Uploads require authentication;
//! serving is public (the URL is stored on the room record and rendered
//! by every client).

mod handler;

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use crate::core::ServerState;

enum ServeFileResponse {
    Ok(&'static str, Bytes),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for ServeFileResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServeFileResponse::Ok(content_type, content) => {
                (http::StatusCode::OK, [(header::CONTENT_TYPE, content_type)], content)
                    .into_response()
            }
            ServeFileResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "File not found").into_response()
            }
            ServeFileResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

/// Serve an uploaded evidence image.
async fn serve_uploaded_file(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> ServeFileResponse {
    // Prevent path traversal
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return ServeFileResponse::BadRequest("Invalid filename");
    }

    let file_path = state.config.images_dir().join(&filename);
    match tokio::fs::read(&file_path).await {
        Ok(content) => {
            let content_type = mime_guess::from_path(&file_path)
                .first_raw()
                .unwrap_or("image/jpeg");
            ServeFileResponse::Ok(content_type, content.into())
        }
        Err(e) => {
            tracing::debug!(filename = %filename, error = %e, "Evidence file not found");
            ServeFileResponse::NotFound
        }
    }
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/image/upload", post(handler::upload))
        .route("/api/image/{filename}", get(serve_uploaded_file))
}
