use axum::Json;
use guide_core::markdown::render_safe;
use serde::{Deserialize, Serialize};

use crate::response::DataResponse;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub markdown: String,
}

#[derive(Debug, Serialize)]
pub struct RenderedHtml {
    pub html: String,
}

/// POST /api/v1/render/markdown
///
/// Preview for the text block editor; same renderer as the public guide.
pub async fn render_markdown(
    Json(input): Json<RenderRequest>,
) -> Json<DataResponse<RenderedHtml>> {
    Json(DataResponse {
        data: RenderedHtml {
            html: render_safe(Some(&input.markdown)),
        },
    })
}
