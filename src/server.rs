//! HTTP form surface for single mockups.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Router};
use tracing::{error, info};

use crate::error::PosterError;
use crate::form::{FormAdapter, MockupForm};
use crate::prompt::{ART_STYLES, NO_STYLE};

#[derive(Clone)]
struct AppState {
    adapter: Arc<FormAdapter>,
    default_watermark: Arc<str>,
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(form_handler))
        .route("/mockup", axum::routing::post(mockup_handler))
}

async fn form_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_form(&state.default_watermark))
}

/// Returns the PNG on success and an empty 502 on any failure.
async fn mockup_handler(
    State(state): State<AppState>,
    form: Result<Form<MockupForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            error!("rejected mockup form: {rejection}");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };
    let Some(path) = state.adapter.generate_single_mockup(&form).await else {
        return StatusCode::BAD_GATEWAY.into_response();
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) => {
            error!("failed to read mockup {}: {e}", path.display());
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

fn render_form(default_watermark: &str) -> String {
    let mut options = String::new();
    for style in ART_STYLES {
        let selected = if *style == NO_STYLE { " selected" } else { "" };
        let value = html_escape::encode_double_quoted_attribute(style);
        let label = html_escape::encode_text(style);
        let _ = writeln!(options, r#"      <option value="{value}"{selected}>{label}</option>"#);
    }
    let watermark = html_escape::encode_double_quoted_attribute(default_watermark);

    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Anatomy Poster Generator</title></head>
<body>
  <h1>Anatomy Poster Generator</h1>
  <p>Generate vibrant anatomy mockups inspired by classic and modern art styles.</p>
  <form method="post" action="/mockup">
    <label>Your OpenAI API Key <input type="password" name="api_key" required></label>
    <label>Anatomy Term (e.g. Heart) <input type="text" name="subject" required></label>
    <label>Art Style
    <select name="style">
{options}    </select>
    </label>
    <label>Watermark Text (optional) <input type="text" name="watermark" value="{watermark}"></label>
    <button type="submit">Generate</button>
  </form>
</body>
</html>
"#
    )
}

/// Serve the form on `listen` until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn setup_server(
    listen: &str,
    adapter: FormAdapter,
    default_watermark: &str,
) -> Result<(), PosterError> {
    let state = AppState { adapter: Arc::new(adapter), default_watermark: Arc::from(default_watermark) };
    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("Starting server on http://{listen}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {err}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::MockupComposer;
    use crate::config::{MockupConfig, OpenAiConfig};
    use crate::context::GeneratorMode;

    use axum::body::Body;
    use axum::http::Request;
    use base64::Engine;
    use http_body_util::BodyExt;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::path::Path;
    use tower::ServiceExt;

    fn state(dir: &Path) -> AppState {
        let template = dir.join("frame.png");
        RgbaImage::from_pixel(700, 700, Rgba([90, 60, 30, 255])).save(&template).unwrap();

        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([0, 200, 0, 255])));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let b64 = base64::engine::general_purpose::STANDARD.encode(buf.into_inner());
        let cassette = dir.join("server.cassette.yaml");
        std::fs::write(
            &cassette,
            format!(
                "name: server\nrecorded_at: \"2026-02-01T00:00:00Z\"\ncommit: test\ninteractions:\n  - seq: 0\n    port: image_generator\n    method: generate\n    input: {{}}\n    output:\n      Ok:\n        images:\n          - data: {b64}\n            mime_type: image/png\n"
            ),
        )
        .unwrap();

        let composer = MockupComposer::new(&MockupConfig {
            template,
            font: dir.join("none.ttf"),
            ..MockupConfig::default()
        });
        AppState {
            adapter: Arc::new(FormAdapter::new(
                GeneratorMode::Replaying(cassette),
                OpenAiConfig::default(),
                composer,
            )),
            default_watermark: Arc::from("Dr. \"Q\" & Co"),
        }
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mockup")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body(response: Response) -> Vec<u8> {
        response.into_body().collect().await.expect("collect body").to_bytes().to_vec()
    }

    #[tokio::test]
    async fn form_lists_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router().with_state(state(dir.path()));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = String::from_utf8(read_body(response).await).unwrap();
        assert!(body.contains(r#"type="password" name="api_key""#));
        assert!(body.contains(r#"<option value="None" selected>None</option>"#));
        assert!(body.contains(r#"<option value="Medical Illustration">"#));
        assert!(body.contains("Dr. &quot;Q&quot; &amp; Co"));
    }

    #[tokio::test]
    async fn submit_returns_png() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router().with_state(state(dir.path()));

        let response = app
            .oneshot(post("api_key=sk-user&subject=Heart&style=Van+Gogh&watermark=Test"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");

        let bytes = read_body(response).await;
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (700, 700));
    }

    #[tokio::test]
    async fn failure_shows_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router().with_state(state(dir.path()));

        let response = app.oneshot(post("api_key=&subject=Heart&style=None&watermark=")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(read_body(response).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_form_shows_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router().with_state(state(dir.path()));

        let response = app.oneshot(post("api_key=sk-user&style=None")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(read_body(response).await.is_empty());
    }
}
