pub mod export;
pub mod health;
pub mod preview;
pub mod resumes;
pub mod templates;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/templates/:kind/form", get(templates::handle_blank_form))
        // Form step
        .route("/api/v1/resumes", post(resumes::handle_submit))
        .route(
            "/api/v1/resumes/current",
            get(resumes::handle_get_current)
                .patch(resumes::handle_edit_current)
                .delete(resumes::handle_clear_current),
        )
        .route(
            "/api/v1/resumes/current/picture",
            put(resumes::handle_upload_picture),
        )
        // Preview step
        .route("/api/v1/preview", get(preview::handle_preview))
        .route("/api/v1/preview/image", get(preview::handle_preview_image))
        // Export
        .route("/api/v1/export", post(export::handle_export))
        .route("/api/v1/export/status", get(export::handle_export_status))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::render::images::EmbeddedImageResolver;
    use crate::render::Rasterizer;
    use crate::storage::{KeyValueStore, MemoryStore, DEFAULT_STORAGE_KEY};

    fn test_state(dir: &std::path::Path) -> (AppState, Arc<MemoryStore>) {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.export_dir = dir.to_path_buf();
        let store = Arc::new(MemoryStore::new());
        let rasterizer = Rasterizer::new(Arc::new(EmbeddedImageResolver), config.render_max_canvas_dim);
        (AppState::new(config, store.clone(), rasterizer), store)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).0);
        let resp = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_templates_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).0);
        let body = json_body(app.oneshot(get("/api/v1/templates")).await.unwrap()).await;
        let routes: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["preview_route"].as_str().unwrap())
            .collect();
        assert_eq!(routes, vec!["/creativePreview", "/professionalPreview", "/simplePreview"]);
    }

    #[tokio::test]
    async fn test_submit_preview_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = test_state(dir.path());
        let app = build_router(state.clone());

        let payload = json!({
            "template": { "title": "Creative Resume" },
            "personal": { "fullName": "Ada Lovelace", "jobTitle": "Engineer" },
            "skills": [{ "name": "C++" }, { "name": "" }]
        });
        let resp = app.clone().oneshot(post_json("/api/v1/resumes", payload)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["previewRoute"], "/creativePreview");
        assert_eq!(body["document"]["skills"].as_array().unwrap().len(), 1);

        let resp = app.clone().oneshot(get("/api/v1/preview")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["template"], "creative");
        assert!(body["mounted_at"].is_string());
        assert!(body["content_size"]["height"].as_f64().unwrap() > 0.0);

        let resp = app.clone().oneshot(get("/api/v1/preview/image")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");

        let resp = app
            .clone()
            .oneshot(Request::post("/api/v1/export").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Ada Lovelace.pdf\""
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert!(dir.path().join("Ada Lovelace.pdf").exists());

        let status = json_body(app.oneshot(get("/api/v1/export/status")).await.unwrap()).await;
        assert_eq!(status["busy"], false);
    }

    #[tokio::test]
    async fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).0);

        for req in [
            get("/api/v1/resumes/current"),
            get("/api/v1/preview"),
            Request::post("/api/v1/export").body(Body::empty()).unwrap(),
        ] {
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body = json_body(resp).await;
            assert_eq!(body["error"]["message"], "No resume data found.");
            assert_eq!(body["home"], "/");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_document_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let (state, store) = test_state(dir.path());
        store.set(DEFAULT_STORAGE_KEY, "{\"personal\": 42").unwrap();
        let app = build_router(state);

        let resp = app.oneshot(get("/api/v1/preview")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(resp).await["error"]["code"], "MALFORMED_DOCUMENT");
    }

    #[tokio::test]
    async fn test_submit_without_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (state, store) = test_state(dir.path());
        let app = build_router(state);

        let resp = app
            .oneshot(post_json("/api/v1/resumes", json!({ "personal": { "email": "a@b.c" } })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"]["code"], "VALIDATION_ERROR");
        assert!(store.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_export_while_busy_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = test_state(dir.path());
        let _ticket = state.exporter.try_begin().unwrap();
        let app = build_router(state);

        let resp = app
            .oneshot(Request::post("/api/v1/export").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_field_edits_update_stored_resume() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).0);
        app.clone()
            .oneshot(post_json("/api/v1/resumes", json!({ "personal": { "name": "Ada" } })))
            .await
            .unwrap();

        let edits = json!([
            { "op": "set_personal", "field": "name", "value": "Ada Lovelace" },
            { "op": "add_row", "section": "projects" },
            { "op": "update_field", "section": "projects", "index": 0, "field": "title", "value": "Notes" }
        ]);
        let req = Request::patch("/api/v1/resumes/current")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(edits.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let current = json_body(app.oneshot(get("/api/v1/resumes/current")).await.unwrap()).await;
        assert_eq!(current["personal"]["name"], "Ada Lovelace");
        assert_eq!(current["projects"][0]["title"], "Notes");
    }

    #[tokio::test]
    async fn test_blank_form_for_simple_template() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).0);
        let body = json_body(app.oneshot(get("/api/v1/templates/simple/form")).await.unwrap()).await;
        assert_eq!(body["certifications"].as_array().unwrap().len(), 1);
        assert_eq!(body["template"]["kind"], "simple");
    }

    #[tokio::test]
    async fn test_clear_unmounts_and_empties_slot() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = test_state(dir.path());
        let app = build_router(state.clone());
        app.clone()
            .oneshot(post_json("/api/v1/resumes", json!({ "personal": { "name": "Ada" } })))
            .await
            .unwrap();
        app.clone().oneshot(get("/api/v1/preview")).await.unwrap();
        assert!(state.surface.is_mounted());

        let req = Request::delete("/api/v1/resumes/current").body(Body::empty()).unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(!state.surface.is_mounted());

        let resp = app.oneshot(get("/api/v1/resumes/current")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_after_resubmit_uses_new_document() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = test_state(dir.path());
        let app = build_router(state.clone());

        let ada = json!({ "personal": { "name": "Ada Lovelace" } });
        app.clone().oneshot(post_json("/api/v1/resumes", ada)).await.unwrap();
        app.clone().oneshot(get("/api/v1/preview")).await.unwrap();
        assert!(state.surface.is_mounted());

        let grace = json!({ "personal": { "name": "Grace Hopper" } });
        let resp = app.clone().oneshot(post_json("/api/v1/resumes", grace)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!state.surface.is_mounted());

        let resp = app
            .oneshot(Request::post("/api/v1/export").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Grace Hopper.pdf\""
        );
        assert!(!dir.path().join("Ada Lovelace.pdf").exists());
    }

    #[tokio::test]
    async fn test_mount_and_submit_conflict_while_exporting() {
        let dir = tempfile::tempdir().unwrap();
        let (state, store) = test_state(dir.path());
        let app = build_router(state.clone());
        app.clone()
            .oneshot(post_json("/api/v1/resumes", json!({ "personal": { "name": "Ada" } })))
            .await
            .unwrap();
        let stored = store.get(DEFAULT_STORAGE_KEY).unwrap();

        let ticket = state.exporter.try_begin().unwrap();
        let resp = app.clone().oneshot(get("/api/v1/preview")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(!state.surface.is_mounted());

        let resp = app
            .clone()
            .oneshot(post_json("/api/v1/resumes", json!({ "personal": { "name": "Grace" } })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), stored);

        let req = Request::delete("/api/v1/resumes/current").body(Body::empty()).unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(store.get(DEFAULT_STORAGE_KEY).unwrap().is_some());

        drop(ticket);
        let resp = app.oneshot(get("/api/v1/preview")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_template_kind_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).0);
        let resp = app.oneshot(get("/api/v1/templates/modern/form")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Unknown template 'modern'");
        assert!(body.get("home").is_none());
    }
}
