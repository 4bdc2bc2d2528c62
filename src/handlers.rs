use crate::config::Config;
use crate::error::AppError;
use crate::file_system::{build_tree, read_document, resolve_document};
use crate::markdown::DocumentRenderer;
use crate::models::{TreeNode, ViewQuery};
use crate::page::{render_file_page, render_index_page, template_env};
use actix_web::http::header::ContentType;
use actix_web::{get, web, HttpResponse};
use log::{debug, info, warn};
use minijinja::Environment;
use rust_embed::RustEmbed;
use std::time::Instant;

#[derive(RustEmbed)]
#[folder = "public/"]
pub struct Asset;

/// Read-only state shared by every request.
pub struct AppState {
    pub config: Config,
    pub templates: Environment<'static>,
    pub renderer: DocumentRenderer,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let renderer = DocumentRenderer::new().with_raw_html(config.allow_raw_html);
        Self {
            config,
            templates: template_env(),
            renderer,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index_or_view).service(static_asset);
}

#[get("/")]
pub async fn index_or_view(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let query = ViewQuery::from_pairs(query.into_inner());
    let requested = query.file.as_deref().unwrap_or("").trim();
    let start_time = Instant::now();

    if requested.is_empty() {
        let tree = scan_tree(&state).await?;
        let html = render_index_page(&state.templates, &state.config, &tree)?;
        debug!("Rendered welcome page in {:.2?}.", start_time.elapsed());
        return Ok(html_response(html));
    }

    info!("Received request for file: {}", requested);
    let doc = match resolve_document(&state.config.base_dir, requested).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Rejected file request '{}': {}", requested, e);
            return Err(e);
        }
    };

    let text = read_document(&doc).await?;
    let body_html = state.renderer.render(&text);
    let tree = scan_tree(&state).await?;
    let html = render_file_page(&state.templates, &state.config, &tree, &doc, &body_html)?;

    info!(
        "Rendered '{}' ({} bytes) in {:.2?}.",
        doc.rel_str(),
        text.len(),
        start_time.elapsed()
    );
    Ok(html_response(html))
}

#[get("/static/{path:.*}")]
pub async fn static_asset(path: web::Path<String>) -> HttpResponse {
    let path = path.into_inner();
    debug!("Serving static asset: {}", path);

    if path.starts_with("templates/") {
        return HttpResponse::NotFound().body("404 Not Found");
    }
    match Asset::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(content.data.into_owned())
        }
        None => HttpResponse::NotFound().body("404 Not Found"),
    }
}

/// Walks the root on the blocking pool. Every request gets a fresh scan.
async fn scan_tree(state: &web::Data<AppState>) -> Result<TreeNode, AppError> {
    let root = state.config.base_dir.clone();
    let start_time = Instant::now();
    let tree = web::block(move || build_tree(&root)).await??;
    debug!(
        "Scanned {} documents under '{}' in {:.2?}.",
        tree.file_count(),
        state.config.base_dir.display(),
        start_time.elapsed()
    );
    Ok(tree)
}

fn html_response(html: String) -> HttpResponse {
    HttpResponse::Ok().insert_header(ContentType::html()).body(html)
}
