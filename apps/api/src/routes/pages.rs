//! Server-rendered job search page.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Html,
};
use quick_xml::escape::escape;

use crate::errors::AppError;
use crate::generation::handlers::AdviceForm;
use crate::generation::pipeline::run_pipeline;
use crate::state::AppState;

const JOB_SEARCH_TEMPLATE: &str = include_str!("../../templates/job_search.html");

/// Values shown on the job search page. All text is escaped on render.
#[derive(Debug, Default)]
pub struct PageView {
    pub job_title: String,
    pub location: String,
    pub output: String,
    pub errors: Vec<String>,
}

/// GET /
pub async fn job_search_form() -> Html<String> {
    Html(render_page(&PageView::default()))
}

/// POST /
///
/// Same form as the Advice API; renders the combined advice text instead of JSON.
pub async fn job_search_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let form = match AdviceForm::read(&mut multipart).await {
        Ok(form) => form,
        Err(e) => return error_page(PageView::default(), e),
    };

    let mut view = PageView {
        job_title: form.job_title.clone(),
        location: form.location.clone(),
        ..PageView::default()
    };

    let request = match form.into_request() {
        Ok(request) => request,
        Err(e) => return error_page(view, e),
    };

    match run_pipeline(&state, request).await {
        Ok(output) => {
            view.output = output.combined_text();
            for skipped in &output.skipped_listings {
                view.errors
                    .push(format!("Listing {} skipped: {}", skipped.position, skipped.reason));
            }
            for result in output.report.results.iter().filter(|r| r.advice().is_none()) {
                view.errors.push(format!("No advice for {}", result.key));
            }
            (StatusCode::OK, Html(render_page(&view)))
        }
        Err(e) => error_page(view, e),
    }
}

fn error_page(mut view: PageView, e: AppError) -> (StatusCode, Html<String>) {
    let status = e.status_code();
    view.errors.push(e.public_message());
    (status, Html(render_page(&view)))
}

pub fn render_page(view: &PageView) -> String {
    let error_block = if view.errors.is_empty() {
        String::new()
    } else {
        let items: String = view
            .errors
            .iter()
            .map(|e| format!("<li>{}</li>", escape(e.as_str())))
            .collect();
        format!(r#"<ul class="error">{items}</ul>"#)
    };

    let output_block = if view.output.is_empty() {
        String::new()
    } else {
        format!(
            r#"<pre class="advice">{}</pre>"#,
            escape(view.output.as_str())
        )
    };

    render_template(
        JOB_SEARCH_TEMPLATE,
        &[
            ("job_title", escape(view.job_title.as_str()).into_owned()),
            ("location", escape(view.location.as_str()).into_owned()),
            ("error_block", error_block),
            ("output_block", output_block),
        ],
    )
}

/// Single-pass `{{name}}` substitution; substituted text is never re-scanned.
/// Unknown placeholders are left as-is.
fn render_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
