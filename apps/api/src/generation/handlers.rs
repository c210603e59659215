//! Axum route handlers for the Advice API.

use axum::extract::{multipart::MultipartError, Multipart, State};
use axum::Json;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::generation::pipeline::{run_pipeline, AdviceRequest, PipelineOutput};
use crate::state::AppState;

/// Raw multipart fields of the job search form. Unknown fields are ignored.
#[derive(Debug, Default)]
pub struct AdviceForm {
    pub job_title: String,
    pub location: String,
    pub country: Option<String>,
    pub resume: Option<Bytes>,
    pub resume_file_name: Option<String>,
}

impl AdviceForm {
    pub async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = AdviceForm::default();

        while let Some(field) = multipart.next_field().await.map_err(form_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "job_title" => form.job_title = field.text().await.map_err(form_error)?,
                "location" => form.location = field.text().await.map_err(form_error)?,
                "country" => {
                    let country = field.text().await.map_err(form_error)?;
                    let country = country.trim().to_ascii_lowercase();
                    form.country = (!country.is_empty()).then_some(country);
                }
                "resume" => {
                    form.resume_file_name = field.file_name().map(str::to_string);
                    let data = field.bytes().await.map_err(form_error)?;
                    form.resume = (!data.is_empty()).then_some(data);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn into_request(self) -> Result<AdviceRequest, AppError> {
        if self.job_title.trim().is_empty() {
            return Err(AppError::Validation("job_title cannot be empty".to_string()));
        }
        let resume = self
            .resume
            .ok_or_else(|| AppError::Validation("a resume file is required".to_string()))?;

        Ok(AdviceRequest {
            job_title: self.job_title,
            location: self.location,
            country: self.country,
            resume,
        })
    }
}

fn form_error(e: MultipartError) -> AppError {
    AppError::Validation(format!("invalid form data: {e}"))
}

/// POST /api/v1/advice
///
/// Multipart form: `job_title`, `location`, optional `country`, `resume` (.docx or .pdf).
/// Returns per-listing advice in listing order.
pub async fn handle_advice(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PipelineOutput>, AppError> {
    let form = AdviceForm::read(&mut multipart).await?;
    info!(
        "Advice requested for {:?} in {:?} (resume: {:?})",
        form.job_title, form.location, form.resume_file_name
    );

    let output = run_pipeline(&state, form.into_request()?).await?;
    Ok(Json(output))
}
