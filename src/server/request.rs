use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::Deserialize;

use super::error::ApiError;
use crate::inspire::Upload;

/// Input of `POST /api/inspire`, read from a multipart form, a urlencoded
/// form or a JSON body. Only multipart bodies can carry an image.
#[derive(Debug, Default)]
pub struct InspireForm {
    pub prompt: Option<String>,
    pub image: Option<Upload>,
}

#[derive(Debug, Deserialize)]
struct PromptBody {
    prompt: Option<String>,
}

#[async_trait]
impl<S> FromRequest<S> for InspireForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        // A body that fails to parse has no usable prompt, unless it was
        // cut off by the body limit
        let prompt = if content_type.starts_with("application/json") {
            match Json::<PromptBody>::from_request(req, state).await {
                Ok(Json(body)) => body.prompt,
                Err(rejection) => {
                    reject_oversized(rejection.status(), rejection.body_text())?;
                    None
                }
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            match Form::<PromptBody>::from_request(req, state).await {
                Ok(Form(body)) => body.prompt,
                Err(rejection) => {
                    reject_oversized(rejection.status(), rejection.body_text())?;
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            prompt,
            image: None,
        })
    }
}

fn reject_oversized(status: StatusCode, message: String) -> Result<(), ApiError> {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return Err(ApiError::PayloadTooLarge(message));
    }
    Ok(())
}

async fn read_multipart(mut multipart: Multipart) -> Result<InspireForm, ApiError> {
    let mut form = InspireForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "prompt" if form.prompt.is_none() => {
                form.prompt = Some(field.text().await?);
            }
            "image" if form.image.is_none() => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                // a file input left empty still sends a part with no name
                if !file_name.is_empty() {
                    form.image = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}
