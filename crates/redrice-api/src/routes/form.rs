//! Restaurant form extractor
//!
//! Restaurants are submitted either as `multipart/form-data` (text fields
//! plus an optional `image` file) or as a plain JSON document.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use bytes::Bytes;
use tracing::debug;

use crate::error::ApiError;
use crate::extract::{ApiJson, non_empty, parse_optional};

use super::types::RestaurantFields;

/// Image file part of a restaurant form
#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Bytes,
}

/// Parsed restaurant submission
#[derive(Debug, Default)]
pub struct RestaurantForm {
    pub fields: RestaurantFields,
    pub image: Option<ImageUpload>,
}

impl<S> FromRequest<S> for RestaurantForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_multipart_form);

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart).await
        } else {
            let ApiJson(fields) = ApiJson::<RestaurantFields>::from_request(req, state).await?;
            Ok(RestaurantForm {
                fields,
                image: None,
            })
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<RestaurantForm, ApiError> {
    let mut form = RestaurantForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            // Browsers send an empty part when no file was chosen
            if filename.is_empty() && data.is_empty() {
                continue;
            }
            form.image = Some(ImageUpload { filename, data });
            continue;
        }

        let value = field.text().await?;
        let fields = &mut form.fields;
        match name.as_str() {
            "name" => fields.name = non_empty(Some(value)),
            "address" => fields.address = non_empty(Some(value)),
            "telephone" => fields.telephone = non_empty(Some(value)),
            "description" => fields.description = non_empty(Some(value)),
            "facebook" => fields.facebook = non_empty(Some(value)),
            "instagram" => fields.instagram = non_empty(Some(value)),
            "openTime" => fields.open_time = non_empty(Some(value)),
            "closeTime" => fields.close_time = non_empty(Some(value)),
            "rating" => fields.rating = parse_optional(&value, "rating")?,
            "commentCount" => fields.comment_count = parse_optional(&value, "comment count")?,
            other => debug!("Ignoring unknown form field: {}", other),
        }
    }

    Ok(form)
}

/// Media types are case-insensitive; parameters such as the boundary follow `;`
fn is_multipart_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("multipart/form-data"))
}
