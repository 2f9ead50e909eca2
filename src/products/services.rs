use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::products::repo::{self, ProductImage};
use crate::state::AppState;

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Keep the original extension when it looks like one; the key is otherwise
/// opaque.
fn extension(file_name: Option<&str>) -> Option<&str> {
    let ext = file_name?.rsplit_once('.')?.1;
    if !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}

/// Store each blob and record its reference path against the product.
pub async fn attach_images(
    state: &AppState,
    product_id: Uuid,
    files: Vec<UploadItem>,
) -> Result<Vec<ProductImage>, ApiError> {
    if repo::get(&state.db, product_id).await?.is_none() {
        return Err(ApiError::NotFound("Product not found".into()));
    }

    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        let image_id = Uuid::new_v4();
        let key = match extension(file.file_name.as_deref()) {
            Some(ext) => format!("products/{product_id}/{image_id}.{ext}"),
            None => format!("products/{product_id}/{image_id}"),
        };
        state
            .storage
            .put_object(&key, file.body, &file.content_type)
            .await?;
        let row = repo::insert_image(&state.db, product_id, &key).await?;
        info!(product_id = %product_id, image_id = %row.id, path = %row.image_path, "image attached");
        stored.push(row);
    }
    Ok(stored)
}

pub async fn remove_image(
    state: &AppState,
    product_id: Uuid,
    image_id: Uuid,
) -> Result<ProductImage, ApiError> {
    let row = repo::delete_image(&state.db, product_id, image_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".into()))?;

    // The record is gone; a failed blob delete only leaves an orphan file.
    if let Err(e) = state.storage.delete_object(&row.image_path).await {
        warn!(error = %e, path = %row.image_path, "blob delete failed, orphan left behind");
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_kept_only_when_plausible() {
        assert_eq!(extension(Some("photo.jpg")), Some("jpg"));
        assert_eq!(extension(Some("archive.tar.gz")), Some("gz"));
        assert_eq!(extension(Some("noext")), None);
        assert_eq!(extension(Some("trailing.")), None);
        assert_eq!(extension(Some("weird.j p g")), None);
        assert_eq!(extension(Some("too.longextension")), None);
        assert_eq!(extension(None), None);
    }
}
