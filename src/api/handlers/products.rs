use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::errors::ApiError;
use crate::api::flash::Flash;
use crate::api::middleware::antiforgery::AntiForgeryForm;
use crate::api::middleware::{AntiForgery, CurrentUser, ANTIFORGERY_FIELD};
use crate::api::state::AppState;
use crate::api::views::{render, DetailView, FormView, ListView, ProductView};
use crate::domain::product::form::DUPLICATE_SKU;
use crate::domain::product::image_path::PRODUCT_IMAGE_DIR;
use crate::domain::product::{image_web_path, ProductForm};
use crate::domain::repositories::RepositoryError;
use crate::domain::validation::FormErrors;
use crate::infrastructure::storage::UploadedFile;

const INDEX: &str = "/Products";

/// A decoded multipart product form
#[derive(Debug, Default)]
pub struct ProductSubmission {
    pub form: ProductForm,
    pub image: Option<UploadedFile>,
    pub antiforgery_token: Option<String>,
}

impl ProductSubmission {
    /// Reads every part of a product form
    ///
    /// `is_active` is a checkbox: it is true when any submitted value is
    /// `true`, `on` or `1`, and false when absent.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut submission = Self::default();
        submission.form.is_active = false;

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image_file" {
                submission.image = read_file(field).await?;
                continue;
            }

            let value = field.text().await.map_err(malformed)?;
            let form = &mut submission.form;
            match name.as_str() {
                "id" => form.id = value.trim().parse().unwrap_or_default(),
                "name" => form.name = Some(value),
                "description" => form.description = Some(value),
                "price" => form.price = value,
                "sku" => form.sku = Some(value),
                "image_path" => form.image_path = Some(value).filter(|v| !v.is_empty()),
                "is_active" => form.is_active |= is_checked(&value),
                ANTIFORGERY_FIELD => submission.antiforgery_token = Some(value),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        submission.form = submission.form.normalized();
        Ok(submission)
    }
}

fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1"
    )
}

async fn read_file(field: Field<'_>) -> Result<Option<UploadedFile>, ApiError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(malformed)?;

    // Browsers send an empty, unnamed part when no file was chosen
    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedFile {
        file_name,
        content_type,
        bytes,
    }))
}

fn malformed(error: axum::extract::multipart::MultipartError) -> ApiError {
    tracing::warn!(error = %error, "Malformed multipart body");
    ApiError::bad_request(format!("Invalid form data: {}", error))
}

fn form_view(form: ProductForm, errors: FormErrors, guard: &AntiForgery) -> FormView<ProductForm> {
    let title = form.page_title();
    let image_url = image_web_path(form.image_path.as_deref());
    FormView::new(title, form, errors, guard.token()).with_image_url(image_url)
}

fn invalid(form: ProductForm, errors: FormErrors, guard: &AntiForgery) -> Response {
    render(StatusCode::UNPROCESSABLE_ENTITY, form_view(form, errors, guard))
}

fn failed(form: ProductForm, message: &str, guard: &AntiForgery) -> Response {
    let mut errors = FormErrors::new();
    errors.add_form_error(message);
    render(StatusCode::INTERNAL_SERVER_ERROR, form_view(form, errors, guard))
}

fn duplicate_sku() -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add("sku", DUPLICATE_SKU);
    errors
}

fn not_found(id: i32) -> ApiError {
    tracing::warn!(product_id = id, "Product not found");
    ApiError::not_found(format!("Product not found: {}", id))
}

/// Stores a valid upload, returning its relative path
///
/// Invalid files are skipped; the product is saved without a new image.
async fn store_image(state: &AppState, image: Option<&UploadedFile>) -> Option<String> {
    let image = image?;
    if !state.files.is_valid_image(Some(image)) {
        tracing::warn!(
            file_name = %image.file_name,
            content_type = image.content_type.as_deref().unwrap_or("unknown"),
            size = image.len(),
            "Ignoring invalid image upload"
        );
        return None;
    }
    state.files.upload(image, PRODUCT_IMAGE_DIR).await
}

/// Removes an upload whose product could not be saved
async fn discard_image(state: &AppState, path: Option<&str>) {
    if let Some(path) = path {
        if !state.files.delete(path).await {
            tracing::warn!(path, "Failed to remove orphaned upload");
        }
    }
}

/// GET /Products
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    guard: AntiForgery,
) -> Result<Response, ApiError> {
    tracing::info!(username = %user.username, "Products index accessed");
    let products: Vec<ProductView> = state
        .products
        .list_active()
        .await?
        .into_iter()
        .map(ProductView::from)
        .collect();
    let (jar, flash) = Flash::take(jar);

    Ok((jar, render(StatusCode::OK, ListView::new(products, flash, guard.token()))).into_response())
}

/// GET /Products/Details/:id
pub async fn details(
    State(state): State<AppState>,
    _user: CurrentUser,
    guard: AntiForgery,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(render(
        StatusCode::OK,
        DetailView::new(ProductView::from(product), guard.token()),
    ))
}

/// GET /Products/Create
pub async fn create_form(_user: CurrentUser, guard: AntiForgery) -> Response {
    render(
        StatusCode::OK,
        form_view(ProductForm::default(), FormErrors::new(), &guard),
    )
}

/// POST /Products/Create
pub async fn create(
    State(state): State<AppState>,
    admin: CurrentUser,
    jar: CookieJar,
    guard: AntiForgery,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let ProductSubmission {
        mut form,
        image,
        antiforgery_token,
    } = ProductSubmission::read(multipart).await?;
    guard.verify(antiforgery_token.as_deref())?;

    // New products always start out active
    form.id = 0;
    form.is_active = true;
    form.image_path = None;

    let mut new_product = match form.to_new_product() {
        Ok(new_product) => new_product,
        Err(errors) => return Ok(invalid(form, errors, &guard)),
    };

    const FAILURE: &str = "An error occurred while creating the product. Please try again.";
    match state.products.sku_exists(&new_product.sku, None).await {
        Ok(true) => return Ok(invalid(form, duplicate_sku(), &guard)),
        Ok(false) => {}
        Err(e) => {
            tracing::error!(error = %e, name = %new_product.name, "Error creating product");
            return Ok(failed(form, FAILURE, &guard));
        }
    }

    new_product.image_path = store_image(&state, image.as_ref()).await;
    let uploaded = new_product.image_path.clone();

    match state.products.create(new_product).await {
        Ok(product) => {
            tracing::info!(
                product_id = product.id,
                name = %product.name,
                admin = %admin.username,
                "Product created successfully"
            );
            let jar = Flash::success("Product created successfully!").store(jar);
            Ok((jar, Redirect::to(INDEX)).into_response())
        }
        Err(RepositoryError::UniqueViolation(constraint)) => {
            tracing::warn!(constraint = %constraint, "SKU claimed concurrently");
            discard_image(&state, uploaded.as_deref()).await;
            Ok(invalid(form, duplicate_sku(), &guard))
        }
        Err(e) => {
            tracing::error!(error = %e, name = ?form.name, "Error creating product");
            discard_image(&state, uploaded.as_deref()).await;
            Ok(failed(form, FAILURE, &guard))
        }
    }
}

/// GET /Products/Edit/:id
pub async fn edit_form(
    State(state): State<AppState>,
    _user: CurrentUser,
    guard: AntiForgery,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(render(
        StatusCode::OK,
        form_view(ProductForm::from(&product), FormErrors::new(), &guard),
    ))
}

/// POST /Products/Edit/:id
///
/// A valid replacement image is written first; the previous file is removed
/// only once the record points at the new one.
pub async fn edit(
    State(state): State<AppState>,
    admin: CurrentUser,
    jar: CookieJar,
    guard: AntiForgery,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let ProductSubmission {
        form,
        image,
        antiforgery_token,
    } = ProductSubmission::read(multipart).await?;
    guard.verify(antiforgery_token.as_deref())?;
    if form.id != id {
        return Err(not_found(id));
    }

    let changes = match form.to_new_product() {
        Ok(changes) => changes,
        Err(errors) => return Ok(invalid(form, errors, &guard)),
    };

    const FAILURE: &str = "An error occurred while updating the product. Please try again.";
    match state.products.sku_exists(&changes.sku, Some(id)).await {
        Ok(true) => return Ok(invalid(form, duplicate_sku(), &guard)),
        Ok(false) => {}
        Err(e) => {
            tracing::error!(error = %e, product_id = id, "Error updating product");
            return Ok(failed(form, FAILURE, &guard));
        }
    }

    let mut product = match state.products.find_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => return Err(not_found(id)),
        Err(e) => {
            tracing::error!(error = %e, product_id = id, "Error updating product");
            return Ok(failed(form, FAILURE, &guard));
        }
    };

    let old_image = product.image_path.clone();
    product.apply(changes);
    let uploaded = store_image(&state, image.as_ref()).await;
    if uploaded.is_some() {
        product.image_path = uploaded.clone();
    }

    match state.products.update(&product).await {
        Ok(product) => {
            if let (Some(new), Some(old)) = (uploaded.as_deref(), old_image.as_deref()) {
                if !old.is_empty() && old != new && !state.files.delete(old).await {
                    tracing::warn!(path = old, "Failed to remove replaced image");
                }
            }
            tracing::info!(
                product_id = product.id,
                name = %product.name,
                admin = %admin.username,
                "Product updated successfully"
            );
            let jar = Flash::success("Product updated successfully!").store(jar);
            Ok((jar, Redirect::to(INDEX)).into_response())
        }
        Err(RepositoryError::NotFound(id)) => {
            discard_image(&state, uploaded.as_deref()).await;
            Err(not_found(id))
        }
        Err(RepositoryError::UniqueViolation(constraint)) => {
            tracing::warn!(constraint = %constraint, "SKU claimed concurrently");
            discard_image(&state, uploaded.as_deref()).await;
            Ok(invalid(form, duplicate_sku(), &guard))
        }
        Err(e) => {
            tracing::error!(error = %e, product_id = id, "Error updating product");
            discard_image(&state, uploaded.as_deref()).await;
            Ok(failed(form, FAILURE, &guard))
        }
    }
}

/// POST /Products/Delete/:id
///
/// Soft delete: the product disappears from the catalog but keeps its row.
pub async fn delete(
    State(state): State<AppState>,
    admin: CurrentUser,
    jar: CookieJar,
    guard: AntiForgery,
    Path(id): Path<i32>,
    Form(form): Form<AntiForgeryForm>,
) -> Result<Response, ApiError> {
    guard.verify(form.token.as_deref())?;

    let result = match state.products.find_by_id(id).await {
        Ok(None) => return Err(not_found(id)),
        Ok(Some(product)) => state.products.soft_delete(id).await.map(|()| product),
        Err(e) => Err(e),
    };

    let flash = match result {
        Ok(product) => {
            tracing::info!(
                product_id = id,
                name = %product.name,
                admin = %admin.username,
                "Product deleted successfully"
            );
            Flash::success("Product deleted successfully!")
        }
        Err(e) => {
            tracing::error!(error = %e, product_id = id, "Error deleting product");
            Flash::error("An error occurred while deleting the product. Please try again.")
        }
    };

    Ok((flash.store(jar), Redirect::to(INDEX)).into_response())
}
