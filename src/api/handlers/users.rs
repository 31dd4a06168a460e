use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::errors::ApiError;
use crate::api::flash::Flash;
use crate::api::middleware::antiforgery::AntiForgeryForm;
use crate::api::middleware::{AntiForgery, CurrentUser};
use crate::api::state::AppState;
use crate::api::views::{render, DetailView, FormView, ListView};
use crate::domain::repositories::RepositoryError;
use crate::domain::user::form::DUPLICATE_EMAIL;
use crate::domain::user::{User, UserForm};
use crate::domain::validation::FormErrors;

const INDEX: &str = "/Users";
const CREATE_TITLE: &str = "Add New User";
const EDIT_TITLE: &str = "Edit User";

fn form_view(title: &str, form: UserForm, errors: FormErrors, guard: &AntiForgery) -> FormView<UserForm> {
    FormView::new(title, form, errors, guard.token())
}

fn invalid(title: &str, form: UserForm, errors: FormErrors, guard: &AntiForgery) -> Response {
    render(StatusCode::UNPROCESSABLE_ENTITY, form_view(title, form, errors, guard))
}

fn failed(title: &str, form: UserForm, message: &str, guard: &AntiForgery) -> Response {
    let mut errors = FormErrors::new();
    errors.add_form_error(message);
    render(StatusCode::INTERNAL_SERVER_ERROR, form_view(title, form, errors, guard))
}

fn duplicate_email() -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add("email", DUPLICATE_EMAIL);
    errors
}

fn not_found(id: i32) -> ApiError {
    tracing::warn!(user_id = id, "User not found");
    ApiError::not_found(format!("User not found: {}", id))
}

/// GET /Users
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    guard: AntiForgery,
) -> Result<Response, ApiError> {
    tracing::info!(username = %user.username, "Users index accessed");
    let users = state.users.list_all().await?;
    let (jar, flash) = Flash::take(jar);

    Ok((jar, render(StatusCode::OK, ListView::new(users, flash, guard.token()))).into_response())
}

/// GET /Users/Details/:id
pub async fn details(
    State(state): State<AppState>,
    _user: CurrentUser,
    guard: AntiForgery,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let user = state.users.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
    Ok(render(StatusCode::OK, DetailView::new(user, guard.token())))
}

/// GET /Users/Create
pub async fn create_form(_user: CurrentUser, guard: AntiForgery) -> Response {
    render(
        StatusCode::OK,
        form_view(CREATE_TITLE, UserForm::default(), FormErrors::new(), &guard),
    )
}

/// POST /Users/Create
pub async fn create(
    State(state): State<AppState>,
    admin: CurrentUser,
    jar: CookieJar,
    guard: AntiForgery,
    Form(form): Form<UserForm>,
) -> Result<Response, ApiError> {
    guard.verify(form.antiforgery_token.as_deref())?;
    let form = form.normalized();

    let new_user = match form.to_new_user() {
        Ok(new_user) => new_user,
        Err(errors) => return Ok(invalid(CREATE_TITLE, form, errors, &guard)),
    };

    const FAILURE: &str = "An error occurred while creating the user. Please try again.";
    match state.users.email_exists(&new_user.email, None).await {
        Ok(true) => return Ok(invalid(CREATE_TITLE, form, duplicate_email(), &guard)),
        Ok(false) => {}
        Err(e) => {
            tracing::error!(error = %e, name = %new_user.name, "Error creating user");
            return Ok(failed(CREATE_TITLE, form, FAILURE, &guard));
        }
    }

    match state.users.create(new_user).await {
        Ok(user) => {
            tracing::info!(
                user_id = user.id,
                name = %user.name,
                admin = %admin.username,
                "User created successfully"
            );
            let jar = Flash::success("User created successfully!").store(jar);
            Ok((jar, Redirect::to(INDEX)).into_response())
        }
        Err(RepositoryError::UniqueViolation(constraint)) => {
            tracing::warn!(constraint = %constraint, "Email claimed concurrently");
            Ok(invalid(CREATE_TITLE, form, duplicate_email(), &guard))
        }
        Err(e) => {
            tracing::error!(error = %e, name = ?form.name, "Error creating user");
            Ok(failed(CREATE_TITLE, form, FAILURE, &guard))
        }
    }
}

/// GET /Users/Edit/:id
pub async fn edit_form(
    State(state): State<AppState>,
    _user: CurrentUser,
    guard: AntiForgery,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let user = state.users.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
    Ok(render(
        StatusCode::OK,
        form_view(EDIT_TITLE, UserForm::from(&user), FormErrors::new(), &guard),
    ))
}

/// POST /Users/Edit/:id
pub async fn edit(
    State(state): State<AppState>,
    admin: CurrentUser,
    jar: CookieJar,
    guard: AntiForgery,
    Path(id): Path<i32>,
    Form(form): Form<UserForm>,
) -> Result<Response, ApiError> {
    guard.verify(form.antiforgery_token.as_deref())?;
    if form.id != id {
        return Err(not_found(id));
    }
    let form = form.normalized();

    let user = match form.to_new_user() {
        Ok(new_user) => new_user.with_id(id),
        Err(errors) => return Ok(invalid(EDIT_TITLE, form, errors, &guard)),
    };

    const FAILURE: &str = "An error occurred while updating the user. Please try again.";
    match state.users.email_exists(&user.email, Some(id)).await {
        Ok(true) => return Ok(invalid(EDIT_TITLE, form, duplicate_email(), &guard)),
        Ok(false) => {}
        Err(e) => {
            tracing::error!(error = %e, user_id = id, "Error updating user");
            return Ok(failed(EDIT_TITLE, form, FAILURE, &guard));
        }
    }

    match state.users.update(&user).await {
        Ok(User { id, name, .. }) => {
            tracing::info!(user_id = id, name = %name, admin = %admin.username, "User updated successfully");
            let jar = Flash::success("User updated successfully!").store(jar);
            Ok((jar, Redirect::to(INDEX)).into_response())
        }
        Err(RepositoryError::NotFound(id)) => Err(not_found(id)),
        Err(RepositoryError::UniqueViolation(constraint)) => {
            tracing::warn!(constraint = %constraint, "Email claimed concurrently");
            Ok(invalid(EDIT_TITLE, form, duplicate_email(), &guard))
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = id, "Error updating user");
            Ok(failed(EDIT_TITLE, form, FAILURE, &guard))
        }
    }
}

/// POST /Users/Delete/:id
///
/// Store failures never fail the request; they come back as an error flash
/// on the list page.
pub async fn delete(
    State(state): State<AppState>,
    admin: CurrentUser,
    jar: CookieJar,
    guard: AntiForgery,
    Path(id): Path<i32>,
    Form(form): Form<AntiForgeryForm>,
) -> Result<Response, ApiError> {
    guard.verify(form.token.as_deref())?;

    let result = match state.users.find_by_id(id).await {
        Ok(None) => return Err(not_found(id)),
        Ok(Some(user)) => state.users.delete(id).await.map(|()| user),
        Err(e) => Err(e),
    };

    let flash = match result {
        Ok(user) => {
            tracing::info!(user_id = id, name = %user.name, admin = %admin.username, "User deleted successfully");
            Flash::success("User deleted successfully!")
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = id, "Error deleting user");
            Flash::error("An error occurred while deleting the user. Please try again.")
        }
    };

    Ok((flash.store(jar), Redirect::to(INDEX)).into_response())
}
