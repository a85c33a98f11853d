use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        FromRef, Path, State,
    },
    response::{Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    flash::{Flash, FlashKeys, FlashLevel, IncomingFlash},
    state::AppState,
    users::{
        dto::{NewUserInput, UserForm, UserUpdateInput},
        password::hash_password,
        repo::RepoError,
        repo_types::{NewUser, User},
        views::{self, FormMode},
    },
};

const LIST_PATH: &str = "/users";
const NEW_PATH: &str = "/users/new";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/users", get(list_users))
        .route("/users/new", get(new_user_form).post(create_user))
        .route("/users/:id/edit", get(edit_user_form).post(update_user))
        .route("/users/:id/delete", post(delete_user))
}

fn edit_path(id: i64) -> String {
    format!("/users/{id}/edit")
}

/// A body that is not a urlencoded form reads as an empty one, so it fails validation
/// instead of being rejected before the handler runs.
fn form_or_empty(form: Result<Form<UserForm>, FormRejection>) -> UserForm {
    match form {
        Ok(Form(form)) => form,
        Err(e) => {
            warn!(error = %e, "unreadable form body; treating as empty");
            UserForm::default()
        }
    }
}

/// Non-numeric ids are treated like unknown ones.
async fn load_user(
    state: &AppState,
    id: Result<Path<i64>, PathRejection>,
) -> Result<User, AppError> {
    let Ok(Path(id)) = id else {
        return Err(AppError::NotFound);
    };
    User::get_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn home() -> Redirect {
    Redirect::to(LIST_PATH)
}

#[instrument(skip(state, flash))]
pub async fn list_users(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let users = User::list_all_ordered_by_joined_desc(&state.db).await?;
    let page = views::user_list(&users, flash.get());
    Ok(flash.render(page))
}

pub async fn new_user_form(flash: IncomingFlash) -> Response {
    let page = views::user_form(FormMode::Create, None, flash.get());
    flash.render(page)
}

#[instrument(skip(state, form))]
pub async fn create_user(
    State(state): State<AppState>,
    form: Result<Form<UserForm>, FormRejection>,
) -> Result<Response, AppError> {
    let keys = FlashKeys::from_ref(&state);

    let input = match NewUserInput::parse(form_or_empty(form)) {
        Ok(input) => input,
        Err(e) => {
            warn!(error = %e, "create rejected");
            return Ok(keys.redirect(NEW_PATH, Flash::new(FlashLevel::Danger, e.to_string())));
        }
    };

    if User::find_by_email(&state.db, &input.email).await?.is_some() {
        warn!(email = %input.email, "email already registered");
        return Ok(email_taken(&keys, NEW_PATH, "Email already exists."));
    }

    let new = NewUser {
        name: input.name,
        email: input.email,
        password_hash: hash_password(&input.password)?,
        joined_on: OffsetDateTime::now_utc(),
    };
    let user = match User::insert(&state.db, &new).await {
        Ok(user) => user,
        Err(RepoError::DuplicateEmail) => {
            warn!(email = %new.email, "email taken by a concurrent insert");
            return Ok(email_taken(&keys, NEW_PATH, "Email already exists."));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, email = %user.email, "user created");
    Ok(keys.redirect(
        LIST_PATH,
        Flash::new(FlashLevel::Success, "User created successfully."),
    ))
}

#[instrument(skip(state, flash))]
pub async fn edit_user_form(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let user = load_user(&state, id).await?;
    let page = views::user_form(FormMode::Edit, Some(&user), flash.get());
    Ok(flash.render(page))
}

#[instrument(skip(state, form))]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    form: Result<Form<UserForm>, FormRejection>,
) -> Result<Response, AppError> {
    let mut user = load_user(&state, id).await?;
    let keys = FlashKeys::from_ref(&state);
    let back = edit_path(user.id);

    let input = match UserUpdateInput::parse(form_or_empty(form)) {
        Ok(input) => input,
        Err(e) => {
            warn!(user_id = user.id, error = %e, "update rejected");
            return Ok(keys.redirect(&back, Flash::new(FlashLevel::Danger, e.to_string())));
        }
    };

    if User::find_by_email_excluding(&state.db, &input.email, user.id)
        .await?
        .is_some()
    {
        warn!(user_id = user.id, email = %input.email, "email owned by another user");
        return Ok(email_taken(&keys, &back, "Another user already uses that email."));
    }

    user.name = input.name;
    user.email = input.email;
    if let Some(password) = input.password {
        user.password_hash = hash_password(&password)?;
    }

    match user.update(&state.db).await {
        Ok(()) => {}
        Err(RepoError::DuplicateEmail) => {
            warn!(user_id = user.id, email = %user.email, "email taken by a concurrent write");
            return Ok(email_taken(&keys, &back, "Another user already uses that email."));
        }
        Err(e) => return Err(e.into()),
    }

    info!(user_id = user.id, "user updated");
    Ok(keys.redirect(
        LIST_PATH,
        Flash::new(FlashLevel::Success, "User updated successfully."),
    ))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let user = load_user(&state, id).await?;
    User::delete(&state.db, user.id).await?;

    info!(user_id = user.id, email = %user.email, "user deleted");
    Ok(FlashKeys::from_ref(&state).redirect(
        LIST_PATH,
        Flash::new(FlashLevel::Info, "User deleted successfully."),
    ))
}

fn email_taken(keys: &FlashKeys, back: &str, message: &str) -> Response {
    keys.redirect(back, Flash::new(FlashLevel::Warning, message))
}
