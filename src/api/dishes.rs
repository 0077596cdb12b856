use std::sync::Arc;

use axum::{Form, Json, extract::State, response::Redirect};
use serde::Deserialize;

use crate::api::server::AppState;
use crate::auth::guard::{AdminUser, CurrentUser};
use crate::db::models::DishWithClaimant;
use crate::db::repo;
use crate::error::{ApiError, Result};

/// Public dish list with claimant usernames resolved server-side.
pub async fn list_dishes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DishWithClaimant>>> {
    Ok(Json(repo::list_dishes(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddDishForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DishForm {
    #[serde(rename = "dishId")]
    pub dish_id: i64,
}

/// Any logged-in user may add a dish. Who added it is not recorded, only
/// who claims it.
pub async fn add_dish(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Form(form): Form<AddDishForm>,
) -> Result<Redirect> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Dish name is required".to_string()));
    }

    repo::insert_dish(&state.db, name).await?;
    Ok(Redirect::to("/menu.html"))
}

/// Last-writer-wins: an existing claim is silently overwritten.
pub async fn claim_dish(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Form(form): Form<DishForm>,
) -> Result<Redirect> {
    repo::claim_dish(&state.db, form.dish_id, user.session.user_id).await?;
    Ok(Redirect::to("/menu.html"))
}

/// Best-effort release of the caller's own claim: if the dish is unclaimed
/// or claimed by someone else, nothing changes and the request still
/// succeeds.
pub async fn unclaim_dish(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Form(form): Form<DishForm>,
) -> Result<Redirect> {
    repo::unclaim_dish(&state.db, form.dish_id, user.session.user_id).await?;
    Ok(Redirect::to("/menu.html"))
}

pub async fn delete_dish(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Form(form): Form<DishForm>,
) -> Result<Redirect> {
    repo::delete_dish(&state.db, form.dish_id).await?;
    Ok(Redirect::to("/menu.html"))
}
