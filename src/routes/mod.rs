//! HTTP surface.
//!
//! Signup, login and `/health` are public; everything else sits behind
//! [`require_auth`]. Ids travel as query parameters and are UUIDs.

mod address;
mod admin;
mod cart;
mod comments;
mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::error::{EcommerceError, Result};
use crate::middleware::{require_auth, AuthUser};
use crate::state::AppState;

pub use users::UserView;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/userinfo", get(users::user_info))
        .route("/users/userdelete", delete(users::user_delete))
        .route("/users/productview", get(users::product_view))
        .route("/users/search", get(users::search))
        .route("/users/addfavorites", get(users::add_favorite))
        .route("/users/removefavorites", get(users::remove_favorite))
        .route("/admin/addproduct", post(admin::add_product))
        .route("/admin/addmanyproducts", post(admin::add_many_products))
        .route("/admin/deleteProduct", delete(admin::delete_product))
        .route("/addtocart", get(cart::add_to_cart))
        .route("/removeitem", get(cart::remove_item))
        .route("/listcart", get(cart::list_cart))
        .route("/cartcheckout", get(cart::checkout))
        .route("/instantbuy", get(cart::instant_buy))
        .route("/addaddress", post(address::add_address))
        .route("/edithomeaddress", put(address::edit_home_address))
        .route("/editworkaddress", put(address::edit_work_address))
        .route("/deleteaddresses", get(address::delete_addresses))
        .route("/addcomments", post(comments::add_comment))
        .route("/deletecomments", delete(comments::delete_comment))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/users/signup", post(users::sign_up))
        .route("/users/login", post(users::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "storefront-api"}))
}

#[derive(Debug, Serialize)]
pub(crate) struct Message {
    message: String,
}

pub(crate) fn message(text: impl Into<String>) -> Json<Message> {
    Json(Message { message: text.into() })
}

/// Parse a required id parameter, naming it in the error.
pub(crate) fn parse_id(raw: Option<&str>, name: &str) -> Result<Uuid> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| EcommerceError::validation(format!("{name} is empty")))?;
    Uuid::parse_str(raw).map_err(|_| EcommerceError::validation(format!("{name} is not a valid id")))
}

/// The explicit user id when given, otherwise the caller's own.
pub(crate) fn user_id_or_caller(raw: Option<&str>, name: &str, caller: &AuthUser) -> Result<Uuid> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(_) => parse_id(raw, name),
        None => Ok(caller.user_id),
    }
}

pub(crate) type Caller = Extension<AuthUser>;

/// JSON body extractor whose rejection is a 400 with the usual error body.
pub(crate) struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = EcommerceError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection: JsonRejection| {
            tracing::debug!(error = %rejection.body_text(), "rejected request body");
            EcommerceError::validation(rejection.body_text())
        })?;
        Ok(Self(value))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductUserQuery {
    pub id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CartQuery {
    pub id: Option<String>,
    pub userid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InstantBuyQuery {
    pub pid: Option<String>,
    pub userid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommentQuery {
    pub id: Option<String>,
    pub comment_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    pub name: Option<String>,
}
