use axum::{extract::State, response::Response};
use sea_orm::DatabaseConnection;

use super::json_or_error;
use crate::services::birthday_service;

#[utoipa::path(
    get,
    path = "/api/stats/birthdays",
    responses(
        (status = 200, description = "People ordered by upcoming birthday")
    )
)]
pub async fn birthdays(State(db): State<DatabaseConnection>) -> Response {
    let today = chrono::Local::now().date_naive();
    json_or_error(birthday_service::get_birthdays(&db, today).await)
}
