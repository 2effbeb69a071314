pub mod admin;
pub mod auth;
pub mod catalog;
pub mod review;

use sea_orm::{DatabaseConnection, EntityTrait};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
};

pub(crate) async fn movie_or_404(db: &DatabaseConnection, id: i32) -> AppResult<movie::Model> {
    movie::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)
}
