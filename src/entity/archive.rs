//! Archive entity - one newspaper issue in its year partition

use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
  FromJsonQueryResult,
)]
pub struct Tags(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "archives_pdf")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub year: i32,
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub filename: String,
  pub title: String,
  pub issue_number: Option<i32>,
  pub published_at: DateTime,
  pub description: Option<String>,
  #[sea_orm(column_type = "Json")]
  pub tags: Tags,
  pub cover_url: Option<String>,
  pub asset_url: String,
  pub size_bytes: i64,
  pub views: i64,
  pub downloads: i64,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
