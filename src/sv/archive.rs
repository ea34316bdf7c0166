use sea_orm::sea_query::Expr;
use serde::Serialize;

use crate::{
  entity::archive,
  prelude::*,
};

pub const MAX_PAGE_SIZE: u64 = 100;

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct NewArchive {
  pub year: i32,
  pub id: String,
  pub filename: String,
  pub title: String,
  pub issue_number: Option<i32>,
  pub published_at: DateTime,
  pub description: Option<String>,
  pub tags: Vec<String>,
  pub cover_url: Option<String>,
  pub asset_url: String,
  pub size_bytes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub items: Vec<T>,
  pub page: u64,
  pub per_page: u64,
  pub total: u64,
  pub pages: u64,
}

#[derive(Debug, Clone, Copy)]
enum Counter {
  Views,
  Downloads,
}

pub struct Archive<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Archive<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Documents arrive through the upload tooling; kept for seeding.
  #[cfg(test)]
  pub async fn create(&self, new: NewArchive) -> Result<archive::Model> {
    let archive = archive::ActiveModel {
      year: Set(new.year),
      id: Set(new.id),
      filename: Set(new.filename),
      title: Set(new.title),
      issue_number: Set(new.issue_number),
      published_at: Set(new.published_at),
      description: Set(new.description),
      tags: Set(archive::Tags(new.tags)),
      cover_url: Set(new.cover_url),
      asset_url: Set(new.asset_url),
      size_bytes: Set(new.size_bytes),
      views: Set(0),
      downloads: Set(0),
      created_at: Set(utils::now()),
    };

    Ok(archive.insert(self.db).await?)
  }

  /// Years holding at least one document, newest first.
  pub async fn years(&self) -> Result<Vec<i32>> {
    let years = archive::Entity::find()
      .select_only()
      .column(archive::Column::Year)
      .distinct()
      .order_by_desc(archive::Column::Year)
      .into_tuple()
      .all(self.db)
      .await?;
    Ok(years)
  }

  /// One page of a year, newest issue first. `page` is 1-based.
  pub async fn page(
    &self,
    year: i32,
    page: u64,
    per_page: u64,
  ) -> Result<Page<archive::Model>> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
    // offsets are bound as signed 64-bit integers
    let offset = (page - 1).checked_mul(per_page);
    if offset.is_none_or(|offset| offset > i64::MAX as u64) {
      return Err(Error::Invalid(format!("page {page} is out of range")));
    }

    let paginator = archive::Entity::find()
      .filter(archive::Column::Year.eq(year))
      .order_by_desc(archive::Column::PublishedAt)
      .order_by_asc(archive::Column::Id)
      .paginate(self.db, per_page);

    let counts = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok(Page {
      items,
      page,
      per_page,
      total: counts.number_of_items,
      pages: counts.number_of_pages,
    })
  }

  pub async fn get(&self, year: i32, id: &str) -> Result<archive::Model> {
    archive::Entity::find_by_id((year, id.to_string()))
      .one(self.db)
      .await?
      .ok_or(Error::ArchiveNotFound)
  }

  pub async fn record_view(&self, year: i32, id: &str) -> Result<()> {
    self.bump(year, id, Counter::Views).await
  }

  pub async fn record_download(&self, year: i32, id: &str) -> Result<()> {
    self.bump(year, id, Counter::Downloads).await
  }

  async fn bump(&self, year: i32, id: &str, counter: Counter) -> Result<()> {
    let column = match counter {
      Counter::Views => archive::Column::Views,
      Counter::Downloads => archive::Column::Downloads,
    };

    let result = archive::Entity::update_many()
      .col_expr(column, Expr::col(column).add(1))
      .filter(archive::Column::Year.eq(year))
      .filter(archive::Column::Id.eq(id))
      .exec(self.db)
      .await?;

    if result.rows_affected == 0 {
      return Err(Error::ArchiveNotFound);
    }
    Ok(())
  }
}
