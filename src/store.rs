use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait, sea_query::Expr,
};
use tracing::debug;

use crate::{entities::movie, ranking};

pub type Movie = movie::Model;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("movie {0} not found")]
    NotFound(i32),

    #[error("\"{0}\" is already on your list")]
    Conflict(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Metadata captured when a movie is first added. Rating and review stay
/// empty until the user edits the record.
#[derive(Clone, Debug)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub description: String,
    pub image_url: String,
}

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns every movie ascending by rating (unrated first) with freshly
    /// computed rankings, and writes those rankings back.
    pub async fn list_all(&self) -> Result<Vec<Movie>, StoreError> {
        let movies = movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?;
        let ranked = ranking::rank(movies);

        let txn = self.db.begin().await?;
        for m in &ranked {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(m.ranking))
                .filter(movie::Column::Id.eq(m.id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        debug!(count = ranked.len(), "re-ranked movies");
        Ok(ranked)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Movie, StoreError> {
        movie::Entity::find_by_id(id).one(&self.db).await?.ok_or(StoreError::NotFound(id))
    }

    pub async fn insert(&self, new: NewMovie) -> Result<i32, StoreError> {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(new.title.clone()),
            year: Set(new.year),
            description: Set(new.description),
            ranking: Set(None),
            rating: Set(None),
            review: Set(None),
            image_url: Set(new.image_url),
        };

        match movie::Entity::insert(model).exec(&self.db).await {
            Ok(res) => {
                debug!(movie_id = res.last_insert_id, title = %new.title, "inserted movie");
                Ok(res.last_insert_id)
            },
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(StoreError::Conflict(new.title)),
                _ => Err(err.into()),
            },
        }
    }

    pub async fn update(&self, id: i32, rating: f64, review: &str) -> Result<(), StoreError> {
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Rating, Expr::value(rating))
            .col_expr(movie::Column::Review, Expr::value(review))
            .filter(movie::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if res.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!(movie_id = id, rating, "updated rating");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!(movie_id = id, "deleted movie");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, MovieStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("movies.db").display());
        let db = crate::db::connect(&url).await.unwrap();
        (dir, MovieStore::new(db))
    }

    fn new_movie(title: &str) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            year: Some(2010),
            description: format!("About {title}"),
            image_url: format!("https://image.tmdb.org/t/p/w500/{title}.jpg"),
        }
    }

    #[tokio::test]
    async fn insert_then_get() {
        let (_dir, store) = store().await;
        let id = store.insert(new_movie("Inception")).await.unwrap();

        let movie = store.get_by_id(id).await.unwrap();
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.year, Some(2010));
        assert_eq!(movie.rating, None);
        assert_eq!(movie.review, None);
    }

    #[tokio::test]
    async fn duplicate_title_conflicts_and_leaves_store_unchanged() {
        let (_dir, store) = store().await;
        store.insert(new_movie("Inception")).await.unwrap();

        let mut dup = new_movie("Inception");
        dup.year = Some(1999);
        let err = store.insert(dup).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref t) if t == "Inception"));

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].year, Some(2010));
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let (_dir, store) = store().await;
        let id = store.insert(new_movie("Heat")).await.unwrap();

        let err = store.update(id + 1, 7.0, "Good").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(n) if n == id + 1));

        let movie = store.get_by_id(id).await.unwrap();
        assert_eq!(movie.rating, None);
        assert_eq!(movie.review, None);
    }

    #[tokio::test]
    async fn update_sets_rating_and_review() {
        let (_dir, store) = store().await;
        let id = store.insert(new_movie("Heat")).await.unwrap();
        store.update(id, 8.5, "Great shootout").await.unwrap();

        let movie = store.get_by_id(id).await.unwrap();
        assert_eq!(movie.rating, Some(8.5));
        assert_eq!(movie.review.as_deref(), Some("Great shootout"));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let (_dir, store) = store().await;
        let id = store.insert(new_movie("Alien")).await.unwrap();
        store.delete(id).await.unwrap();

        assert!(matches!(store.get_by_id(id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_all_ranks_and_persists() {
        let (_dir, store) = store().await;
        let low = store.insert(new_movie("Low")).await.unwrap();
        let high = store.insert(new_movie("High")).await.unwrap();
        store.update(low, 5.0, "Fine").await.unwrap();
        store.update(high, 8.0, "Great").await.unwrap();

        let all = store.list_all().await.unwrap();
        let ranked: Vec<(i32, Option<i32>)> = all.iter().map(|m| (m.id, m.ranking)).collect();
        assert_eq!(ranked, vec![(low, Some(2)), (high, Some(1))]);

        assert_eq!(store.get_by_id(high).await.unwrap().ranking, Some(1));
        assert_eq!(store.get_by_id(low).await.unwrap().ranking, Some(2));
    }

    #[tokio::test]
    async fn list_all_recomputes_after_changes() {
        let (_dir, store) = store().await;
        let a = store.insert(new_movie("A")).await.unwrap();
        let b = store.insert(new_movie("B")).await.unwrap();
        store.update(a, 9.0, "a").await.unwrap();
        store.update(b, 3.0, "b").await.unwrap();
        store.list_all().await.unwrap();

        store.update(b, 10.0, "b again").await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all.last().map(|m| m.id), Some(b));
        assert_eq!(store.get_by_id(b).await.unwrap().ranking, Some(1));
        assert_eq!(store.get_by_id(a).await.unwrap().ranking, Some(2));
    }
}
