use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::db::models::Article;
use crate::error::AppError;

/// Repository trait for article operations.
///
/// Every read and write except `insert` is scoped to an owner, so a caller
/// can never observe or touch another user's articles through it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Persist a freshly created article.
    async fn insert(&self, article: Article) -> Result<(), AppError>;

    /// Find an article by id, only if it belongs to `owner`.
    async fn find_owned(&self, id: &ObjectId, owner: &str) -> Result<Option<Article>, AppError>;

    /// List all articles belonging to `owner`, newest first.
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Article>, AppError>;

    /// Replace the stored article with the same id and owner.
    ///
    /// Returns `false` if no such article exists anymore.
    async fn update(&self, article: &Article) -> Result<bool, AppError>;

    /// Delete an article by id, only if it belongs to `owner`.
    ///
    /// Returns `false` if nothing was deleted.
    async fn delete_owned(&self, id: &ObjectId, owner: &str) -> Result<bool, AppError>;
}

/// MongoDB implementation of the ArticleRepository.
pub struct MongoArticleRepository {
    collection: mongodb::Collection<Article>,
}

impl MongoArticleRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("articles"),
        }
    }

    /// Create the owner index used by every query in this repository.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        let index = IndexModel::builder()
            .keys(doc! { "created_by": 1, "_id": -1 })
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ArticleRepository for MongoArticleRepository {
    async fn insert(&self, article: Article) -> Result<(), AppError> {
        self.collection
            .insert_one(&article)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_owned(&self, id: &ObjectId, owner: &str) -> Result<Option<Article>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": *id, "created_by": owner })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Article>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        // ObjectIds start with a timestamp, so descending _id is newest first
        let options = FindOptions::builder().sort(doc! { "_id": -1 }).build();

        let mut cursor = self
            .collection
            .find(doc! { "created_by": owner })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut articles = Vec::new();
        while let Some(article) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            articles.push(article);
        }

        Ok(articles)
    }

    async fn update(&self, article: &Article) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .replace_one(
                doc! { "_id": article.id, "created_by": &article.created_by },
                article,
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.matched_count > 0)
    }

    async fn delete_owned(&self, id: &ObjectId, owner: &str) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .delete_one(doc! { "_id": *id, "created_by": owner })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }
}

/// In-process implementation, used when no MongoDB instance is configured.
///
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryArticleRepository {
    articles: RwLock<Vec<Article>>,
}

impl MemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleRepository for MemoryArticleRepository {
    async fn insert(&self, article: Article) -> Result<(), AppError> {
        let mut articles = self.articles.write().await;
        if articles.iter().any(|a| a.id == article.id) {
            return Err(AppError::Database(format!(
                "Duplicate article id {}",
                article.id
            )));
        }
        articles.push(article);
        Ok(())
    }

    async fn find_owned(&self, id: &ObjectId, owner: &str) -> Result<Option<Article>, AppError> {
        Ok(self
            .articles
            .read()
            .await
            .iter()
            .find(|a| a.id == *id && a.created_by == owner)
            .cloned())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Article>, AppError> {
        let mut owned: Vec<Article> = self
            .articles
            .read()
            .await
            .iter()
            .filter(|a| a.created_by == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(owned)
    }

    async fn update(&self, article: &Article) -> Result<bool, AppError> {
        let mut articles = self.articles.write().await;
        match articles
            .iter_mut()
            .find(|a| a.id == article.id && a.created_by == article.created_by)
        {
            Some(stored) => {
                *stored = article.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_owned(&self, id: &ObjectId, owner: &str) -> Result<bool, AppError> {
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|a| !(a.id == *id && a.created_by == owner));
        Ok(articles.len() < before)
    }
}
