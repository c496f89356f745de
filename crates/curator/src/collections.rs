//! Persistence collaborator: collections, saved articles, notes and comments.
//!
//! Records are keyed by the owner's authenticated subject. `MemoryCollectionStore`
//! is the in-process implementation; a document-store backend implements the
//! same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use curator_common::{messages, Article, CuratorError, CuratorResult};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Authenticated subject as supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            name: None,
            email: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    /// Name stamped on authored records
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(messages::ANONYMOUS_AUTHOR)
            .to_string()
    }

    fn authenticated(&self) -> CuratorResult<&str> {
        let subject = self.subject.trim();
        if subject.is_empty() {
            Err(CuratorError::Unauthorized)
        } else {
            Ok(subject)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Copy of an article's citation fields inside one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedArticle {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub owner: String,
    /// Durable key (DOI, URL or local id)
    pub article_key: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub journal: String,
    pub doi: String,
    pub url: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner: String,
    pub article_key: String,
    pub content: String,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub owner: String,
    pub author_name: String,
    pub author_email: String,
    pub article_key: String,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Caller's collections, newest first
    async fn list_collections(&self, who: &Identity) -> CuratorResult<Vec<Collection>>;

    async fn create_collection(
        &self,
        who: &Identity,
        name: &str,
        description: Option<&str>,
        is_public: bool,
    ) -> CuratorResult<Collection>;

    async fn update_collection(
        &self,
        who: &Identity,
        id: Uuid,
        patch: CollectionPatch,
    ) -> CuratorResult<Collection>;

    /// Removes the collection and every article saved in it
    async fn remove_collection(&self, who: &Identity, id: Uuid) -> CuratorResult<()>;

    /// Fails with `Conflict` when the article is already in the collection
    async fn save_article(
        &self,
        who: &Identity,
        collection_id: Uuid,
        article: &Article,
    ) -> CuratorResult<SavedArticle>;

    async fn list_saved(&self, who: &Identity, collection_id: Uuid) -> CuratorResult<Vec<SavedArticle>>;

    async fn remove_saved(&self, who: &Identity, id: Uuid) -> CuratorResult<()>;

    /// One note per (owner, article); a second call replaces the content
    async fn upsert_note(
        &self,
        who: &Identity,
        article_key: &str,
        content: &str,
        is_private: bool,
    ) -> CuratorResult<Note>;

    async fn notes_for(&self, who: &Identity, article_key: &str) -> CuratorResult<Vec<Note>>;

    async fn remove_note(&self, who: &Identity, id: Uuid) -> CuratorResult<()>;

    async fn add_comment(
        &self,
        who: &Identity,
        article_key: &str,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> CuratorResult<Comment>;

    /// All comments on an article, newest first. Readable without identity.
    async fn comments_for(&self, article_key: &str) -> CuratorResult<Vec<Comment>>;

    async fn update_comment(&self, who: &Identity, id: Uuid, content: &str) -> CuratorResult<Comment>;

    /// Removes the comment and its replies
    async fn remove_comment(&self, who: &Identity, id: Uuid) -> CuratorResult<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
struct StoreInner {
    collections: HashMap<Uuid, Collection>,
    saved: Vec<SavedArticle>,
    notes: Vec<Note>,
    comments: Vec<Comment>,
}

impl StoreInner {
    fn owned_collection(&self, owner: &str, id: Uuid) -> CuratorResult<&Collection> {
        let collection = self
            .collections
            .get(&id)
            .ok_or_else(|| CuratorError::NotFound(format!("collection {}", id)))?;
        if collection.owner != owner {
            return Err(CuratorError::Unauthorized);
        }
        Ok(collection)
    }
}

#[derive(Default)]
pub struct MemoryCollectionStore {
    inner: RwLock<StoreInner>,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl CollectionStore for MemoryCollectionStore {
    async fn list_collections(&self, who: &Identity) -> CuratorResult<Vec<Collection>> {
        let owner = who.authenticated()?;
        let inner = self.inner.read().await;
        let mut list: Vec<Collection> = inner
            .collections
            .values()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect();
        newest_first(&mut list, |c| c.created_at);
        Ok(list)
    }

    async fn create_collection(
        &self,
        who: &Identity,
        name: &str,
        description: Option<&str>,
        is_public: bool,
    ) -> CuratorResult<Collection> {
        let owner = who.authenticated()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CuratorError::Validation("collection name is empty".to_string()));
        }

        let now = Utc::now();
        let collection = Collection {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            is_public,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .collections
            .insert(collection.id, collection.clone());
        info!(id = %collection.id, "collection created");
        Ok(collection)
    }

    async fn update_collection(
        &self,
        who: &Identity,
        id: Uuid,
        patch: CollectionPatch,
    ) -> CuratorResult<Collection> {
        let owner = who.authenticated()?;
        let mut inner = self.inner.write().await;
        inner.owned_collection(owner, id)?;

        let collection = inner
            .collections
            .get_mut(&id)
            .ok_or_else(|| CuratorError::NotFound(format!("collection {}", id)))?;
        if let Some(name) = patch.name {
            collection.name = name;
        }
        if let Some(description) = patch.description {
            collection.description = Some(description);
        }
        if let Some(is_public) = patch.is_public {
            collection.is_public = is_public;
        }
        collection.updated_at = Utc::now();
        Ok(collection.clone())
    }

    async fn remove_collection(&self, who: &Identity, id: Uuid) -> CuratorResult<()> {
        let owner = who.authenticated()?;
        let mut inner = self.inner.write().await;
        inner.owned_collection(owner, id)?;

        let before = inner.saved.len();
        inner.saved.retain(|s| s.collection_id != id);
        inner.collections.remove(&id);
        info!(id = %id, removed_articles = before - inner.saved.len(), "collection removed");
        Ok(())
    }

    async fn save_article(
        &self,
        who: &Identity,
        collection_id: Uuid,
        article: &Article,
    ) -> CuratorResult<SavedArticle> {
        let owner = who.authenticated()?;
        let mut inner = self.inner.write().await;
        inner.owned_collection(owner, collection_id)?;

        let key = article.durable_key();
        if inner
            .saved
            .iter()
            .any(|s| s.collection_id == collection_id && s.article_key == key)
        {
            return Err(CuratorError::Conflict(format!("{} already in collection", key)));
        }

        let saved = SavedArticle {
            id: Uuid::new_v4(),
            collection_id,
            owner: owner.to_string(),
            article_key: key,
            title: article.title.clone(),
            authors: article.authors.clone(),
            year: article.year,
            journal: article.journal.clone(),
            doi: article.doi.clone(),
            url: article.url.clone(),
            saved_at: Utc::now(),
        };
        inner.saved.push(saved.clone());
        debug!(collection = %collection_id, key = %saved.article_key, "article saved");
        Ok(saved)
    }

    async fn list_saved(&self, who: &Identity, collection_id: Uuid) -> CuratorResult<Vec<SavedArticle>> {
        let owner = who.authenticated()?;
        let inner = self.inner.read().await;
        let collection = inner
            .collections
            .get(&collection_id)
            .ok_or_else(|| CuratorError::NotFound(format!("collection {}", collection_id)))?;
        if collection.owner != owner && !collection.is_public {
            return Err(CuratorError::Unauthorized);
        }

        let mut list: Vec<SavedArticle> = inner
            .saved
            .iter()
            .filter(|s| s.collection_id == collection_id)
            .cloned()
            .collect();
        newest_first(&mut list, |s| s.saved_at);
        Ok(list)
    }

    async fn remove_saved(&self, who: &Identity, id: Uuid) -> CuratorResult<()> {
        let owner = who.authenticated()?;
        let mut inner = self.inner.write().await;
        let pos = inner
            .saved
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CuratorError::NotFound(format!("saved article {}", id)))?;
        if inner.saved[pos].owner != owner {
            return Err(CuratorError::Unauthorized);
        }
        inner.saved.remove(pos);
        Ok(())
    }

    async fn upsert_note(
        &self,
        who: &Identity,
        article_key: &str,
        content: &str,
        is_private: bool,
    ) -> CuratorResult<Note> {
        let owner = who.authenticated()?;
        let now = Utc::now();
        let mut inner = self.inner.write().await;

        if let Some(note) = inner
            .notes
            .iter_mut()
            .find(|n| n.owner == owner && n.article_key == article_key)
        {
            note.content = content.to_string();
            note.is_private = is_private;
            note.updated_at = now;
            return Ok(note.clone());
        }

        let note = Note {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            article_key: article_key.to_string(),
            content: content.to_string(),
            is_private,
            created_at: now,
            updated_at: now,
        };
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn notes_for(&self, who: &Identity, article_key: &str) -> CuratorResult<Vec<Note>> {
        let owner = who.authenticated()?;
        let inner = self.inner.read().await;
        Ok(inner
            .notes
            .iter()
            .filter(|n| n.owner == owner && n.article_key == article_key)
            .cloned()
            .collect())
    }

    async fn remove_note(&self, who: &Identity, id: Uuid) -> CuratorResult<()> {
        let owner = who.authenticated()?;
        let mut inner = self.inner.write().await;
        let pos = inner
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| CuratorError::NotFound(format!("note {}", id)))?;
        if inner.notes[pos].owner != owner {
            return Err(CuratorError::Unauthorized);
        }
        inner.notes.remove(pos);
        Ok(())
    }

    async fn add_comment(
        &self,
        who: &Identity,
        article_key: &str,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> CuratorResult<Comment> {
        let owner = who.authenticated()?;
        let mut inner = self.inner.write().await;
        if let Some(parent) = parent_id {
            if !inner.comments.iter().any(|c| c.id == parent) {
                return Err(CuratorError::NotFound(format!("comment {}", parent)));
            }
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            author_name: who.display_name(),
            author_email: who.email.clone().unwrap_or_default(),
            article_key: article_key.to_string(),
            content: content.to_string(),
            parent_id,
            created_at: now,
            updated_at: now,
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn comments_for(&self, article_key: &str) -> CuratorResult<Vec<Comment>> {
        let inner = self.inner.read().await;
        let mut list: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|c| c.article_key == article_key)
            .cloned()
            .collect();
        newest_first(&mut list, |c| c.created_at);
        Ok(list)
    }

    async fn update_comment(&self, who: &Identity, id: Uuid, content: &str) -> CuratorResult<Comment> {
        let owner = who.authenticated()?;
        let mut inner = self.inner.write().await;
        let comment = inner
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CuratorError::NotFound(format!("comment {}", id)))?;
        if comment.owner != owner {
            return Err(CuratorError::Unauthorized);
        }
        comment.content = content.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn remove_comment(&self, who: &Identity, id: Uuid) -> CuratorResult<()> {
        let owner = who.authenticated()?;
        let mut inner = self.inner.write().await;
        let comment = inner
            .comments
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CuratorError::NotFound(format!("comment {}", id)))?;
        if comment.owner != owner {
            return Err(CuratorError::Unauthorized);
        }

        // collect the whole reply subtree
        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor];
            doomed.extend(
                inner
                    .comments
                    .iter()
                    .filter(|c| c.parent_id == Some(parent))
                    .map(|c| c.id),
            );
            cursor += 1;
        }
        inner.comments.retain(|c| !doomed.contains(&c.id));
        Ok(())
    }
}
