use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::dao::{
    models::{AuthUser, BookmarkRecord, NewBookmark, UserProfile},
    storage::{StorageError, StorageResult},
    user_store::UserStore,
};

use super::{
    config::RestStoreConfig,
    error::{RestStoreError, RestStoreResult},
    models::{BookmarkDocument, BookmarkPage, ProfileBody, bookmark_path, bookmarks_path, profile_path},
};

/// [`UserStore`] backed by the user directory REST service.
#[derive(Clone)]
pub struct RestUserStore {
    client: Client,
    base_url: Arc<str>,
    bearer_token: Option<Arc<str>>,
}

impl RestUserStore {
    /// Build a store from an explicit configuration.
    pub fn new(config: RestStoreConfig) -> RestStoreResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| RestStoreError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            bearer_token: config.bearer_token.map(Arc::from),
        })
    }

    /// Build a store from the environment.
    pub fn from_env() -> RestStoreResult<Self> {
        Self::new(RestStoreConfig::from_env()?)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token.as_ref()),
            None => builder,
        }
    }

    async fn get_document<T>(&self, path: &str) -> RestStoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.request(Method::GET, path).send().await.map_err(|source| {
            RestStoreError::RequestSend {
                path: path.to_string(),
                source,
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    RestStoreError::DecodeResponse {
                        path: path.to_string(),
                        source,
                    }
                })
            }
            other => Err(RestStoreError::RequestStatus {
                path: path.to_string(),
                status: other,
            }),
        }
    }

    async fn fetch_profile(&self, uid: &str) -> RestStoreResult<Option<UserProfile>> {
        self.get_document(&profile_path(uid)).await
    }

    /// Create the profile document. A conflict means another writer created it
    /// first; `None` tells the caller to re-read.
    async fn create_profile(&self, user: &AuthUser) -> RestStoreResult<Option<UserProfile>> {
        let path = profile_path(&user.uid);
        let response = self
            .request(Method::PUT, &path)
            .json(&ProfileBody::from(user))
            .send()
            .await
            .map_err(|source| RestStoreError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Ok(None),
            status if status.is_success() => {
                response
                    .json::<UserProfile>()
                    .await
                    .map(Some)
                    .map_err(|source| RestStoreError::DecodeResponse { path, source })
            }
            other => Err(RestStoreError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn ensure_profile_inner(&self, user: AuthUser) -> RestStoreResult<UserProfile> {
        if let Some(existing) = self.fetch_profile(&user.uid).await? {
            return Ok(existing);
        }
        if let Some(created) = self.create_profile(&user).await? {
            return Ok(created);
        }
        // Lost the creation race; the document must exist now.
        match self.fetch_profile(&user.uid).await? {
            Some(existing) => Ok(existing),
            None => Err(RestStoreError::RequestStatus {
                path: profile_path(&user.uid),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }

    async fn list_inner(&self, uid: &str) -> RestStoreResult<Vec<BookmarkRecord>> {
        let path = bookmarks_path(uid);
        let page: Option<BookmarkPage> = self.get_document(&path).await?;
        Ok(page
            .map(|page| page.items.into_iter().map(Into::into).collect())
            .unwrap_or_default())
    }

    async fn insert_inner(
        &self,
        uid: &str,
        bookmark: NewBookmark,
    ) -> RestStoreResult<BookmarkRecord> {
        let path = bookmarks_path(uid);
        let response = self
            .request(Method::POST, &path)
            .json(&bookmark)
            .send()
            .await
            .map_err(|source| RestStoreError::RequestSend {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestStoreError::RequestStatus { path, status });
        }

        let document = response
            .json::<BookmarkDocument>()
            .await
            .map_err(|source| RestStoreError::DecodeResponse { path, source })?;
        Ok(document.into())
    }

    async fn delete_inner(&self, uid: &str, doc_id: &str) -> RestStoreResult<()> {
        let path = bookmark_path(uid, doc_id);
        let response = self
            .request(Method::DELETE, &path)
            .send()
            .await
            .map_err(|source| RestStoreError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            // Idempotent remove: a document that is already gone is a success.
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            other => Err(RestStoreError::RequestStatus {
                path,
                status: other,
            }),
        }
    }
}

impl UserStore for RestUserStore {
    fn ensure_profile(&self, user: AuthUser) -> BoxFuture<'static, StorageResult<UserProfile>> {
        let store = self.clone();
        Box::pin(async move {
            let uid = user.uid.clone();
            store
                .ensure_profile_inner(user)
                .await
                .map_err(|err| StorageError::write(format!("materializing profile for `{uid}`"), err))
        })
    }

    fn list_bookmarks(
        &self,
        uid: String,
    ) -> BoxFuture<'static, StorageResult<Vec<BookmarkRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_inner(&uid)
                .await
                .map_err(|err| StorageError::read(format!("listing bookmarks for `{uid}`"), err))
        })
    }

    fn insert_bookmark(
        &self,
        uid: String,
        bookmark: NewBookmark,
    ) -> BoxFuture<'static, StorageResult<BookmarkRecord>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .insert_inner(&uid, bookmark)
                .await
                .map_err(|err| StorageError::write(format!("inserting bookmark for `{uid}`"), err))
        })
    }

    fn delete_bookmark(
        &self,
        uid: String,
        doc_id: String,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.delete_inner(&uid, &doc_id).await.map_err(|err| {
                StorageError::write(format!("deleting bookmark `{doc_id}` for `{uid}`"), err)
            })
        })
    }
}
