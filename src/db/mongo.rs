//! MongoDB client and collection wrapper
//!
//! The client is built once at startup and verified with a `ping`; the driver
//! keeps its own connection pool behind the cheap-to-clone `Client` handle.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::{
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::QuireError;

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the deployment answers a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, QuireError> {
        info!("Connecting to MongoDB database '{}'", db_name);

        // Fail fast instead of hanging on an unreachable server
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| QuireError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let mongo = Self {
            client,
            db_name: db_name.to_string(),
        };
        mongo.ping().await?;

        info!("Connected to MongoDB database '{}'", db_name);
        Ok(mongo)
    }

    /// Health check against the configured database
    pub async fn ping(&self) -> Result<(), QuireError> {
        self.client
            .database(&self.db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| QuireError::Database(format!("MongoDB ping failed: {}", e)))
    }

    /// Get a typed collection, creating its indexes
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, QuireError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, QuireError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), QuireError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| QuireError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, stamping its metadata timestamps first
    pub async fn insert_one(&self, item: &mut T) -> Result<ObjectId, QuireError> {
        *item.mut_metadata() = Metadata::new();

        let result = self
            .inner
            .insert_one(&*item)
            .await
            .map_err(|e| write_error("Insert", e))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| QuireError::Database("Failed to get inserted ID".into()))
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, QuireError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| QuireError::Database(format!("Find failed: {}", e)))
    }

    /// Find one page of documents, newest first
    pub async fn find_page(
        &self,
        filter: Document,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<T>, QuireError> {
        use futures_util::TryStreamExt;

        let options = FindOptions::builder()
            .sort(doc! { "metadata.created_at": -1, "_id": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let cursor = self
            .inner
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| QuireError::Database(format!("Find failed: {}", e)))?;

        cursor.try_collect().await.map_err(|e| {
            error!("Error reading document: {}", e);
            QuireError::Database(format!("Cursor read failed: {}", e))
        })
    }

    /// Apply `$set` fields and return the document as it is after the update
    pub async fn update_one_returning(
        &self,
        filter: Document,
        mut set: Document,
    ) -> Result<Option<T>, QuireError> {
        set.insert("metadata.updated_at", DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.inner
            .find_one_and_update(filter, doc! { "$set": set })
            .with_options(options)
            .await
            .map_err(|e| write_error("Update", e))
    }

    /// Hard delete one document, returning what was removed
    pub async fn delete_one_returning(&self, filter: Document) -> Result<Option<T>, QuireError> {
        self.inner
            .find_one_and_delete(filter)
            .await
            .map_err(|e| QuireError::Database(format!("Delete failed: {}", e)))
    }
}

/// Map driver write errors, singling out unique index violations
fn write_error(operation: &str, error: MongoError) -> QuireError {
    if is_duplicate_key(&error) {
        QuireError::Duplicate(error.to_string())
    } else {
        QuireError::Database(format!("{} failed: {}", operation, error))
    }
}

fn is_duplicate_key(error: &MongoError) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
