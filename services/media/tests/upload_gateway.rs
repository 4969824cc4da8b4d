//! Upload pipeline tests against an in-memory store and a scripted media host

use async_trait::async_trait;
use common::database::{DatabaseConfig, init_pool, run_migrations};
use media::{
    Database, FileType, HostError, MediaHost, StagedFile, StoredFile, UploadError, UploadGateway,
    UploadRequest,
};
use sqlx::SqlitePool;
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use uuid::Uuid;

enum Script {
    Store,
    NoFileId,
    Reject,
}

struct ScriptedHost {
    script: Script,
    seen: Mutex<Vec<(PathBuf, Vec<u8>, String)>>,
}

impl ScriptedHost {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl MediaHost for ScriptedHost {
    async fn upload(&self, file: &StagedFile, file_name: &str) -> Result<StoredFile, HostError> {
        let bytes = tokio::fs::read(file.path()).await?;
        self.seen
            .lock()
            .unwrap()
            .push((file.path().to_path_buf(), bytes, file_name.to_string()));

        match self.script {
            Script::Store => Ok(StoredFile {
                file_id: Some("file_123".to_string()),
                name: format!("unique_{}", file_name),
                url: format!("https://cdn.example.com/unique_{}", file_name),
            }),
            Script::NoFileId => Ok(StoredFile {
                file_id: None,
                name: file_name.to_string(),
                url: format!("https://cdn.example.com/{}", file_name),
            }),
            Script::Reject => Err(HostError::Rejected {
                status: 403,
                message: "invalid key".to_string(),
            }),
        }
    }
}

async fn setup() -> (SqlitePool, Uuid) {
    let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let owner = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, email, hashed_password, created_at, updated_at)
         VALUES (?, 'owner@example.com', 'x', '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')",
    )
    .bind(owner)
    .execute(&pool)
    .await
    .unwrap();

    (pool, owner)
}

async fn staged(name: &str, bytes: &[u8]) -> StagedFile {
    let mut staged = StagedFile::create(name).unwrap();
    staged.write_chunk(bytes).await.unwrap();
    staged
}

fn request(owner: Uuid, file_name: &str, content_type: Option<&str>) -> UploadRequest {
    UploadRequest {
        owner_id: owner,
        caption: "sunset".to_string(),
        file_name: file_name.to_string(),
        content_type: content_type.map(str::to_string),
    }
}

async fn post_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_upload_persists_post_with_host_details() {
    let (pool, owner) = setup().await;
    let host = ScriptedHost::new(Script::Store);
    let gateway = UploadGateway::new(host.clone(), Database::new(pool.clone()));

    let post = gateway
        .upload(
            staged("beach.png", b"\x89PNG fake").await,
            request(owner, "beach.png", Some("image/png")),
        )
        .await
        .unwrap();

    assert_eq!(post.user_id, owner);
    assert_eq!(post.caption, "sunset");
    assert_eq!(post.file_type, FileType::Image);
    assert_eq!(post.file_name, "unique_beach.png");
    assert_eq!(post.url, "https://cdn.example.com/unique_beach.png");
    assert_eq!(post_count(&pool).await, 1);

    let seen = host.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (path, bytes, name) = &seen[0];
    assert_eq!(bytes.as_slice(), b"\x89PNG fake");
    assert_eq!(name, "beach.png");
    // Staged bytes are gone once the upload completes
    assert!(!path.exists());
}

#[tokio::test]
async fn test_video_mime_is_recorded_as_video() {
    let (pool, owner) = setup().await;
    let gateway = UploadGateway::new(
        ScriptedHost::new(Script::Store),
        Database::new(pool.clone()),
    );

    let post = gateway
        .upload(
            staged("clip.mp4", b"fake video").await,
            request(owner, "clip.mp4", Some("video/mp4")),
        )
        .await
        .unwrap();

    assert_eq!(post.file_type, FileType::Video);

    let stored: String = sqlx::query_scalar("SELECT file_type FROM posts WHERE id = ?")
        .bind(post.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "video");
}

#[tokio::test]
async fn test_missing_file_id_writes_nothing() {
    let (pool, owner) = setup().await;
    let host = ScriptedHost::new(Script::NoFileId);
    let gateway = UploadGateway::new(host.clone(), Database::new(pool.clone()));

    let result = gateway
        .upload(
            staged("cat.gif", b"GIF89a").await,
            request(owner, "cat.gif", None),
        )
        .await;

    assert!(matches!(result, Err(UploadError::MissingFileId(name)) if name == "cat.gif"));
    assert_eq!(post_count(&pool).await, 0);

    let seen = host.seen.lock().unwrap();
    assert!(!seen[0].0.exists());
}

#[tokio::test]
async fn test_host_rejection_writes_nothing() {
    let (pool, owner) = setup().await;
    let gateway = UploadGateway::new(
        ScriptedHost::new(Script::Reject),
        Database::new(pool.clone()),
    );

    let result = gateway
        .upload(
            staged("cat.png", b"bytes").await,
            request(owner, "cat.png", Some("image/png")),
        )
        .await;

    assert!(matches!(
        result,
        Err(UploadError::Host(HostError::Rejected { status: 403, .. }))
    ));
    assert_eq!(post_count(&pool).await, 0);
}

#[tokio::test]
async fn test_unknown_owner_fails_persistence() {
    let (pool, _) = setup().await;
    let gateway = UploadGateway::new(
        ScriptedHost::new(Script::Store),
        Database::new(pool.clone()),
    );

    let result = gateway
        .upload(
            staged("cat.png", b"bytes").await,
            request(Uuid::new_v4(), "cat.png", Some("image/png")),
        )
        .await;

    assert!(matches!(result, Err(UploadError::Persistence(_))));
    assert_eq!(post_count(&pool).await, 0);
}
