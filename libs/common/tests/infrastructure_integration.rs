//! Integration tests for the infrastructure components
//!
//! These tests verify that the SQLite pool comes up, the embedded migrations
//! apply cleanly and the schema enforces the constraints the services rely on.

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use sqlx::Row;

#[tokio::test]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "SQLite simple query test failed");

    run_migrations(&pool).await?;
    // Running twice is a no-op
    run_migrations(&pool).await?;

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(&pool)
            .await?;
    assert!(tables.contains(&"users".to_string()));
    assert!(tables.contains(&"posts".to_string()));

    Ok(())
}

#[tokio::test]
async fn test_schema_constraints() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;
    run_migrations(&pool).await?;

    let insert_user = "INSERT INTO users (id, email, hashed_password, created_at, updated_at)
                       VALUES (?, ?, 'x', '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')";

    sqlx::query(insert_user)
        .bind(vec![1u8; 16])
        .bind("a@example.com")
        .execute(&pool)
        .await?;

    // Email uniqueness ignores case
    let duplicate = sqlx::query(insert_user)
        .bind(vec![2u8; 16])
        .bind("A@Example.com")
        .execute(&pool)
        .await;
    assert!(duplicate.is_err(), "duplicate email should be rejected");

    // Posts must reference an existing user
    let orphan = sqlx::query(
        "INSERT INTO posts (id, user_id, url, file_type, file_name, created_at)
         VALUES (?, ?, 'https://cdn/x', 'image', 'x.png', '2025-01-01T00:00:00Z')",
    )
    .bind(vec![3u8; 16])
    .bind(vec![9u8; 16])
    .execute(&pool)
    .await;
    assert!(orphan.is_err(), "post without owner should be rejected");

    // file_type is restricted to image | video
    let bad_type = sqlx::query(
        "INSERT INTO posts (id, user_id, url, file_type, file_name, created_at)
         VALUES (?, ?, 'https://cdn/x', 'audio', 'x.mp3', '2025-01-01T00:00:00Z')",
    )
    .bind(vec![4u8; 16])
    .bind(vec![1u8; 16])
    .execute(&pool)
    .await;
    assert!(bad_type.is_err(), "unknown file type should be rejected");

    Ok(())
}
