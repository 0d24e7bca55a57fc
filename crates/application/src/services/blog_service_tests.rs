use std::sync::Arc;

use chrono::NaiveDate;
use domain::DomainError;

use crate::error::ApplicationError;
use crate::services::blog_service::{BlogService, BlogServiceDependencies, CreatePostRequest};
use crate::testing::{fixed_clock, InMemoryBlogPostRepository};

fn service() -> BlogService {
    BlogService::new(BlogServiceDependencies {
        post_repository: Arc::new(InMemoryBlogPostRepository::default()),
        clock: fixed_clock(),
    })
}

fn valid_request() -> CreatePostRequest {
    CreatePostRequest {
        name: "Ada".to_string(),
        email: Some("ada@example.com".to_string()),
        subject: "First post".to_string(),
        date: None,
        description: "Hello, world.".to_string(),
    }
}

#[tokio::test]
async fn test_create_defaults_date_to_today() {
    let service = service();

    let dto = service.create(valid_request()).await.unwrap();

    assert_eq!(dto.id, 1);
    assert_eq!(dto.date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
    assert_eq!(dto.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn test_create_keeps_explicit_date() {
    let service = service();
    let date = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();

    let dto = service
        .create(CreatePostRequest {
            date: Some(date),
            ..valid_request()
        })
        .await
        .unwrap();

    assert_eq!(dto.date, date);
}

#[tokio::test]
async fn test_create_rejects_empty_name() {
    let service = service();

    let result = service
        .create(CreatePostRequest {
            name: "  ".to_string(),
            ..valid_request()
        })
        .await;

    match result {
        Err(ApplicationError::Domain(DomainError::InvalidArgument { field, .. })) => {
            assert_eq!(field, "name");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_treats_blank_email_as_absent() {
    let service = service();

    let dto = service
        .create(CreatePostRequest {
            email: Some("   ".to_string()),
            ..valid_request()
        })
        .await
        .unwrap();

    assert_eq!(dto.email, None);
}

#[tokio::test]
async fn test_list_and_get_round_trip() {
    let service = service();
    let created = service.create(valid_request()).await.unwrap();

    let listed = service.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    let fetched = service.get(created.id).await.unwrap();
    assert_eq!(fetched.subject, "First post");
}

#[tokio::test]
async fn test_get_missing_post_is_not_found() {
    let service = service();

    let result = service.get(42).await;

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::PostNotFound))
    ));
}

#[tokio::test]
async fn test_replace_rewrites_every_field() {
    let service = service();
    let created = service.create(valid_request()).await.unwrap();

    let replaced = service
        .replace(
            created.id,
            CreatePostRequest {
                name: "Grace".to_string(),
                email: None,
                subject: "Rewritten".to_string(),
                date: Some(NaiveDate::from_ymd_opt(2022, 12, 1).unwrap()),
                description: "New body.".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.name, "Grace");
    assert_eq!(replaced.email, None);
    assert_eq!(replaced.subject, "Rewritten");
    assert_eq!(replaced.date, NaiveDate::from_ymd_opt(2022, 12, 1).unwrap());

    let fetched = service.get(created.id).await.unwrap();
    assert_eq!(fetched.description, "New body.");
}

#[tokio::test]
async fn test_replace_without_date_resets_to_today() {
    let service = service();
    let created = service
        .create(CreatePostRequest {
            date: Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            ..valid_request()
        })
        .await
        .unwrap();

    let replaced = service.replace(created.id, valid_request()).await.unwrap();

    assert_eq!(replaced.date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
}

#[tokio::test]
async fn test_replace_missing_post_is_not_found() {
    let service = service();

    let result = service.replace(7, valid_request()).await;

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::PostNotFound))
    ));
}

#[tokio::test]
async fn test_delete_removes_the_post() {
    let service = service();
    let created = service.create(valid_request()).await.unwrap();

    service.delete(created.id).await.unwrap();

    assert!(service.list().await.unwrap().is_empty());
    assert!(matches!(
        service.delete(created.id).await,
        Err(ApplicationError::Domain(DomainError::PostNotFound))
    ));
}
