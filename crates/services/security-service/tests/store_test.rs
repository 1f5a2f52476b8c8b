//! Store integration tests against an in-memory SQLite database.

use std::sync::Arc;

use common::{AppError, DatabaseConfig};
use domain::{NewUser, Role, RoleSource, FULL_ACCESS_ROLE_CODE};
use security_service_lib::infra::Database;
use security_service_lib::repository::{
    InMemoryRoleRepository, RoleAssignmentRepository, RoleRepository, UserRecordRepository,
};
use security_service_lib::service::{AuthenticationService, UserRepository};
use security_service_lib::SecurityServices;
use tokio_test::assert_ok;

async fn services() -> SecurityServices {
    let db = Database::connect(&DatabaseConfig::in_memory()).await.unwrap();
    let annotated = InMemoryRoleRepository::with_defaults()
        .with_role(Role::annotated("guest", "Guest"));
    SecurityServices::from_database(db, annotated).await.unwrap()
}

fn new_user(username: &str) -> NewUser {
    let mut user = NewUser::new(username, "password123");
    user.first_name = Some("Jane".to_string());
    user.email = Some(format!("{}@example.com", username));
    user
}

#[tokio::test]
async fn test_migration_status_after_connect() {
    let services = services().await;

    let status = services.db.migration_status().await.unwrap();
    assert_eq!(status.len(), 3);
    assert!(status.iter().all(|(_, applied)| *applied));
    assert_ok!(services.db.ping().await);
}

#[tokio::test]
async fn test_create_and_find_user() {
    let services = services().await;

    let created = services.users.create(new_user("jdoe")).await.unwrap();
    assert!(created.active);
    assert_ne!(created.password_hash, "password123");

    let found = services.users.find_by_username("jdoe").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, created.id);
    assert_eq!(found[0].email.as_deref(), Some("jdoe@example.com"));

    assert!(services.users.find_by_username("JDOE").await.unwrap().is_empty());
    assert!(matches!(
        services.users.set_active(uuid::Uuid::nil(), false).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let services = services().await;
    services.users.create(new_user("jdoe")).await.unwrap();

    assert!(matches!(
        services.users.create(new_user("jdoe")).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        services.users.create(NewUser::new("short", "pw")).await,
        Err(AppError::ConstraintViolations(_))
    ));
    assert!(matches!(
        services.users.create(new_user("system")).await,
        Err(AppError::Validation(_))
    ));

    let mut bad_zone = new_user("mars");
    bad_zone.time_zone_id = Some("Mars/Olympus".to_string());
    assert!(matches!(
        services.users.create(bad_zone).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_username_like_is_case_sensitive() {
    let services = services().await;
    for username in ["jdoe", "JDOE2", "adoe", "smith"] {
        services.users.create(new_user(username)).await.unwrap();
    }

    let found = services.users.find_by_username_like("doe").await.unwrap();
    let mut names: Vec<_> = found.into_iter().map(|u| u.username).collect();
    names.sort();
    assert_eq!(names, vec!["adoe", "jdoe"]);

    assert!(services.users.find_by_username_like("zzz").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_assignments_keep_insertion_order() {
    let services = services().await;
    let assignments = &services.assignments;

    assignments.assign("jdoe", "b").await.unwrap();
    assignments.assign("jdoe", "a").await.unwrap();
    assignments.assign("other", "a").await.unwrap();

    let codes: Vec<_> = assignments
        .get_assignments_by_username("jdoe")
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.role_code)
        .collect();
    assert_eq!(codes, vec!["b", "a"]);

    assert!(matches!(
        assignments.assign("jdoe", "a").await,
        Err(AppError::Conflict(_))
    ));

    assert_ok!(assignments.revoke("jdoe", "b").await);
    assert!(matches!(
        assignments.revoke("jdoe", "b").await,
        Err(AppError::NotFound)
    ));
    assert_eq!(assignments.get_assignments_by_username("jdoe").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_role_store_and_composite() {
    let services = services().await;

    let created = services
        .role_store
        .create("auditor", "Auditor", Some("Read-only access".to_string()))
        .await
        .unwrap();
    assert_eq!(created.source, RoleSource::Database);
    assert!(matches!(
        services.role_store.create("auditor", "Again", None).await,
        Err(AppError::Conflict(_))
    ));

    let full = services.roles.get_role_by_code(FULL_ACCESS_ROLE_CODE).await.unwrap().unwrap();
    assert_eq!(full.source, RoleSource::Annotated);

    let auditor = services.roles.get_role_by_code("auditor").await.unwrap().unwrap();
    assert_eq!(auditor.description.as_deref(), Some("Read-only access"));

    assert_eq!(services.roles.all_roles().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_load_user_with_authorities() {
    let services = services().await;
    services.users.create(new_user("jdoe")).await.unwrap();
    services.role_store.create("auditor", "Auditor", None).await.unwrap();

    services.assignments.assign("jdoe", "auditor").await.unwrap();
    services.assignments.assign("jdoe", "deleted-role").await.unwrap();
    services.assignments.assign("jdoe", FULL_ACCESS_ROLE_CODE).await.unwrap();

    let user = services.user_repository.load_user_by_username("jdoe").await.unwrap();
    let codes: Vec<_> = user.authorities.iter().map(|a| a.authority()).collect();
    assert_eq!(codes, vec!["auditor", FULL_ACCESS_ROLE_CODE]);

    assert!(matches!(
        services.user_repository.load_user_by_username("nobody").await,
        Err(AppError::UserNotFound(_))
    ));
}

#[tokio::test]
async fn test_anonymous_authorities_resolved_at_startup() {
    let db = Database::connect(&DatabaseConfig::in_memory()).await.unwrap();
    let services = SecurityServices::from_database(db.clone(), InMemoryRoleRepository::with_defaults())
        .await
        .unwrap();
    services.assignments.assign("anonymous", FULL_ACCESS_ROLE_CODE).await.unwrap();

    // Sentinels are built once, so the existing instance has no authorities
    assert!(services.user_repository.anonymous_user().authorities.is_empty());

    let restarted = SecurityServices::from_database(db, InMemoryRoleRepository::with_defaults())
        .await
        .unwrap();
    let anonymous = restarted.user_repository.anonymous_user();
    assert!(anonymous.has_authority(FULL_ACCESS_ROLE_CODE));
    assert!(Arc::ptr_eq(&anonymous, &restarted.user_repository.anonymous_user()));
}

#[tokio::test]
async fn test_authenticate_against_store() {
    let services = services().await;
    let mut user = new_user("jdoe");
    user.time_zone_id = Some("America/New_York".to_string());
    let created = services.users.create(user).await.unwrap();

    let auth = services.authenticator();
    let session = auth.authenticate("jdoe", "password123", None).await.unwrap();
    assert_eq!(session.time_zone(), Some(chrono_tz::America::New_York));

    services.users.set_active(created.id, false).await.unwrap();
    assert!(matches!(
        auth.authenticate("jdoe", "password123", None).await,
        Err(AppError::AccountDisabled)
    ));
}
