use super::*;
use crate::directory::storage_adapter::MockStorage;
use crate::password::verify_password;

const NOW: i64 = 1_700_000_000_000;

fn logic() -> UserDirectoryLogic<MockStorage> {
    UserDirectoryLogic::new(MockStorage::new())
}

fn user(username: &str, email: &str, role: Role, at: i64) -> StoredUser {
    StoredUser::new(username, email, None, role, Timestamp::new(at))
}

// =========================================================
// 唯一索引
// =========================================================

#[tokio::test]
async fn test_insert_and_lookup() {
    let dir = logic();
    let stored = dir
        .insert(user("alice", "alice@example.com", Role::Tester, NOW))
        .await
        .unwrap();

    let by_email = Directory::find_by_email(&dir, "alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email, stored);

    let by_id = Directory::find_by_id(&dir, &stored.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "alice");

    assert!(Directory::username_exists(&dir, "alice").await.unwrap());
    assert!(!Directory::username_exists(&dir, "bob").await.unwrap());
    assert!(Directory::find_by_email(&dir, "nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let dir = logic();
    dir.insert(user("alice", "alice@example.com", Role::Tester, NOW))
        .await
        .unwrap();

    let err = dir
        .insert(user("alice2", "alice@example.com", Role::Tester, NOW))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
    assert_eq!(err.message(), MSG_EMAIL_TAKEN);

    // 失败的写入不能留下索引
    assert!(!Directory::username_exists(&dir, "alice2").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let dir = logic();
    dir.insert(user("alice", "alice@example.com", Role::Tester, NOW))
        .await
        .unwrap();

    let err = dir
        .insert(user("alice", "other@example.com", Role::Tester, NOW))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
    assert_eq!(err.message(), MSG_USERNAME_TAKEN);
}

// =========================================================
// 密码更新
// =========================================================

#[tokio::test]
async fn test_set_password_hash_updates_timestamp() {
    let dir = logic();
    let created = dir
        .insert(user("g", "g@example.com", Role::Tester, NOW))
        .await
        .unwrap();
    assert!(created.password_hash.is_none());

    let later = Timestamp::new(NOW + 60_000);
    let updated = Directory::set_password_hash(&dir, "g@example.com", "hashed".into(), later)
        .await
        .unwrap();

    assert_eq!(updated.password_hash.as_deref(), Some("hashed"));
    assert_eq!(updated.updated_at, later.to_datetime());
    assert_eq!(updated.created_at, created.created_at);

    let reloaded = Directory::find_by_id(&dir, &created.id).await.unwrap().unwrap();
    assert_eq!(reloaded.password_hash.as_deref(), Some("hashed"));
}

#[tokio::test]
async fn test_set_password_hash_unknown_user() {
    let dir = logic();
    let err = Directory::set_password_hash(&dir, "ghost@example.com", "x".into(), Timestamp::new(NOW))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.message(), MSG_USER_NOT_FOUND);
}

// =========================================================
// 列表
// =========================================================

#[tokio::test]
async fn test_list_newest_first_with_role_filter() {
    let dir = logic();
    dir.insert(user("old", "old@example.com", Role::Tester, NOW))
        .await
        .unwrap();
    dir.insert(user("boss", "boss@example.com", Role::Admin, NOW + 1_000))
        .await
        .unwrap();
    dir.insert(user("new", "new@example.com", Role::Tester, NOW + 2_000))
        .await
        .unwrap();

    let all = dir.list(None).await.unwrap();
    let names: Vec<&str> = all.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["new", "boss", "old"]);

    let testers = dir.list(Some(Role::Tester)).await.unwrap();
    let names: Vec<&str> = testers.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["new", "old"]);

    let admins = dir.list(Some(Role::Admin)).await.unwrap();
    assert_eq!(admins.len(), 1);
}

// =========================================================
// 种子
// =========================================================

#[tokio::test]
async fn test_seed_inserts_sample_accounts_once() {
    let dir = logic();
    let now = Timestamp::new(NOW);

    assert_eq!(dir.seed(&SAMPLE_ACCOUNTS, now).await.unwrap(), 2);

    let admin = Directory::find_by_email(&dir, "admin@testops.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert!(verify_password("admin123", admin.password_hash.as_deref().unwrap()));

    let tester = Directory::find_by_email(&dir, "test@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tester.username, "testuser");
    assert_eq!(tester.role, Role::Tester);

    // 第二次启动不重复写入
    assert_eq!(dir.seed(&SAMPLE_ACCOUNTS, now).await.unwrap(), 0);
    assert_eq!(dir.list(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_seed_skips_existing_email() {
    let dir = logic();
    dir.insert(user("mine", "test@example.com", Role::Tester, NOW))
        .await
        .unwrap();

    let inserted = dir.seed(&SAMPLE_ACCOUNTS, Timestamp::new(NOW)).await.unwrap();
    assert_eq!(inserted, 1);

    let kept = Directory::find_by_email(&dir, "test@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.username, "mine");
    assert!(kept.password_hash.is_none());
}

#[tokio::test]
async fn test_seed_skips_taken_username() {
    let dir = logic();
    dir.insert(user("admin", "real-admin@example.com", Role::Tester, NOW))
        .await
        .unwrap();

    let inserted = dir.seed(&SAMPLE_ACCOUNTS, Timestamp::new(NOW)).await.unwrap();
    assert_eq!(inserted, 1);
    assert!(Directory::find_by_email(&dir, "admin@testops.com")
        .await
        .unwrap()
        .is_none());
}

#[test]
fn test_seed_flag_defaults_on() {
    assert!(seed_flag(None));
    assert!(seed_flag(Some("true")));
    assert!(seed_flag(Some("")));
    assert!(!seed_flag(Some("false")));
    assert!(!seed_flag(Some(" FALSE ")));
    assert!(!seed_flag(Some("0")));
    assert!(!seed_flag(Some("off")));
}
