//! Service orchestration tests for user registration and login.

use std::io;
use std::sync::Arc;

use crate::adapters::InMemoryStore;
use crate::domain::{User, UserId};
use crate::ports::{StoreError, StoreResult, UserStore};
use crate::services::{ErrorKind, ServiceError, UserService};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, Utc};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

mockall::mock! {
    Store {}

    #[async_trait]
    impl UserStore for Store {
        async fn insert_user(&self, user: &User) -> StoreResult<()>;
        async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;
        async fn update_user(&self, user: &User) -> StoreResult<()>;
        async fn update_user_pair(&self, first: &User, second: &User) -> StoreResult<()>;
    }
}

/// Clock pinned to a fixed instant for deterministic streak tests.
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[fixture]
fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_persists_the_initial_state(store: Arc<InMemoryStore>) {
    let service = UserService::new(Arc::clone(&store), Arc::new(DefaultClock));

    let user = service
        .register("asha")
        .await
        .expect("registration should succeed");

    assert_eq!(user.username(), "asha");
    assert_eq!(user.xp(), 0);
    assert_eq!(user.level(), 1);
    assert_eq!(user.level_title(), "Initiate");
    assert_eq!(user.streak(), 0);
    assert!(user.buddies().is_empty());

    let stored = service.find(user.id()).await.expect("lookup should succeed");
    assert_eq!(stored, user);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_login_applies_the_streak_rule(store: Arc<InMemoryStore>) {
    let day_zero = DateTime::parse_from_rfc3339("2026-03-01T20:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc);
    let at = |offset: Duration| {
        UserService::new(Arc::clone(&store), Arc::new(FixedClock(day_zero + offset)))
    };

    let user = at(Duration::zero())
        .register("veda")
        .await
        .expect("registration should succeed");

    let same_day = at(Duration::hours(3))
        .record_login(user.id())
        .await
        .expect("login should succeed");
    assert_eq!(same_day.streak(), 0);

    let next_day = at(Duration::days(1))
        .record_login(user.id())
        .await
        .expect("login should succeed");
    assert_eq!(next_day.streak(), 1);

    let after_gap = at(Duration::days(5))
        .record_login(user.id())
        .await
        .expect("login should succeed");
    assert_eq!(after_gap.streak(), 1);
    assert_eq!(
        after_gap.last_active_date().date_naive(),
        (day_zero + Duration::days(5)).date_naive()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_for_missing_user_reports_not_found(store: Arc<InMemoryStore>) {
    let service = UserService::new(Arc::clone(&store), Arc::new(DefaultClock));

    let err = service
        .record_login(UserId::new())
        .await
        .expect_err("missing user must fail");
    assert!(matches!(err, ServiceError::UserNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persistence_failures_surface_as_internal_errors() {
    let mut mock = MockStore::new();
    mock.expect_insert_user()
        .times(1)
        .returning(|_| Err(StoreError::persistence(io::Error::other("disk full"))));
    let service = UserService::new(Arc::new(mock), Arc::new(DefaultClock));

    let err = service
        .register("asha")
        .await
        .expect_err("store failure must propagate");
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::Persistence(_))
    ));
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_does_not_write_when_the_lookup_fails() {
    let mut mock = MockStore::new();
    mock.expect_find_user()
        .times(1)
        .returning(|_| Err(StoreError::persistence(io::Error::other("connection reset"))));
    mock.expect_update_user().times(0);
    let service = UserService::new(Arc::new(mock), Arc::new(DefaultClock));

    let err = service
        .record_login(UserId::new())
        .await
        .expect_err("lookup failure must propagate");
    assert_eq!(err.kind(), ErrorKind::Internal);
}
