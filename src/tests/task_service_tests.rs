//! Service orchestration tests for task assignment and status changes.

use std::sync::Arc;

use crate::adapters::InMemoryStore;
use crate::domain::{TaskDetails, TaskStatus, User, UserId};
use crate::ports::{TaskStore, UserStore};
use crate::services::{ErrorKind, ServiceError, TaskChange, TaskService};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = TaskService<InMemoryStore, DefaultClock>;

#[fixture]
fn service() -> (Arc<InMemoryStore>, TestService) {
    let store = Arc::new(InMemoryStore::new());
    let service = TaskService::new(Arc::clone(&store), Arc::new(DefaultClock));
    (store, service)
}

/// Seeds two users already linked as buddies; returns (assigner, assignee).
async fn seed_buddies(store: &InMemoryStore) -> (UserId, UserId) {
    let clock = DefaultClock;
    let mut asha = User::new("asha", &clock);
    let mut veda = User::new("veda", &clock);
    asha.add_buddy(veda.id());
    veda.add_buddy(asha.id());
    store.insert_user(&asha).await.expect("insert assigner");
    store.insert_user(&veda).await.expect("insert assignee");
    (asha.id(), veda.id())
}

fn details() -> TaskDetails {
    TaskDetails::new("Read chapter 3", "https://example.org/ch3", "Rust")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_non_buddy_assignee(service: (Arc<InMemoryStore>, TestService)) {
    let (store, service) = service;
    let (assigner, _) = seed_buddies(&store).await;
    let clock = DefaultClock;
    let stranger = User::new("kiran", &clock);
    store.insert_user(&stranger).await.expect("insert stranger");

    let result = service.create_task(assigner, stranger.id(), details()).await;

    let err = result.expect_err("non-buddy assignment should fail");
    assert!(matches!(err, ServiceError::NotBuddies { .. }));
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_awards_assignment_xp(service: (Arc<InMemoryStore>, TestService)) {
    let (store, service) = service;
    let (assigner, assignee) = seed_buddies(&store).await;

    let task = service
        .create_task(assigner, assignee, details())
        .await
        .expect("creation should succeed");

    assert_eq!(task.status(), TaskStatus::NotCompleted);
    assert!(!task.xp_awarded());
    assert_eq!(task.completion_count(), 0);

    let creator = store
        .find_user(assigner)
        .await
        .expect("lookup")
        .expect("assigner exists");
    assert_eq!(creator.xp(), 5);
    assert_eq!(creator.stats().tasks_assigned, 1);
    assert_eq!(creator.stats().total_xp_earned, 5);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_assignee_may_update_status(service: (Arc<InMemoryStore>, TestService)) {
    let (store, service) = service;
    let (assigner, assignee) = seed_buddies(&store).await;
    let task = service
        .create_task(assigner, assignee, details())
        .await
        .expect("creation should succeed");

    let result = service
        .update_task_status(
            task.id(),
            assigner,
            TaskChange::new().with_status(TaskStatus::Completed),
        )
        .await;

    let err = result.expect_err("assigner must not update status");
    assert!(matches!(err, ServiceError::NotAssignee { .. }));
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let stored = store
        .find_task(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(stored.status(), TaskStatus::NotCompleted);
    assert!(!stored.xp_awarded());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_completion_awards_xp_exactly_once(service: (Arc<InMemoryStore>, TestService)) {
    let (store, service) = service;
    let (assigner, assignee) = seed_buddies(&store).await;
    let task = service
        .create_task(assigner, assignee, details())
        .await
        .expect("creation should succeed");

    let outcome = service
        .update_task_status(
            task.id(),
            assignee,
            TaskChange::new().with_status(TaskStatus::Completed),
        )
        .await
        .expect("completion should succeed");

    assert_eq!(outcome.xp_earned, 10);
    assert!(outcome.is_first_completion);
    assert!(outcome.task.xp_awarded());
    assert!(outcome.task.first_completed_at().is_some());
    assert_eq!(outcome.task.completion_count(), 1);

    let user = store
        .find_user(assignee)
        .await
        .expect("lookup")
        .expect("assignee exists");
    assert_eq!(user.xp(), 10);
    assert_eq!(user.level(), 1);
    assert_eq!(user.stats().tasks_completed, 1);
    assert_eq!(user.stats().total_tasks_completed_once, 1);

    // Repeating the identical call is not a transition: nothing moves.
    let repeat = service
        .update_task_status(
            task.id(),
            assignee,
            TaskChange::new().with_status(TaskStatus::Completed),
        )
        .await
        .expect("repeat call should succeed");

    assert_eq!(repeat.xp_earned, 0);
    assert!(!repeat.is_first_completion);
    assert_eq!(repeat.task.completion_count(), 1);

    let user = store
        .find_user(assignee)
        .await
        .expect("lookup")
        .expect("assignee exists");
    assert_eq!(user.xp(), 10);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recompletion_after_revision_counts_without_xp(
    service: (Arc<InMemoryStore>, TestService),
) {
    let (store, service) = service;
    let (assigner, assignee) = seed_buddies(&store).await;
    let task = service
        .create_task(assigner, assignee, details())
        .await
        .expect("creation should succeed");

    for status in [
        TaskStatus::Completed,
        TaskStatus::NeedRevision,
        TaskStatus::Completed,
    ] {
        service
            .update_task_status(task.id(), assignee, TaskChange::new().with_status(status))
            .await
            .expect("status change should succeed");
    }

    let stored = store
        .find_task(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(stored.completion_count(), 2);
    assert!(stored.xp_awarded());

    let user = store
        .find_user(assignee)
        .await
        .expect("lookup")
        .expect("assignee exists");
    assert_eq!(user.xp(), 10);
    assert_eq!(user.stats().tasks_completed, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notes_only_update_changes_nothing_else(service: (Arc<InMemoryStore>, TestService)) {
    let (store, service) = service;
    let (assigner, assignee) = seed_buddies(&store).await;
    let task = service
        .create_task(assigner, assignee, details())
        .await
        .expect("creation should succeed");

    let outcome = service
        .update_task_status(
            task.id(),
            assignee,
            TaskChange::new().with_notes("halfway through"),
        )
        .await
        .expect("notes update should succeed");

    assert_eq!(outcome.xp_earned, 0);
    assert!(!outcome.is_first_completion);
    assert_eq!(outcome.task.notes(), "halfway through");
    assert_eq!(outcome.task.status(), TaskStatus::NotCompleted);
    assert_eq!(outcome.task.completion_count(), 0);
    assert!(!outcome.task.xp_awarded());

    let user = store
        .find_user(assignee)
        .await
        .expect("lookup")
        .expect("assignee exists");
    assert_eq!(user.xp(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_task_reports_not_found(service: (Arc<InMemoryStore>, TestService)) {
    let (store, service) = service;
    let (_, assignee) = seed_buddies(&store).await;

    let result = service
        .update_task_status(
            crate::domain::TaskId::new(),
            assignee,
            TaskChange::new().with_status(TaskStatus::Completed),
        )
        .await;

    let err = result.expect_err("missing task should fail");
    assert!(matches!(err, ServiceError::TaskNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_requires_a_task_participant(service: (Arc<InMemoryStore>, TestService)) {
    let (store, service) = service;
    let (assigner, assignee) = seed_buddies(&store).await;
    let clock = DefaultClock;
    let outsider = User::new("kiran", &clock);
    store.insert_user(&outsider).await.expect("insert outsider");
    let task = service
        .create_task(assigner, assignee, details())
        .await
        .expect("creation should succeed");

    let err = service
        .delete_task(task.id(), outsider.id())
        .await
        .expect_err("outsider must not delete");
    assert!(matches!(err, ServiceError::NotTaskParticipant { .. }));
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    service
        .delete_task(task.id(), assigner)
        .await
        .expect("assigner may delete");
    let remaining = store.find_task(task.id()).await.expect("lookup");
    assert!(remaining.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_listings_are_split_by_role(service: (Arc<InMemoryStore>, TestService)) {
    let (store, service) = service;
    let (assigner, assignee) = seed_buddies(&store).await;
    service
        .create_task(assigner, assignee, details())
        .await
        .expect("creation should succeed");

    let for_assignee = service
        .tasks_for_assignee(assignee)
        .await
        .expect("listing should succeed");
    assert_eq!(for_assignee.len(), 1);
    assert!(
        service
            .tasks_for_assignee(assigner)
            .await
            .expect("listing should succeed")
            .is_empty()
    );

    let by_assigner = service
        .tasks_assigned_by(assigner)
        .await
        .expect("listing should succeed");
    assert_eq!(by_assigner.len(), 1);
}
