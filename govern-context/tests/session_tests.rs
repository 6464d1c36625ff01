//! Session lifecycle integration.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{GatedStore, World};
use govern_auth::{MemorySessionProvider, SessionEvent, SessionProvider};
use govern_context::{ActiveOrgContext, ContextSnapshot, ContextStatus};
use govern_org::MembershipRole;

async fn wait_for<F>(context: &ActiveOrgContext<Arc<GatedStore>>, predicate: F) -> Arc<ContextSnapshot>
where
    F: Fn(&ContextSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = context.current_state();
            if predicate(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("context did not reach the expected state")
}

#[tokio::test]
async fn test_session_events_drive_the_context() {
    let world = World::new();
    world.grant(&world.alice, world.group, MembershipRole::Admin);
    world.grant(&world.bob, world.unrelated, MembershipRole::Manager);
    let context = world.context();

    let snapshot = context
        .handle_session_event(SessionEvent::Established(world.alice.clone()))
        .await
        .unwrap();
    assert_eq!(snapshot.active_org_id(), Some(world.group));

    context.select(world.subsidiary).await.unwrap();
    let snapshot = context
        .handle_session_event(SessionEvent::Refreshed(world.alice.clone()))
        .await
        .unwrap();
    assert_eq!(snapshot.active_org_id(), Some(world.subsidiary));

    let snapshot = context
        .handle_session_event(SessionEvent::Refreshed(world.bob.clone()))
        .await
        .unwrap();
    assert_eq!(snapshot.principal.as_ref(), Some(&world.bob));
    assert_eq!(snapshot.active_org_id(), Some(world.unrelated));

    let snapshot = context
        .handle_session_event(SessionEvent::Revoked)
        .await
        .unwrap();
    assert_eq!(snapshot.status, ContextStatus::ReauthenticationRequired);
    assert!(snapshot.principal.is_none());
    assert!(snapshot.memberships.is_empty());
    assert!(snapshot.hierarchy.is_empty());
}

#[tokio::test]
async fn test_runner_follows_provider() {
    let world = World::new();
    world.grant(&world.alice, world.group, MembershipRole::Admin);
    let context = Arc::new(world.context());
    let provider = MemorySessionProvider::new();

    let events = provider.subscribe();
    let runner = context.clone();
    let handle = tokio::spawn(async move { runner.run_session_events(events).await });

    provider.establish(world.alice.clone());
    let ready = wait_for(&context, |s| s.is_ready()).await;
    assert_eq!(ready.active_org_id(), Some(world.group));

    provider.expire();
    let ended = wait_for(&context, |s| s.status == ContextStatus::ReauthenticationRequired).await;
    assert!(ended.organization.is_none());

    drop(provider);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("runner did not stop after the provider went away")
        .unwrap();
}

#[tokio::test]
async fn test_expiry_preempts_in_flight_initialization() {
    let world = World::new();
    world.grant(&world.alice, world.group, MembershipRole::Admin);
    let context = Arc::new(world.context());
    let provider = MemorySessionProvider::new();

    let events = provider.subscribe();
    let runner = context.clone();
    tokio::spawn(async move { runner.run_session_events(events).await });

    let release = world.store.hold_next();
    provider.establish(world.alice.clone());
    world.store.entered.notified().await;
    assert!(context.current_state().is_loading);

    provider.expire();
    wait_for(&context, |s| s.status == ContextStatus::ReauthenticationRequired).await;

    // The abandoned request may already be gone; either way its result
    // must not surface.
    let _ = release.send(());
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = context.current_state();
    assert_eq!(state.status, ContextStatus::ReauthenticationRequired);
    assert!(state.organization.is_none());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_provider_principal_feeds_initialize() {
    let world = World::new();
    world.grant(&world.alice, world.unit, MembershipRole::Manager);
    let context = world.context();
    let provider = MemorySessionProvider::new();

    assert!(context.initialize(provider.principal()).await.is_err());

    provider.establish(world.alice.clone());
    let snapshot = context
        .initialize(provider.require_principal().ok())
        .await
        .unwrap();
    assert_eq!(snapshot.active_org_id(), Some(world.unit));
    assert_eq!(
        snapshot.organization.as_ref().map(|org| org.name.as_str()),
        Some("Business Unit")
    );
}
