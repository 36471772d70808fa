use super::*;
use crate::tokens::AllocatorLimits;

#[tokio::test]
async fn test_preview_is_sequential_per_counter() {
    let env = create_test_env().await;
    let m = &env.manager;

    assert_eq!(m.preview_token(Counter::One, None).await.unwrap(), "B1");
    assert_eq!(m.preview_token(Counter::One, None).await.unwrap(), "B2");
    assert_eq!(m.preview_token(Counter::Two, None).await.unwrap(), "G1");
    env.shutdown().await;
}

#[tokio::test]
async fn test_preview_hold_is_idempotent() {
    let env = create_test_env().await;
    let m = &env.manager;

    let first = m.preview_token(Counter::One, Some("till-a")).await.unwrap();
    let again = m.preview_token(Counter::One, Some("till-a")).await.unwrap();
    assert_eq!(first, again);

    // another session gets its own token
    let other = m.preview_token(Counter::One, Some("till-b")).await.unwrap();
    assert_ne!(first, other);

    // holds are per counter
    let g = m.preview_token(Counter::Two, Some("till-a")).await.unwrap();
    assert_eq!(g, "G1");
    assert_eq!(m.holds().len(), 3);
    env.shutdown().await;
}

#[tokio::test]
async fn test_stale_hold_is_replaced() {
    let env = create_test_env().await;
    let m = &env.manager;

    let held = m.preview_token(Counter::One, Some("till-a")).await.unwrap();
    m.reset_tokens(Some(Counter::One)).await.unwrap();
    assert!(m.holds().get("till-a", Counter::One).is_none());

    // reset dropped the hold; the sequence restarts
    let fresh = m.preview_token(Counter::One, Some("till-a")).await.unwrap();
    assert_eq!(fresh, "B1");
    assert_eq!(held, "B1");

    // hold whose token got committed elsewhere is discarded
    m.store()
        .mutate(|data, _| {
            data.tokens.commit("B1");
            Ok::<_, ManagerError>(())
        })
        .unwrap()
        .1
        .wait()
        .await
        .unwrap();
    let next = m.preview_token(Counter::One, Some("till-a")).await.unwrap();
    assert_eq!(next, "B2");
    env.shutdown().await;
}

#[tokio::test]
async fn test_preview_exhaustion() {
    let env = create_test_env().await;
    let m = &env.manager;
    let _ = m.store().mutate(|data, _| {
        data.tokens.set_limits(AllocatorLimits {
            sequential_bound: 2,
            ..AllocatorLimits::default()
        });
        data.tokens.commit("G1");
        data.tokens.commit("G2");
        Ok::<_, ManagerError>(())
    });

    let err = m.preview_token(Counter::Two, None).await.unwrap_err();
    assert!(matches!(err, ManagerError::TokenExhausted { counter: Some(Counter::Two) }));
    // the cursor keeps its advance, so the next preview skips the busy range
    assert_eq!(m.store().read(|d| d.tokens.cursor(Counter::Two)), 2);
    let next = m.preview_token(Counter::Two, None).await.unwrap();
    assert_eq!(next, "G3");
    env.shutdown().await;
}

#[tokio::test]
async fn test_reserve_specific_once() {
    let env = create_test_env().await;
    let m = &env.manager;

    m.reserve_specific("B42").await.unwrap();
    let err = m.reserve_specific("B42").await.unwrap_err();
    assert!(matches!(err, ManagerError::TokenConflict(t) if t == "B42"));

    m.reserve_specific("123456").await.unwrap();
    assert!(matches!(
        m.reserve_specific("B4x").await.unwrap_err(),
        ManagerError::InvalidToken(_)
    ));
    assert!(matches!(
        m.reserve_specific("12345").await.unwrap_err(),
        ManagerError::InvalidToken(_)
    ));
    env.shutdown().await;
}

#[tokio::test]
async fn test_reserve_random() {
    let env = create_test_env().await;
    let m = &env.manager;

    let token = m.reserve_random().await.unwrap();
    assert_eq!(token.len(), 6);
    assert!(m.store().read(|d| d.tokens.is_reserved(&token)));
    assert!(matches!(
        m.reserve_specific(&token).await.unwrap_err(),
        ManagerError::TokenConflict(_)
    ));
    env.shutdown().await;
}

#[tokio::test]
async fn test_reset_counter_keeps_other_counter() {
    let env = create_test_env().await;
    let m = &env.manager;

    let b1 = place_order(m, Counter::One).await;
    assert_eq!(b1.token, "B1");
    let g1 = place_order(m, Counter::Two).await;
    let g2_preview = m.preview_token(Counter::Two, Some("till-g")).await.unwrap();

    m.reset_tokens(Some(Counter::One)).await.unwrap();

    // B1 is handed out again even though an order already uses it
    assert_eq!(m.preview_token(Counter::One, None).await.unwrap(), "B1");
    // counter two untouched
    assert_eq!(g1.token, "G1");
    assert_eq!(m.preview_token(Counter::Two, Some("till-g")).await.unwrap(), g2_preview);
    assert_eq!(m.preview_token(Counter::Two, None).await.unwrap(), "G3");
    assert_eq!(m.order_count(), 2);
    env.shutdown().await;
}

#[tokio::test]
async fn test_reset_both_counters() {
    let env = create_test_env().await;
    let m = &env.manager;

    place_order(m, Counter::One).await;
    place_order(m, Counter::Two).await;
    m.reset_tokens(None).await.unwrap();

    assert_eq!(m.preview_token(Counter::One, None).await.unwrap(), "B1");
    assert_eq!(m.preview_token(Counter::Two, None).await.unwrap(), "G1");
    env.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_never_collide() {
    let env = create_test_env().await;

    let mut previews = Vec::new();
    for i in 0..32 {
        let m = env.manager.clone();
        let counter = if i % 2 == 0 { Counter::One } else { Counter::Two };
        previews.push(tokio::spawn(async move { m.preview_token(counter, None).await }));
    }
    let mut randoms = Vec::new();
    for _ in 0..8 {
        let m = env.manager.clone();
        randoms.push(tokio::spawn(async move { m.reserve_random().await }));
    }
    let mut specifics = Vec::new();
    for _ in 0..8 {
        let m = env.manager.clone();
        specifics.push(tokio::spawn(async move { m.reserve_specific("B500").await }));
    }

    let mut tokens = Vec::new();
    for handle in previews.into_iter().chain(randoms) {
        tokens.push(handle.await.unwrap().unwrap());
    }
    let mut winners = 0;
    for handle in specifics {
        match handle.await.unwrap() {
            Ok(()) => winners += 1,
            Err(err) => assert!(matches!(err, ManagerError::TokenConflict(_))),
        }
    }
    assert_eq!(winners, 1);

    let total = tokens.len();
    tokens.push("B500".to_string());
    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), total + 1);

    // 16 previews per counter, each number handed out exactly once
    env.manager.store().read(|d| {
        assert_eq!(d.tokens.cursor(Counter::One), 16);
        assert_eq!(d.tokens.cursor(Counter::Two), 16);
        assert_eq!(d.tokens.reserved_count(), 32 + 8 + 1);
    });
    env.shutdown().await;
}
