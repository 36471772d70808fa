use super::*;

#[tokio::test]
async fn test_checkout_sequential_token_and_event() {
    let env = create_test_env().await;
    let m = &env.manager;
    let mut room1 = env.hub.subscribe(Counter::One);
    let mut room2 = env.hub.subscribe(Counter::Two);

    let order = m
        .checkout(checkout_req(
            Counter::One,
            vec![cart("burger", 50.0, 2), cart("coke", 20.0, 1)],
        ))
        .await
        .unwrap();

    assert_eq!(order.token, "B1");
    assert_eq!(order.server, Counter::One);
    assert_eq!(order.total, 120.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(m.store().read(|d| d.tokens.is_used("B1") && !d.tokens.is_reserved("B1")));

    assert_eq!(drain(&mut room1), vec![RealtimeEvent::new_order(&order)]);
    assert!(drain(&mut room2).is_empty());
    env.shutdown().await;
}

#[tokio::test]
async fn test_checkout_consumes_hold() {
    let env = create_test_env().await;
    let m = &env.manager;

    let previewed = m.preview_token(Counter::Two, Some("till-g")).await.unwrap();
    let order = m
        .checkout(CheckoutRequest {
            counter: Some(Counter::Two),
            items: vec![cart("pizza", 70.0, 1)],
            token: None,
            session: Some("till-g".into()),
        })
        .await
        .unwrap();

    assert_eq!(order.token, previewed);
    assert!(m.holds().get("till-g", Counter::Two).is_none());
    // next preview moves on
    let next = m.preview_token(Counter::Two, Some("till-g")).await.unwrap();
    assert_ne!(next, previewed);
    env.shutdown().await;
}

#[tokio::test]
async fn test_checkout_with_explicit_held_token() {
    let env = create_test_env().await;
    let m = &env.manager;

    let previewed = m.preview_token(Counter::One, Some("till-a")).await.unwrap();
    let order = m
        .checkout(CheckoutRequest {
            counter: Some(Counter::One),
            items: vec![cart("pasta", 80.0, 1)],
            token: Some(previewed.clone()),
            session: Some("till-a".into()),
        })
        .await
        .unwrap();
    assert_eq!(order.token, previewed);
    env.shutdown().await;
}

#[tokio::test]
async fn test_checkout_never_previewed_token() {
    let env = create_test_env().await;
    let m = &env.manager;

    let order = m
        .checkout(CheckoutRequest {
            counter: Some(Counter::One),
            items: vec![cart("fries", 40.0, 1)],
            token: Some("B77".into()),
            session: None,
        })
        .await
        .unwrap();
    assert_eq!(order.token, "B77");

    let err = m.reserve_specific("B77").await.unwrap_err();
    assert!(matches!(err, ManagerError::TokenConflict(_)));
    env.shutdown().await;
}

#[tokio::test]
async fn test_checkout_with_sessionless_preview() {
    let env = create_test_env().await;
    let m = &env.manager;

    let previewed = m.preview_token(Counter::One, None).await.unwrap();
    assert_eq!(previewed, "B1");
    let order = m
        .checkout(CheckoutRequest {
            counter: Some(Counter::One),
            items: vec![cart("fries", 40.0, 1)],
            token: Some(previewed.clone()),
            session: None,
        })
        .await
        .unwrap();
    assert_eq!(order.token, "B1");
    m.store().read(|d| {
        assert!(d.tokens.is_used("B1"));
        assert!(!d.tokens.is_reserved("B1"));
    });

    // a token another session is holding still conflicts
    let held = m.preview_token(Counter::One, Some("till-b")).await.unwrap();
    let err = m
        .checkout(CheckoutRequest {
            counter: Some(Counter::One),
            items: vec![cart("fries", 40.0, 1)],
            token: Some(held.clone()),
            session: Some("till-a".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::TokenConflict(t) if t == held));
    assert_eq!(m.holds().get("till-b", Counter::One), Some(held));
    assert_eq!(m.order_count(), 1);
    env.shutdown().await;
}

#[tokio::test]
async fn test_checkout_conflict_drops_hold() {
    let env = create_test_env().await;
    let m = &env.manager;
    let mut room = env.hub.subscribe(Counter::One);

    let held = m.preview_token(Counter::One, Some("till-a")).await.unwrap();
    // another checkout consumes the held token first
    let (_, ticket) = m
        .store()
        .mutate(|data, changes| {
            data.tokens.commit(&held);
            changes.mark_tokens();
            Ok::<_, ManagerError>(())
        })
        .unwrap();
    ticket.wait().await.unwrap();

    let err = m
        .checkout(CheckoutRequest {
            counter: Some(Counter::One),
            items: vec![cart("coke", 20.0, 1)],
            token: None,
            session: Some("till-a".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::TokenConflict(t) if t == held));
    assert!(m.holds().get("till-a", Counter::One).is_none());
    assert_eq!(m.order_count(), 0);
    assert!(drain(&mut room).is_empty());

    // re-preview gets a fresh token
    let fresh = m.preview_token(Counter::One, Some("till-a")).await.unwrap();
    assert_ne!(fresh, held);
    env.shutdown().await;
}

#[tokio::test]
async fn test_checkout_expands_combos() {
    let env = create_test_env().await;
    let m = &env.manager;

    let order = m
        .checkout(checkout_req(
            Counter::Two,
            vec![cart("triple-fries", 100.0, 2), cart("fries", 40.0, 1), cart("meal", 85.0, 1)],
        ))
        .await
        .unwrap();

    let lines: Vec<(&str, i64)> = order.items.iter().map(|i| (i.id.as_str(), i.qty)).collect();
    assert_eq!(lines, vec![("fries", 8), ("burger", 1), ("coke", 1)]);
    // total is computed from the expanded base items
    assert_eq!(order.total, 8.0 * 40.0 + 50.0 + 20.0);
    env.shutdown().await;
}

#[tokio::test]
async fn test_invalid_orders_are_rejected_before_any_mutation() {
    let env = create_test_env().await;
    let m = &env.manager;
    let mut room = env.hub.subscribe(Counter::One);

    let err = m.checkout(checkout_req(Counter::One, vec![])).await.unwrap_err();
    assert!(matches!(err, ManagerError::InvalidOrder(_)));

    let err = m
        .checkout(checkout_req(Counter::One, vec![cart("fries", 40.0, 0), cart("coke", 20.0, -2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidOrder(_)));

    let err = m
        .checkout(CheckoutRequest {
            counter: Some(Counter::One),
            items: vec![cart("fries", 40.0, 1)],
            token: Some("B-1".into()),
            session: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidToken(_)));

    // combo multiplier overflows i64
    let err = m
        .checkout(checkout_req(Counter::One, vec![cart("triple-fries", 100.0, i64::MAX / 2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidOrder(_)));

    m.store().read(|d| {
        assert!(d.orders.is_empty());
        assert_eq!(d.tokens.cursor(Counter::One), 0);
        assert_eq!(d.tokens.reserved_count(), 0);
    });
    assert!(drain(&mut room).is_empty());
    env.shutdown().await;
}

#[tokio::test]
async fn test_checkout_defaults_to_counter_one() {
    let env = create_test_env().await;
    let order = env
        .manager
        .checkout(CheckoutRequest {
            items: vec![cart("coke", 20.0, 1)],
            ..CheckoutRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(order.server, Counter::One);
    assert!(order.token.starts_with('B'));
    env.shutdown().await;
}
