use super::*;
use crate::core::tasks::BackgroundTasks;
use crate::realtime::RealtimeHub;
use shared::models::{CatalogItem, ComboComponent};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;

/// Short window keeps the flush-awaiting operations fast
const TEST_FLUSH_WINDOW: Duration = Duration::from_millis(5);

/// Manager plus everything it needs to stay alive during a test
struct TestEnv {
    manager: OrdersManager,
    hub: RealtimeHub,
    tasks: BackgroundTasks,
    dir: TempDir,
}

impl TestEnv {
    /// Stop flush workers (writes pending snapshots)
    async fn shutdown(self) -> TempDir {
        self.tasks.shutdown(Duration::from_secs(2)).await;
        self.dir
    }
}

fn test_catalog() -> CatalogService {
    let mut meal = CatalogItem::simple("meal", "Burger Meal", 85.0);
    meal.combo = true;
    meal.components = vec![
        ComboComponent { id: "burger".into(), qty: 1 },
        ComboComponent { id: "fries".into(), qty: 1 },
        ComboComponent { id: "coke".into(), qty: 1 },
    ];
    let mut triple = CatalogItem::simple("triple-fries", "Triple Fries", 100.0);
    triple.combo = true;
    triple.components = vec![ComboComponent { id: "fries".into(), qty: 3 }];

    let mut items = crate::services::catalog::default_menu();
    items.push(meal);
    items.push(triple);
    CatalogService::from_items(items)
}

async fn open_env(dir: TempDir) -> TestEnv {
    let mut tasks = BackgroundTasks::new();
    let store = DataStore::open(dir.path(), TEST_FLUSH_WINDOW, &mut tasks)
        .await
        .unwrap();
    let hub = RealtimeHub::new();
    let manager = OrdersManager::new(store, test_catalog(), Arc::new(hub.clone()));
    TestEnv {
        manager,
        hub,
        tasks,
        dir,
    }
}

async fn create_test_env() -> TestEnv {
    open_env(tempfile::tempdir().unwrap()).await
}

fn cart(id: &str, price: f64, qty: i64) -> CartItemInput {
    CartItemInput {
        id: id.to_string(),
        name: id.to_string(),
        price,
        qty,
    }
}

fn checkout_req(counter: Counter, items: Vec<CartItemInput>) -> CheckoutRequest {
    CheckoutRequest {
        counter: Some(counter),
        items,
        ..CheckoutRequest::default()
    }
}

/// Place a one-line fries order on a counter
async fn place_order(manager: &OrdersManager, counter: Counter) -> Order {
    manager
        .checkout(checkout_req(counter, vec![cart("fries", 40.0, 1)]))
        .await
        .unwrap()
}

/// Drain every event currently queued on a receiver
fn drain(rx: &mut broadcast::Receiver<Arc<RealtimeEvent>>) -> Vec<RealtimeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push((*event).clone());
    }
    events
}

mod test_checkout;
mod test_tokens;
