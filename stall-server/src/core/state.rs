use std::sync::Arc;

use crate::core::{BackgroundTasks, Config, Result};
use crate::orders::OrdersManager;
use crate::realtime::{EventPublisher, RealtimeHub};
use crate::services::{AvailabilityService, CatalogService, MessageService};
use crate::storage::DataStore;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 显式构造后以 `State<ServerState>` 传给各个 handler，没有进程级单例。
/// 所有字段内部都是 Arc，clone 只是浅拷贝。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | DataStore | JSON 文档存储 (单写者) |
/// | hub | RealtimeHub | 柜台房间实时推送 |
/// | catalog | CatalogService | 菜单 (套餐展开) |
/// | orders | OrdersManager | 令牌与订单生命周期 |
/// | availability | AvailabilityService | 沽清状态 |
/// | messages | MessageService | 柜台留言 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: DataStore,
    pub hub: RealtimeHub,
    pub catalog: CatalogService,
    pub orders: OrdersManager,
    pub availability: AvailabilityService,
    pub messages: MessageService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 加载菜单与所有文档，并把每个文档的落盘 worker 注册到 `tasks`。
    pub async fn initialize(config: &Config, tasks: &mut BackgroundTasks) -> Result<Self> {
        let catalog = CatalogService::load(config.items_file()).await;
        let store = DataStore::open(config.data_dir(), config.flush_window(), tasks).await?;
        let hub = RealtimeHub::new();
        let publisher: Arc<dyn EventPublisher> = Arc::new(hub.clone());

        let orders = OrdersManager::new(store.clone(), catalog.clone(), publisher.clone());
        let availability = AvailabilityService::new(store.clone(), publisher.clone());
        let messages = MessageService::new(store.clone(), publisher);

        tracing::info!(
            work_dir = %config.work_dir,
            items = catalog.snapshot().len(),
            orders = orders.order_count(),
            "Server state initialized"
        );

        Ok(Self {
            config: config.clone(),
            store,
            hub,
            catalog,
            orders,
            availability,
            messages,
        })
    }
}
