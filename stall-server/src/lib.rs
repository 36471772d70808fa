//! Stall Server - 双柜台小吃摊点单与厨房协调服务
//!
//! # 架构概述
//!
//! - **令牌** (`tokens`): 顺序令牌 (B/G 前缀) 与六位随机令牌的分配、预留、提交
//! - **订单** (`orders`): 下单、套餐展开、厨房阶段、完成、统计
//! - **存储** (`storage`): 内存工作集 + 防抖 JSON 文档落盘
//! - **实时推送** (`realtime`): 按柜台分房间的 WebSocket 推送
//! - **HTTP API** (`api`): axum 路由和处理器
//!
//! # 模块结构
//!
//! ```text
//! stall-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── tokens/        # 令牌分配器、预览保留
//! ├── orders/        # 订单管理器、套餐展开、统计
//! ├── storage/       # JSON 文档、原子写入、防抖落盘
//! ├── realtime/      # 柜台房间、WebSocket
//! ├── services/      # 菜单、沽清、留言
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod core;
pub mod orders;
pub mod realtime;
pub mod services;
pub mod storage;
pub mod tokens;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use orders::OrdersManager;
pub use realtime::RealtimeHub;
pub use storage::DataStore;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 `.env` 并初始化日志
///
/// 日志级别与目录来自 `LOG_LEVEL` / `LOG_DIR`，生产环境输出 JSON。
pub fn setup_environment() -> Config {
    // .env 是可选的
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.is_production()),
        config.log_dir.as_deref(),
    );
    config
}

pub fn print_banner() {
    println!(
        r#"
   _____ __        ____
  / ___// /_____ _/ / /
  \__ \/ __/ __ `/ / /
 ___/ / /_/ /_/ / / /
/____/\__/\__,_/_/_/
    "#
    );
}
