use std::path::PathBuf;
use std::time::Duration;

/// 服务器配置 - 摊位协调服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (JSON 文档) |
/// | ITEMS_PATH | WORK_DIR/items.json | 菜单文件 |
/// | HTTP_PORT | 3000 | HTTP / WebSocket 端口 |
/// | FLUSH_DEBOUNCE_MS | 200 | 落盘防抖窗口(毫秒) |
/// | ADMIN_PASSWORD | pass | 重置接口密码 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志文件目录 (不设置则只输出到终端) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/stall HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储订单、令牌等 JSON 文档
    pub work_dir: String,
    /// 菜单文件路径
    pub items_path: Option<String>,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 落盘防抖窗口 (毫秒)
    pub flush_debounce_ms: u64,
    /// 管理员密码 (重置令牌/订单)
    pub admin_password: String,
    /// 运行环境: development | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 日志文件目录
    pub log_dir: Option<String>,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            items_path: std::env::var("ITEMS_PATH").ok(),
            http_port: env_parse("HTTP_PORT", 3000),
            flush_debounce_ms: env_parse("FLUSH_DEBOUNCE_MS", 200),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "pass".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS", 10000),
        }
    }

    /// 使用自定义工作目录
    ///
    /// 常用于测试场景 (配合 tempfile::TempDir)
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.items_path = None;
        config
    }

    /// 工作目录
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
    }

    /// 菜单文件，默认位于工作目录下
    pub fn items_file(&self) -> PathBuf {
        match &self.items_path {
            Some(path) => PathBuf::from(path),
            None => self.data_dir().join("items.json"),
        }
    }

    pub fn flush_window(&self) -> Duration {
        Duration::from_millis(self.flush_debounce_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
