//! 服务层 - 订单之外的柜台服务
//!
//! # 服务列表
//!
//! - [`CatalogService`] - 菜单加载与查询 (只读, 内存缓存)
//! - [`AvailabilityService`] - 柜台售罄状态
//! - [`MessageService`] - 柜台留言板

pub mod availability;
pub mod catalog;
pub mod messages;

pub use availability::{AvailabilityBoard, AvailabilityService};
pub use catalog::{Catalog, CatalogService};
pub use messages::MessageService;
