use serde::{Deserialize, Serialize};

use crate::models::Counter;

// ==================== Payloads ====================

/// 厨房阶段变更载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePayload {
    pub token: String,
    pub processing: bool,
    pub ready: bool,
}

/// 订单完成载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPayload {
    pub token: String,
}

/// 可售状态变更载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPayload {
    pub counter: Counter,
    pub unavailable_ids: Vec<String>,
}
