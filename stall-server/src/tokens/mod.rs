//! 取餐号 (token) 分配
//!
//! 两种格式：
//!
//! - 顺序号 `B<n>` / `G<n>`，前缀由柜台决定
//! - 旧版六位随机数 `100000..=999999`
//!
//! 一个 token 只可能处于 free / reserved / used 三种状态之一。

mod allocator;
mod hold;

pub use allocator::{AllocatorLimits, ReservedEntry, TokenAllocator, TokenStateDocument};
pub use hold::HoldRegistry;

/// Lowest legacy random token
pub const RANDOM_TOKEN_MIN: u32 = 100_000;
/// Highest legacy random token
pub const RANDOM_TOKEN_MAX: u32 = 999_999;

/// 校验 token 格式: `^[BG]\d+$` 或 `^\d{6}$`
pub fn is_valid_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some('B') | Some('G') => {
            let rest = chars.as_str();
            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
        }
        Some(_) => token.len() == 6 && token.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
