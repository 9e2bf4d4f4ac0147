//! 升变确认协作者
//!
//! 由外层 UI 实现的单次是/否询问。每个符合升变条件的着法恰好等待
//! 一次确认，且确认必然在着法提交之前完成。

use async_trait::async_trait;
use protocol::{Piece, Square};

/// 升变确认对话框
#[async_trait]
pub trait PromotionPrompt: Send + Sync {
    /// 询问是否升变
    ///
    /// 返回 `Some(true)` 升变、`Some(false)` 不升变；
    /// `None` 表示对话框被直接关闭，该着法整体作废。
    async fn confirm(&self, piece: Piece, to: Square) -> Option<bool>;
}
