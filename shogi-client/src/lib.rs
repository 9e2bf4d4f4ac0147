//! 将棋 Web 客户端核心逻辑
//!
//! 负责：
//! - 局面快照的解码与存储（SFEN → 棋盘 + 持驹）
//! - 回合与选择状态机（盘上选择、持驹选择、拖拽）
//! - 着法会话编排（提交、同步/轮询两种应手协议、错误恢复）
//! - 棋谱记录
//!
//! 渲染层（DOM/画面）与远端规则引擎是外部协作者，分别通过
//! [`SessionView`] / 手势入口与 [`network::Authority`] trait 对接。

pub mod controller;
pub mod game;
pub mod network;
pub mod prompt;

pub use controller::{ClientError, ControllerConfig, SessionController, SessionView};
pub use game::{
    ClickOutcome, DragOrigin, GameSession, InteractionState, KifuLog, MoveIntent, PositionStore,
};
pub use network::{Authority, AuthorityConfig, AuthorityError, HttpAuthority};
pub use prompt::PromotionPrompt;
