//! 客户端游戏状态

mod kifu;
mod position;
mod session;

pub use kifu::KifuLog;
pub use position::PositionStore;
pub use session::{ClickOutcome, DragOrigin, GameSession, InteractionState, MoveIntent};
