//! 将棋客户端共享协议库
//!
//! 包含:
//! - 棋子、阵营、坐标等核心数据结构
//! - SFEN 局面解析
//! - USI 着法表示法
//! - 棋谱行格式化
//! - 与规则服务的 JSON 消息定义 (BoardResponse, MoveReply, ...)

mod board;
mod error;
mod message;
mod notation;
mod piece;
mod sfen;
mod square;
mod usi;

pub use board::{Board, Hand, Hands};
pub use error::{Result, ShogiError};
pub use message::{
    BoardResponse, ErrorReply, HandsDto, LegalMovesReply, MoveReply, MoveRequest, PollReply,
};
pub use notation::format_line;
pub use piece::{Piece, PieceKind, Side, UNKNOWN_LABEL};
pub use sfen::{Sfen, INITIAL_SFEN};
pub use square::{Square, BOARD_SIZE};
pub use usi::{MoveOrigin, UsiMove};
