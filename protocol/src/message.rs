//! 接口消息定义
//!
//! 与远端规则服务之间的 JSON 契约。字段名与服务端保持一致，
//! 局面以 SFEN 字符串传递，持驹以「阵营 → 字母 → 数量」的映射传递。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::Hands;
use crate::error::ShogiError;
use crate::piece::{PieceKind, Side};
use crate::usi::{MoveOrigin, UsiMove};

/// 当前局面响应（GET /board）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    /// 局面的 SFEN 编码
    pub sfen: String,
    /// 双方持驹
    pub hands: HandsDto,
}

/// 走子请求（POST /move）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// 起点的 USI 坐标，打入时为 `P*` 形式的标记
    pub from: String,
    /// 目标格的 USI 坐标
    pub to: String,
    /// 是否升变（打入恒为 false）
    pub promote: bool,
}

impl From<&UsiMove> for MoveRequest {
    fn from(mv: &UsiMove) -> Self {
        match mv.origin {
            MoveOrigin::Board(from) => Self {
                from: from.to_usi(),
                to: mv.to.to_usi(),
                promote: mv.promote,
            },
            MoveOrigin::Drop(kind) => Self {
                from: format!("{}*", kind.sfen_letter()),
                to: mv.to.to_usi(),
                promote: false,
            },
        }
    }
}

/// 走子成功响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveReply {
    /// 走子后的局面 SFEN（同步协议下已包含对方的应手）
    pub board_sfen: String,
    /// 双方持驹
    pub hands: HandsDto,
    /// 对方的应手（USI），缺失表示需轮询等待
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_move: Option<String>,
    /// 对局是否结束
    #[serde(default)]
    pub game_over: bool,
    /// 胜方描述，仅 game_over 时有意义
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

/// 轮询响应（POST /poll）
///
/// 对方仍在思考时返回 `{"thinking": true}`，否则与走子成功响应同形。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PollReply {
    /// 对方仍在思考
    Thinking { thinking: bool },
    /// 对方已走子
    Ready(MoveReply),
}

/// 合法落点响应（GET /legal_moves）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalMovesReply {
    /// USI 着法列表
    pub legal_moves: Vec<String>,
}

/// 错误响应体（非 2xx 状态）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

/// 持驹的接口表示：阵营名 → 棋子字母 → 数量
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandsDto {
    #[serde(default)]
    pub black: BTreeMap<String, u8>,
    #[serde(default)]
    pub white: BTreeMap<String, u8>,
}

impl HandsDto {
    /// 转换为结构化持驹，未知字母视为局面数据损坏
    pub fn to_hands(&self) -> Result<Hands, ShogiError> {
        let mut hands = Hands::default();
        for (side, entries) in [(Side::Sente, &self.black), (Side::Gote, &self.white)] {
            for (letter, &count) in entries {
                let kind = PieceKind::from_hand_letter(letter)?;
                hands.side_mut(side).set(kind, count);
            }
        }
        Ok(hands)
    }
}
