//! USI 着法表示法
//!
//! 三种形态：
//! - `7g7f`  普通移动
//! - `7g7f+` 移动并升变
//! - `P*5e`  打入持驹（打入不带升变标记）

use serde::{Deserialize, Serialize};

use crate::error::ShogiError;
use crate::piece::PieceKind;
use crate::square::Square;

/// 着法起点：盘上棋子或持驹打入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOrigin {
    /// 从盘上某格移动
    Board(Square),
    /// 打入指定种类的持驹
    Drop(PieceKind),
}

/// USI 着法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsiMove {
    pub origin: MoveOrigin,
    pub to: Square,
    /// 仅对盘上移动有意义，打入恒为 false
    pub promote: bool,
}

impl UsiMove {
    /// 构造盘上移动
    pub fn board_move(from: Square, to: Square, promote: bool) -> Self {
        Self {
            origin: MoveOrigin::Board(from),
            to,
            promote,
        }
    }

    /// 构造打入
    pub fn drop(kind: PieceKind, to: Square) -> Self {
        Self {
            origin: MoveOrigin::Drop(kind),
            to,
            promote: false,
        }
    }

    /// 从 USI 字符串解析
    pub fn parse(notation: &str) -> Result<Self, ShogiError> {
        let invalid = || ShogiError::InvalidMove {
            notation: notation.to_string(),
        };
        let chars: Vec<char> = notation.chars().collect();

        // 打入：K*5e
        if chars.len() == 4 && chars[1] == '*' {
            let kind = PieceKind::from_sfen_letter(chars[0]).ok_or_else(invalid)?;
            if kind == PieceKind::King {
                return Err(invalid());
            }
            let to = Square::from_usi(&notation[2..]).map_err(|_| invalid())?;
            return Ok(Self::drop(kind, to));
        }

        // 普通移动：7g7f 或 7g7f+
        let promote = match chars.len() {
            4 => false,
            5 if chars[4] == '+' => true,
            _ => return Err(invalid()),
        };
        let from = Square::from_usi(&notation[0..2]).map_err(|_| invalid())?;
        let to = Square::from_usi(&notation[2..4]).map_err(|_| invalid())?;
        Ok(Self::board_move(from, to, promote))
    }
}

impl std::fmt::Display for UsiMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.origin {
            MoveOrigin::Board(from) => {
                write!(f, "{}{}", from.to_usi(), self.to.to_usi())?;
                if self.promote {
                    write!(f, "+")?;
                }
                Ok(())
            }
            MoveOrigin::Drop(kind) => {
                write!(f, "{}*{}", kind.sfen_letter(), self.to.to_usi())
            }
        }
    }
}

impl std::str::FromStr for UsiMove {
    type Err = ShogiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
