//! 棋盘与持驹

use serde::{Deserialize, Serialize};

use crate::piece::{Piece, PieceKind, Side};
use crate::square::{Square, BOARD_SIZE};

/// 棋盘，9x9，每格至多一枚棋子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 下标为 y * 9 + x，使用 Vec 以支持 serde
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; (BOARD_SIZE as usize) * (BOARD_SIZE as usize)],
        }
    }

    /// 获取指定格的棋子
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares.get(sq.to_index()).copied().flatten()
    }

    /// 设置指定格的棋子
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if let Some(slot) = self.squares.get_mut(sq.to_index()) {
            *slot = piece;
        }
    }

    /// 棋盘是否为空
    pub fn is_empty(&self) -> bool {
        self.squares.iter().all(Option::is_none)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

/// 单方持驹：7 种可打入棋子各自的数量
///
/// 计数用无符号整数表示，恒为非负。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    counts: [u8; 7],
}

impl Hand {
    /// 获取指定种类的持驹数（王恒为 0）
    pub fn count(&self, kind: PieceKind) -> u8 {
        kind.hand_index().map_or(0, |i| self.counts[i])
    }

    /// 设置指定种类的持驹数（王被忽略）
    pub fn set(&mut self, kind: PieceKind, count: u8) {
        if let Some(i) = kind.hand_index() {
            self.counts[i] = count;
        }
    }

    /// 遍历数量非零的持驹
    pub fn entries(&self) -> impl Iterator<Item = (PieceKind, u8)> + '_ {
        PieceKind::DROPPABLE
            .iter()
            .zip(self.counts.iter())
            .filter(|(_, &count)| count > 0)
            .map(|(&kind, &count)| (kind, count))
    }

    /// 是否没有任何持驹
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

/// 双方持驹
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hands {
    pub sente: Hand,
    pub gote: Hand,
}

impl Hands {
    /// 获取指定阵营的持驹
    pub fn side(&self, side: Side) -> &Hand {
        match side {
            Side::Sente => &self.sente,
            Side::Gote => &self.gote,
        }
    }

    /// 获取指定阵营的持驹（可变）
    pub fn side_mut(&mut self, side: Side) -> &mut Hand {
        match side {
            Side::Sente => &mut self.sente,
            Side::Gote => &mut self.gote,
        }
    }
}
