//! 局面存储
//!
//! 只保存最近一次成功解码的局面快照。不做任何校验——输入必须来自
//! SFEN 解码器，解码失败时调用方不得调用 [`PositionStore::replace`]，
//! 旧局面因此得以保留。

use protocol::{Board, Hands};

/// 局面存储：棋盘 + 双方持驹
#[derive(Debug, Clone, Default)]
pub struct PositionStore {
    board: Board,
    hands: Hands,
}

impl PositionStore {
    /// 创建空局面
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换局面（每次远端成功应答后调用）
    pub fn replace(&mut self, board: Board, hands: Hands) {
        self.board = board;
        self.hands = hands;
    }

    /// 当前棋盘
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 当前持驹
    pub fn hands(&self) -> &Hands {
        &self.hands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{PieceKind, Sfen, Side, INITIAL_SFEN};

    #[test]
    fn test_replace_overwrites_everything() {
        let mut store = PositionStore::new();
        assert!(store.board().is_empty());

        let board = Sfen::parse_board(INITIAL_SFEN).unwrap();
        let mut hands = Hands::default();
        hands.side_mut(Side::Sente).set(PieceKind::Pawn, 1);
        store.replace(board.clone(), hands);

        assert_eq!(store.board(), &board);
        assert_eq!(store.hands().side(Side::Sente).count(PieceKind::Pawn), 1);

        store.replace(Board::empty(), Hands::default());
        assert!(store.board().is_empty());
        assert!(store.hands().side(Side::Sente).is_empty());
    }
}
