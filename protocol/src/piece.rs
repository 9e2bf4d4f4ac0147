//! 棋子定义

use serde::{Deserialize, Serialize};

use crate::error::ShogiError;

/// 未知棋子代码的占位标签（标签函数不允许中断渲染）
pub const UNKNOWN_LABEL: &str = "？";

/// 棋子种类（8 种基础棋子）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    /// 歩兵
    Pawn,
    /// 香车
    Lance,
    /// 桂马
    Knight,
    /// 银将
    Silver,
    /// 金将
    Gold,
    /// 角行
    Bishop,
    /// 飞车
    Rook,
    /// 王将
    King,
}

impl PieceKind {
    /// 可打入的 7 种棋子（王不可入手）
    pub const DROPPABLE: [PieceKind; 7] = [
        PieceKind::Pawn,
        PieceKind::Lance,
        PieceKind::Knight,
        PieceKind::Silver,
        PieceKind::Gold,
        PieceKind::Bishop,
        PieceKind::Rook,
    ];

    /// 是否可升变（金、王没有升变形态）
    pub fn is_promotable(&self) -> bool {
        !matches!(self, PieceKind::Gold | PieceKind::King)
    }

    /// 获取 SFEN 字母（大写形式）
    pub fn sfen_letter(&self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Lance => 'L',
            PieceKind::Knight => 'N',
            PieceKind::Silver => 'S',
            PieceKind::Gold => 'G',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::King => 'K',
        }
    }

    /// 从 SFEN 字母解析（不区分大小写）
    pub fn from_sfen_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'L' => Some(PieceKind::Lance),
            'N' => Some(PieceKind::Knight),
            'S' => Some(PieceKind::Silver),
            'G' => Some(PieceKind::Gold),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// 从持驹字母解析（王不可作为持驹）
    pub fn from_hand_letter(letter: &str) -> Result<PieceKind, ShogiError> {
        let mut chars = letter.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(ShogiError::InvalidHandPiece {
                letter: letter.to_string(),
            });
        };
        match Self::from_sfen_letter(c) {
            Some(PieceKind::King) | None => Err(ShogiError::InvalidHandPiece {
                letter: letter.to_string(),
            }),
            Some(kind) => Ok(kind),
        }
    }

    /// 持驹数组下标（仅对可打入棋子有效）
    pub(crate) fn hand_index(&self) -> Option<usize> {
        Self::DROPPABLE.iter().position(|k| k == self)
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 先手（SFEN 大写，接口中为 "black"）
    Sente,
    /// 后手（SFEN 小写，接口中为 "white"）
    Gote,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::Sente => Side::Gote,
            Side::Gote => Side::Sente,
        }
    }

    /// 棋谱中的阵营符号
    pub fn marker(&self) -> char {
        match self {
            Side::Sente => '▲',
            Side::Gote => '△',
        }
    }

    /// 接口中使用的阵营名
    pub fn wire_name(&self) -> &'static str {
        match self {
            Side::Sente => "black",
            Side::Gote => "white",
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    pub promoted: bool,
}

impl Piece {
    /// 创建未升变棋子
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self {
            kind,
            side,
            promoted: false,
        }
    }

    /// 创建升变棋子（仅对可升变种类有效）
    pub fn promoted(kind: PieceKind, side: Side) -> Option<Self> {
        kind.is_promotable().then_some(Self {
            kind,
            side,
            promoted: true,
        })
    }

    /// 从 SFEN 字符解析（大小写区分阵营，promoted 由前缀 `+` 决定）
    pub fn from_sfen(c: char, promoted: bool) -> Option<Piece> {
        let kind = PieceKind::from_sfen_letter(c)?;
        let side = if c.is_ascii_uppercase() {
            Side::Sente
        } else {
            Side::Gote
        };
        if promoted {
            Piece::promoted(kind, side)
        } else {
            Some(Piece::new(kind, side))
        }
    }

    /// 获取 SFEN 代码（升变棋子带 `+` 前缀）
    pub fn sfen_code(&self) -> String {
        let letter = match self.side {
            Side::Sente => self.kind.sfen_letter(),
            Side::Gote => self.kind.sfen_letter().to_ascii_lowercase(),
        };
        if self.promoted {
            format!("+{}", letter)
        } else {
            letter.to_string()
        }
    }

    /// 该棋子是否还能升变
    pub fn can_promote(&self) -> bool {
        !self.promoted && self.kind.is_promotable()
    }

    /// 获取棋子的日文标签
    ///
    /// 对 14 种升变形态/基础形态加两种王的写法（先手「王」、后手「玉」）
    /// 的全覆盖映射，由穷举匹配在编译期保证完整。
    pub fn label(&self) -> &'static str {
        match (self.kind, self.promoted) {
            (PieceKind::Pawn, false) => "歩",
            (PieceKind::Pawn, true) => "と",
            (PieceKind::Lance, false) => "香",
            (PieceKind::Lance, true) => "成香",
            (PieceKind::Knight, false) => "桂",
            (PieceKind::Knight, true) => "成桂",
            (PieceKind::Silver, false) => "銀",
            (PieceKind::Silver, true) => "成銀",
            (PieceKind::Gold, _) => "金",
            (PieceKind::Bishop, false) => "角",
            (PieceKind::Bishop, true) => "馬",
            (PieceKind::Rook, false) => "飛",
            (PieceKind::Rook, true) => "竜",
            (PieceKind::King, _) => match self.side {
                Side::Sente => "王",
                Side::Gote => "玉",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotable_set() {
        // 后期修订的完整升变集合：歩香桂银角飞
        assert!(PieceKind::Pawn.is_promotable());
        assert!(PieceKind::Lance.is_promotable());
        assert!(PieceKind::Knight.is_promotable());
        assert!(PieceKind::Silver.is_promotable());
        assert!(PieceKind::Bishop.is_promotable());
        assert!(PieceKind::Rook.is_promotable());
        assert!(!PieceKind::Gold.is_promotable());
        assert!(!PieceKind::King.is_promotable());
    }

    #[test]
    fn test_from_sfen() {
        assert_eq!(
            Piece::from_sfen('P', false),
            Some(Piece::new(PieceKind::Pawn, Side::Sente))
        );
        assert_eq!(
            Piece::from_sfen('p', false),
            Some(Piece::new(PieceKind::Pawn, Side::Gote))
        );
        assert_eq!(
            Piece::from_sfen('r', true),
            Piece::promoted(PieceKind::Rook, Side::Gote)
        );
        // 金、王没有升变形态
        assert_eq!(Piece::from_sfen('G', true), None);
        assert_eq!(Piece::from_sfen('k', true), None);
        // 未知字母
        assert_eq!(Piece::from_sfen('x', false), None);
    }

    #[test]
    fn test_sfen_code_roundtrip() {
        let piece = Piece::promoted(PieceKind::Bishop, Side::Gote).unwrap();
        assert_eq!(piece.sfen_code(), "+b");

        let piece = Piece::new(PieceKind::King, Side::Sente);
        assert_eq!(piece.sfen_code(), "K");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Piece::new(PieceKind::Pawn, Side::Sente).label(), "歩");
        assert_eq!(
            Piece::promoted(PieceKind::Pawn, Side::Gote).unwrap().label(),
            "と"
        );
        assert_eq!(
            Piece::promoted(PieceKind::Lance, Side::Sente)
                .unwrap()
                .label(),
            "成香"
        );
        assert_eq!(
            Piece::promoted(PieceKind::Rook, Side::Sente).unwrap().label(),
            "竜"
        );
        // 两种王的写法
        assert_eq!(Piece::new(PieceKind::King, Side::Sente).label(), "王");
        assert_eq!(Piece::new(PieceKind::King, Side::Gote).label(), "玉");
    }

    #[test]
    fn test_label_is_pure() {
        let piece = Piece::new(PieceKind::Silver, Side::Gote);
        assert_eq!(piece.label(), piece.label());
    }

    #[test]
    fn test_hand_letter() {
        assert_eq!(PieceKind::from_hand_letter("P"), Ok(PieceKind::Pawn));
        assert_eq!(PieceKind::from_hand_letter("r"), Ok(PieceKind::Rook));
        // 王不可入手
        assert!(PieceKind::from_hand_letter("K").is_err());
        assert!(PieceKind::from_hand_letter("").is_err());
        assert!(PieceKind::from_hand_letter("PP").is_err());
    }
}
