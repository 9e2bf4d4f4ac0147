//! 棋盘坐标
//!
//! 两套坐标系并存且必须精确互转：
//! - 显示坐标 (x, y)：从 0 开始，x 从左到右、y 从上到下，供渲染层使用
//! - USI 坐标：筋（1-9，从右往左）+ 段（a-i，从上到下），供接口使用

use serde::{Deserialize, Serialize};

use crate::error::ShogiError;
use crate::piece::Side;

/// 棋盘宽高（9x9）
pub const BOARD_SIZE: u8 = 9;

/// 棋盘格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    /// 列 (0-8)，从左到右
    pub x: u8,
    /// 行 (0-8)，从上到下
    pub y: u8,
}

impl Square {
    /// 创建新坐标
    pub fn new(x: u8, y: u8) -> Option<Self> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// 创建新坐标（不检查边界，内部使用）
    pub const fn new_unchecked(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// USI 筋（1-9，从右往左）
    pub fn file(&self) -> u8 {
        BOARD_SIZE - self.x
    }

    /// USI 段字母（a-i，从上到下）
    pub fn rank_char(&self) -> char {
        (b'a' + self.y) as char
    }

    /// 转换为 USI 表示，如 "7g"
    pub fn to_usi(&self) -> String {
        format!("{}{}", self.file(), self.rank_char())
    }

    /// 从 USI 表示解析
    pub fn from_usi(notation: &str) -> Result<Self, ShogiError> {
        let invalid = || ShogiError::InvalidSquare {
            notation: notation.to_string(),
        };
        let mut chars = notation.chars();
        let (Some(file_char), Some(rank_char), None) =
            (chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid());
        };
        let file = file_char.to_digit(10).ok_or_else(invalid)? as u8;
        if !(1..=9).contains(&file) {
            return Err(invalid());
        }
        if !('a'..='i').contains(&rank_char) {
            return Err(invalid());
        }
        Ok(Self {
            x: BOARD_SIZE - file,
            y: rank_char as u8 - b'a',
        })
    }

    /// 人类可读表示，筋 + 段序号，如 "76"
    pub fn human(&self) -> String {
        format!("{}{}", self.file(), self.y + 1)
    }

    /// 是否位于指定阵营的升变区（靠近对方底边的三段）
    pub fn in_promotion_zone(&self, side: Side) -> bool {
        match side {
            Side::Sente => self.y <= 2,
            Side::Gote => self.y >= 6,
        }
    }

    /// 转换为数组下标
    pub(crate) fn to_index(self) -> usize {
        self.y as usize * BOARD_SIZE as usize + self.x as usize
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_usi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usi_roundtrip_all_squares() {
        // 81 格全部精确往返
        for y in 0..9 {
            for x in 0..9 {
                let sq = Square::new_unchecked(x, y);
                assert_eq!(Square::from_usi(&sq.to_usi()), Ok(sq));
            }
        }
    }

    #[test]
    fn test_usi_corners() {
        assert_eq!(Square::new_unchecked(0, 0).to_usi(), "9a");
        assert_eq!(Square::new_unchecked(8, 0).to_usi(), "1a");
        assert_eq!(Square::new_unchecked(0, 8).to_usi(), "9i");
        assert_eq!(Square::new_unchecked(2, 6).to_usi(), "7g");
    }

    #[test]
    fn test_from_usi_invalid() {
        assert!(Square::from_usi("").is_err());
        assert!(Square::from_usi("7").is_err());
        assert!(Square::from_usi("0a").is_err());
        assert!(Square::from_usi("7j").is_err());
        assert!(Square::from_usi("7g+").is_err());
        assert!(Square::from_usi("ag").is_err());
    }

    #[test]
    fn test_human_notation() {
        assert_eq!(Square::new_unchecked(2, 6).human(), "77");
        assert_eq!(Square::new_unchecked(2, 5).human(), "76");
    }

    #[test]
    fn test_promotion_zone() {
        // 先手的升变区是靠近后手底边的三段
        assert!(Square::new_unchecked(4, 0).in_promotion_zone(Side::Sente));
        assert!(Square::new_unchecked(4, 2).in_promotion_zone(Side::Sente));
        assert!(!Square::new_unchecked(4, 3).in_promotion_zone(Side::Sente));

        assert!(Square::new_unchecked(4, 6).in_promotion_zone(Side::Gote));
        assert!(Square::new_unchecked(4, 8).in_promotion_zone(Side::Gote));
        assert!(!Square::new_unchecked(4, 5).in_promotion_zone(Side::Gote));
    }
}
