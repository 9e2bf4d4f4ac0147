//! SFEN 局面解析
//!
//! SFEN 的棋盘字段按段从上到下以 `/` 分隔，共 9 段：
//! 数字表示连续空格数，字母表示棋子（大写先手、小写后手），
//! `+` 前缀表示紧随其后的棋子为升变形态。
//!
//! 示例（初始局面）：
//! `lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1`
//!
//! 棋盘字段之后的走子方、持驹等字段由接口单独传递，这里忽略。

use crate::board::Board;
use crate::error::ShogiError;
use crate::piece::Piece;
use crate::square::{Square, BOARD_SIZE};

/// 初始局面 SFEN
pub const INITIAL_SFEN: &str =
    "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// SFEN 格式处理
pub struct Sfen;

impl Sfen {
    /// 解析 SFEN 字符串的棋盘字段
    ///
    /// 解析失败时不产生部分结果，调用方应保留原有局面。
    pub fn parse_board(sfen: &str) -> Result<Board, ShogiError> {
        let field = sfen
            .split_whitespace()
            .next()
            .ok_or_else(|| ShogiError::malformed("empty SFEN string"))?;

        let rows: Vec<&str> = field.split('/').collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(ShogiError::malformed(format!(
                "expected 9 ranks, got {}",
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (y, row) in rows.iter().enumerate() {
            let mut x = 0u8;
            let mut promoted = false;

            for c in row.chars() {
                if c == '+' {
                    if promoted {
                        return Err(ShogiError::malformed(format!(
                            "rank {}: consecutive promotion markers",
                            y + 1
                        )));
                    }
                    promoted = true;
                    continue;
                }

                if let Some(run) = c.to_digit(10) {
                    // 升变前缀后必须紧跟棋子字母
                    if promoted {
                        return Err(ShogiError::malformed(format!(
                            "rank {}: promotion marker before digit",
                            y + 1
                        )));
                    }
                    x += run as u8;
                    if x > BOARD_SIZE {
                        return Err(ShogiError::malformed(format!(
                            "rank {}: empty run overflows the rank",
                            y + 1
                        )));
                    }
                } else {
                    if x >= BOARD_SIZE {
                        return Err(ShogiError::malformed(format!(
                            "rank {}: too many squares",
                            y + 1
                        )));
                    }
                    let piece = Piece::from_sfen(c, promoted).ok_or_else(|| {
                        ShogiError::malformed(format!(
                            "rank {}: unrecognized symbol '{}'",
                            y + 1,
                            if promoted { format!("+{c}") } else { c.to_string() }
                        ))
                    })?;
                    board.set(Square::new_unchecked(x, y as u8), Some(piece));
                    x += 1;
                    promoted = false;
                }
            }

            if promoted {
                return Err(ShogiError::malformed(format!(
                    "rank {}: dangling promotion marker",
                    y + 1
                )));
            }
            if x != BOARD_SIZE {
                return Err(ShogiError::malformed(format!(
                    "rank {}: has {} squares, expected 9",
                    y + 1,
                    x
                )));
            }
        }

        Ok(board)
    }
}
