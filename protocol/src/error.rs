//! 错误类型定义

use thiserror::Error;

/// 记谱/局面编码错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShogiError {
    /// 无效的局面编码
    #[error("Malformed position: {reason}")]
    MalformedPosition { reason: String },

    /// 无效的坐标表示
    #[error("Invalid square notation: {notation}")]
    InvalidSquare { notation: String },

    /// 无效的着法表示
    #[error("Invalid move notation: {notation}")]
    InvalidMove { notation: String },

    /// 无效的持驹种类
    #[error("Invalid hand piece: {letter}")]
    InvalidHandPiece { letter: String },
}

impl ShogiError {
    /// 构造局面编码错误
    pub fn malformed(reason: impl Into<String>) -> Self {
        ShogiError::MalformedPosition {
            reason: reason.into(),
        }
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ShogiError>;
