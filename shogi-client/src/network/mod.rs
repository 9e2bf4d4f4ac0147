//! 与远端规则服务的通信
//!
//! 规则服务是唯一的走法合法性权威：客户端只提交意图、展示结果。
//! [`Authority`] trait 抽象它的五个契约，HTTP 实现见 [`http`]。

mod http;

pub use http::{AuthorityConfig, HttpAuthority};

use async_trait::async_trait;
use protocol::{BoardResponse, MoveReply, MoveRequest, PollReply, Square};
use thiserror::Error;

/// 远端规则服务错误
#[derive(Error, Debug, Clone)]
pub enum AuthorityError {
    /// 传输层失败（连接、超时、响应体损坏）
    #[error("transport failure: {0}")]
    Transport(String),

    /// 服务端拒绝（非 2xx 状态），消息取自响应体
    #[error("rejected by server (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// 远端规则服务的契约
///
/// 客户端无条件信任它的判定结果：合法性校验、将死检测都发生在远端。
#[async_trait]
pub trait Authority: Send + Sync {
    /// 获取当前局面
    async fn fetch_position(&self) -> Result<BoardResponse, AuthorityError>;

    /// 提交着法
    async fn submit_move(&self, request: &MoveRequest) -> Result<MoveReply, AuthorityError>;

    /// 询问对方是否已走子
    async fn poll_opponent(&self) -> Result<PollReply, AuthorityError>;

    /// 查询某格棋子的合法落点（仅用于高亮）
    async fn legal_destinations(&self, square: Square) -> Result<Vec<String>, AuthorityError>;

    /// 重置对局；成功后应重新拉取局面
    async fn reset(&self) -> Result<(), AuthorityError>;
}

#[async_trait]
impl<T: Authority + ?Sized> Authority for std::sync::Arc<T> {
    async fn fetch_position(&self) -> Result<BoardResponse, AuthorityError> {
        (**self).fetch_position().await
    }

    async fn submit_move(&self, request: &MoveRequest) -> Result<MoveReply, AuthorityError> {
        (**self).submit_move(request).await
    }

    async fn poll_opponent(&self) -> Result<PollReply, AuthorityError> {
        (**self).poll_opponent().await
    }

    async fn legal_destinations(&self, square: Square) -> Result<Vec<String>, AuthorityError> {
        (**self).legal_destinations(square).await
    }

    async fn reset(&self) -> Result<(), AuthorityError> {
        (**self).reset().await
    }
}
