//! 规则服务的 HTTP 实现
//!
//! 端点：
//! - `GET  /board`        当前局面
//! - `POST /move`         提交着法
//! - `POST /poll`         轮询对方应手
//! - `GET  /legal_moves`  某格的合法落点
//! - `POST /reset`        重置对局

use anyhow::{Context, Result};
use async_trait::async_trait;
use protocol::{BoardResponse, ErrorReply, LegalMovesReply, MoveReply, MoveRequest, PollReply, Square};
use tracing::debug;

use super::{Authority, AuthorityError};

/// 规则服务客户端配置
#[derive(Clone, Debug)]
pub struct AuthorityConfig {
    /// 服务地址，默认 http://localhost:5000
    pub base_url: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// 规则服务的 HTTP 客户端
pub struct HttpAuthority {
    config: AuthorityConfig,
    client: reqwest::Client,
}

impl HttpAuthority {
    /// 创建新客户端
    pub fn new(config: AuthorityConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { config, client })
    }

    /// 使用默认配置创建客户端
    pub fn with_defaults() -> Result<Self> {
        Self::new(AuthorityConfig::default())
    }

    /// 当前配置
    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// 将非 2xx 响应转换为拒绝错误，消息优先取响应体的 `error` 字段
    async fn rejection(response: reqwest::Response) -> AuthorityError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorReply>(&body)
            .map(|reply| reply.error)
            .unwrap_or(body);
        AuthorityError::Rejected { status, message }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AuthorityError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AuthorityError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Authority for HttpAuthority {
    async fn fetch_position(&self) -> Result<BoardResponse, AuthorityError> {
        debug!("GET /board");
        self.get_json("/board", &[]).await
    }

    async fn submit_move(&self, request: &MoveRequest) -> Result<MoveReply, AuthorityError> {
        debug!(from = %request.from, to = %request.to, promote = request.promote, "POST /move");
        self.post_json("/move", request).await
    }

    async fn poll_opponent(&self) -> Result<PollReply, AuthorityError> {
        debug!("POST /poll");
        self.post_json("/poll", &serde_json::json!({})).await
    }

    async fn legal_destinations(&self, square: Square) -> Result<Vec<String>, AuthorityError> {
        debug!(%square, "GET /legal_moves");
        let reply: LegalMovesReply = self
            .get_json("/legal_moves", &[("square", square.to_usi())])
            .await?;
        Ok(reply.legal_moves)
    }

    async fn reset(&self) -> Result<(), AuthorityError> {
        debug!("POST /reset");
        let response = self
            .client
            .post(self.url("/reset"))
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthorityConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert!(config.timeout_secs > 0);
    }

    #[test]
    fn test_client_creation() {
        let authority = HttpAuthority::with_defaults().unwrap();
        assert_eq!(authority.config().base_url, "http://localhost:5000");
    }
}
