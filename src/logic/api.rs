use crate::config::AppConfig;
use crate::log_warn;
use crate::logic::models::{BackupInfo, DiscordStatus, ServerSettings};
use anyhow::{Result, anyhow};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Recipe Manager 服务端的薄客户端，所有业务逻辑都在远端。
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_token: String,
    max_retries: u32,
    retry_delay: u64,
}

impl ApiClient {
    pub fn new(config: AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_token)
    }

    async fn send_with_retry(
        &self,
        builder_fn: impl Fn() -> RequestBuilder,
        token: &CancellationToken,
    ) -> Result<Response> {
        let mut attempt = 0;

        loop {
            if token.is_cancelled() {
                return Err(anyhow!("任务已被用户取消"));
            }
            let request = builder_fn().header("Authorization", self.bearer());

            let result = select! {
                res = request.send() => res,
                _ = token.cancelled() => {
                    return Err(anyhow!("任务被用户取消"));
                }
            };

            match result {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        return Ok(resp);
                    }

                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
                        let text = resp.text().await.unwrap_or_default();
                        return Err(anyhow!("API 错误 (HTTP {}): {}", status, text));
                    }

                    if attempt >= self.max_retries {
                        let text = resp.text().await.unwrap_or_default();
                        return Err(anyhow!("重试耗尽 (HTTP {}): {}", status, text));
                    }

                    let wait_time = if status == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(retry_after) = resp.headers().get("Retry-After") {
                            retry_after
                                .to_str()
                                .ok()
                                .and_then(|s| s.parse::<u64>().ok())
                                .map(Duration::from_secs)
                                .unwrap_or(Duration::from_secs(self.retry_delay * 2_u64.pow(attempt))) // 解析失败则回退
                        } else {
                            Duration::from_secs(self.retry_delay * 2_u64.pow(attempt)) // 指数回退
                        }
                    } else if status.is_server_error() {
                        Duration::from_secs(self.retry_delay)
                    } else {
                        let text = resp.text().await.unwrap_or_default();
                        return Err(anyhow!("请求失败 (HTTP {}): {}", status, text));
                    };

                    log_warn!(
                        "请求遇到 {}, 等待 {:?} 后重试 (第 {}/{} 次)...",
                        status,
                        wait_time,
                        attempt + 1,
                        self.max_retries
                    );
                    sleep(wait_time).await;
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(anyhow!("网络重试耗尽: {}", e));
                    }

                    let wait_time = Duration::from_secs(2_u64.pow(attempt));
                    log_warn!(
                        "网络错误: {}, 等待 {:?} 后重试 (第 {}/{} 次)...",
                        e,
                        wait_time,
                        attempt + 1,
                        self.max_retries
                    );
                    sleep(wait_time).await;
                }
            }

            attempt += 1;
        }
    }

    // ---- 设置 ----

    pub async fn fetch_settings(&self, token: &CancellationToken) -> Result<ServerSettings> {
        let url = self.url("/api/settings");
        let resp = self
            .send_with_retry(|| self.client.get(&url), token)
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn update_settings(
        &self,
        settings: &ServerSettings,
        token: &CancellationToken,
    ) -> Result<()> {
        let url = self.url("/api/settings");
        self.send_with_retry(|| self.client.put(&url).json(settings), token)
            .await?;
        Ok(())
    }

    // ---- 备份 ----

    pub async fn fetch_backups(&self, token: &CancellationToken) -> Result<Vec<BackupInfo>> {
        let url = self.url("/api/backups");
        let resp = self
            .send_with_retry(|| self.client.get(&url), token)
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn create_backup(&self, token: &CancellationToken) -> Result<()> {
        let url = self.url("/api/backups");
        self.send_with_retry(|| self.client.post(&url), token)
            .await?;
        Ok(())
    }

    pub async fn download_backup(
        &self,
        name: &str,
        token: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let url = self.url(&format!("/api/backups/{}", name));
        let resp = self
            .send_with_retry(|| self.client.get(&url), token)
            .await?;
        Ok(resp.bytes().await?.to_vec())
    }

    pub async fn upload_backup(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        token: &CancellationToken,
    ) -> Result<()> {
        let url = self.url("/api/backups/upload");
        self.send_with_retry(
            || {
                self.client
                    .post(&url)
                    .query(&[("name", file_name)])
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(bytes.clone())
            },
            token,
        )
        .await?;
        Ok(())
    }

    pub async fn restore_backup(&self, name: &str, token: &CancellationToken) -> Result<()> {
        let url = self.url(&format!("/api/backups/{}/restore", name));
        self.send_with_retry(|| self.client.post(&url), token)
            .await?;
        Ok(())
    }

    pub async fn delete_backup(&self, name: &str, token: &CancellationToken) -> Result<()> {
        let url = self.url(&format!("/api/backups/{}", name));
        self.send_with_retry(|| self.client.delete(&url), token)
            .await?;
        Ok(())
    }

    // ---- 食谱批量导入导出 ----

    pub async fn export_recipes(&self, token: &CancellationToken) -> Result<Vec<u8>> {
        let url = self.url("/api/recipes/export");
        let resp = self
            .send_with_retry(|| self.client.get(&url), token)
            .await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// 返回服务端报告的导入条数。
    pub async fn import_recipes(
        &self,
        document: Vec<u8>,
        token: &CancellationToken,
    ) -> Result<u64> {
        let url = self.url("/api/recipes/import");
        let resp = self
            .send_with_retry(
                || {
                    self.client
                        .post(&url)
                        .header(CONTENT_TYPE, "application/json")
                        .body(document.clone())
                },
                token,
            )
            .await?;

        let json: Value = resp.json().await?;
        json["imported"]
            .as_u64()
            .ok_or(anyhow!("服务端返回内容缺少导入条数"))
    }

    // ---- Discord 机器人 ----

    pub async fn discord_status(&self, token: &CancellationToken) -> Result<DiscordStatus> {
        let url = self.url("/api/discord/status");
        let resp = self
            .send_with_retry(|| self.client.get(&url), token)
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn discord_reconnect(&self, token: &CancellationToken) -> Result<()> {
        let url = self.url("/api/discord/reconnect");
        self.send_with_retry(|| self.client.post(&url), token)
            .await?;
        Ok(())
    }

    pub async fn discord_test(&self, token: &CancellationToken) -> Result<()> {
        let url = self.url("/api/discord/test");
        self.send_with_retry(|| self.client.post(&url), token)
            .await?;
        Ok(())
    }

    /// 获取机器人的邀请链接。
    pub async fn discord_link(&self, token: &CancellationToken) -> Result<String> {
        let url = self.url("/api/discord/link");
        let resp = self
            .send_with_retry(|| self.client.get(&url), token)
            .await?;

        let json: Value = resp.json().await?;
        json["url"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(anyhow!("服务端返回内容缺少邀请链接"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = AppConfig {
            server_url: "http://localhost:9000///".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(config);
        assert_eq!(client.url("/api/settings"), "http://localhost:9000/api/settings");
    }
}
