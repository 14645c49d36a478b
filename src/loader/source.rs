//! 参照データの取得元
//!
//! ローカルディレクトリ、または同一オリジンの静的配信（HTTP）から読み込む。
//! 再試行・タイムアウトは無い。

use crate::error::{FloorAssignError, Result};
use reqwest::{Client, Url};
use std::path::PathBuf;
use thiserror::Error;

/// 1リソースの取得失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 2xx 以外の応答（ディレクトリの場合、ファイルが無ければ 404 扱い）
    #[error("{reason}")]
    Status { code: u16, reason: String },

    #[error("{0}")]
    Network(String),
}

impl FetchError {
    fn not_found() -> Self {
        FetchError::Status {
            code: 404,
            reason: "Not Found".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AssetSource {
    Dir(PathBuf),
    Http { base: Url, client: Client },
}

impl AssetSource {
    /// "http://" / "https://" で始まればHTTP、それ以外はディレクトリ
    pub fn parse(base: &str) -> Result<Self> {
        let trimmed = base.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            // 末尾のスラッシュが無いと join で最後の階層が置き換わる
            let with_slash = if trimmed.ends_with('/') {
                trimmed.to_string()
            } else {
                format!("{}/", trimmed)
            };
            let base = Url::parse(&with_slash)
                .map_err(|e| FloorAssignError::Config(format!("URLが不正です: {} ({})", trimmed, e)))?;
            Ok(AssetSource::Http {
                base,
                client: Client::new(),
            })
        } else {
            Ok(AssetSource::Dir(PathBuf::from(trimmed)))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            AssetSource::Dir(dir) => dir.display().to_string(),
            AssetSource::Http { base, .. } => base.to_string(),
        }
    }

    /// リソースをテキストとして取得
    pub async fn fetch_text(&self, name: &str) -> std::result::Result<String, FetchError> {
        let name = name.trim_start_matches('/');
        match self {
            AssetSource::Dir(dir) => {
                let path = dir.join(name);
                log::debug!("読み込み: {}", path.display());
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => Ok(text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::not_found()),
                    Err(e) => Err(FetchError::Network(e.to_string())),
                }
            }
            AssetSource::Http { base, client } => {
                let url = base
                    .join(name)
                    .map_err(|e| FetchError::Network(format!("URLが不正です: {}", e)))?;
                log::debug!("取得: {}", url);

                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| FetchError::Network(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        code: status.as_u16(),
                        reason: status.canonical_reason().unwrap_or("").to_string(),
                    });
                }

                response
                    .text()
                    .await
                    .map_err(|e| FetchError::Network(e.to_string()))
            }
        }
    }
}
