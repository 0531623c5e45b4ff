//! 请求上下文
//!
//! 目录查询需要知道当前站点（决定目录服务地址）以及调用凭证。
//! 上下文作为参数显式传递，不依赖线程局部状态。

use serde::{Deserialize, Serialize};

use crate::error::{OfferError, Result};

/// 站点配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub domain: String,
    /// 目录服务 API 根地址，如 `https://catalog.example.com/api/v1`
    #[serde(default)]
    pub catalog_api_url: Option<String>,
    /// 学习平台根地址，用于拼接收据页等链接
    #[serde(default)]
    pub lms_url: Option<String>,
}

impl Site {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            catalog_api_url: None,
            lms_url: None,
        }
    }

    pub fn with_catalog_api_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_api_url = Some(url.into());
        self
    }

    pub fn with_lms_url(mut self, url: impl Into<String>) -> Self {
        self.lms_url = Some(url.into());
        self
    }

    /// 拼接学习平台地址，站点未配置时返回 None
    pub fn lms_url_for(&self, path: &str) -> Option<String> {
        self.lms_url.as_deref().map(|root| {
            format!(
                "{}/{}",
                root.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        })
    }
}

/// 单次请求的上下文
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub site: Site,
    pub auth_token: String,
}

impl RequestContext {
    pub fn new(site: Site, auth_token: impl Into<String>) -> Self {
        Self {
            site,
            auth_token: auth_token.into(),
        }
    }

    /// 当前站点的目录服务地址（去掉末尾的 `/`）
    pub fn catalog_api_url(&self) -> Result<&str> {
        match self.site.catalog_api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url.trim_end_matches('/')),
            _ => Err(OfferError::Configuration(format!(
                "站点 {} 未配置目录服务地址",
                self.site.domain
            ))),
        }
    }
}

/// 要求存在请求上下文
pub fn require_context(ctx: Option<&RequestContext>) -> Result<&RequestContext> {
    ctx.ok_or_else(|| OfferError::Configuration("目录查询需要请求上下文，但当前没有".to_string()))
}
