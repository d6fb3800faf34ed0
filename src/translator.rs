//! 翻译服务适配模块
//!
//! 定义语言检测与翻译两项能力的 `Translator` trait，
//! 并提供Google网页接口与DeepLX两种后端实现。

// 标准库导入
use std::time::Duration;

// 第三方crate导入
use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

// 本地模块导入
use crate::api_constants::{api_config, service_config};
use crate::error::Result;
use crate::translate_error;

/// 翻译服务能力接口
///
/// 两个操作都视为可能失败的远程调用，实现方不做重试。
#[async_trait]
pub trait Translator: Send + Sync {
    /// 检测文本的语言，返回小写语言代码
    async fn detect(&self, text: &str) -> Result<String>;

    /// 把文本从 `source_lang` 翻译到 `target_lang`
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

/// 可选的翻译后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Google翻译网页接口
    Google,
    /// DeepLX兼容接口
    Deeplx,
}

impl Backend {
    /// 后端的默认API地址
    pub fn default_api_url(self) -> &'static str {
        match self {
            Backend::Google => api_config::GOOGLE_API_URL,
            Backend::Deeplx => api_config::DEEPLX_API_URL,
        }
    }
}

/// 根据后端类型创建翻译器
pub fn build_translator(
    backend: Backend,
    api_url: &str,
    timeout_secs: u64,
) -> Result<Box<dyn Translator>> {
    let client = build_client(timeout_secs)?;
    Ok(match backend {
        Backend::Google => Box::new(GoogleTranslator::new(client, api_url)),
        Backend::Deeplx => Box::new(DeepLxTranslator::new(client, api_url)),
    })
}

/// 创建带超时设置的HTTP客户端
fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(api_config::DEFAULT_USER_AGENT)
        .build()?;
    Ok(client)
}

/// 截取用于语言检测的样本（按字符边界）
fn detection_sample(text: &str) -> &str {
    match text.char_indices().nth(service_config::DETECT_SAMPLE_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// 读取响应体，非成功状态转为API错误
async fn read_success_body(response: reqwest::Response, api_url: &str) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(translate_error!(
            translation_api,
            status.as_u16(),
            body.trim(),
            api_url
        ));
    }

    Ok(body)
}

/// Google翻译网页接口 (`translate_a/single`, client=gtx)
pub struct GoogleTranslator {
    client: Client,
    api_url: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
        }
    }

    async fn request(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<GoogleResult> {
        debug!("发送翻译请求到: {} ({} 字符)", self.api_url, text.len());

        let response = self
            .client
            .post(&self.api_url)
            .query(&[
                ("client", api_config::GOOGLE_CLIENT),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("ie", "UTF-8"),
                ("oe", "UTF-8"),
            ])
            .form(&[("q", text)])
            .send()
            .await?;

        let body = read_success_body(response, &self.api_url).await?;
        parse_google_response(&body, &self.api_url)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn detect(&self, text: &str) -> Result<String> {
        let result = self
            .request(detection_sample(text), "auto", service_config::DETECT_PROBE_TARGET)
            .await?;

        result
            .detected_lang
            .map(|lang| lang.to_lowercase())
            .ok_or_else(|| translate_error!(detection, "响应中没有检测到的语言代码"))
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        Ok(self.request(text, source_lang, target_lang).await?.text)
    }
}

/// Google接口的解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleResult {
    pub text: String,
    pub detected_lang: Option<String>,
}

/// 解析Google接口返回的嵌套数组
///
/// 结构为 `[[["译文", "原文", ...], ...], null, "源语言", ...]`，
/// 译文按句子分段，需要拼接。
pub fn parse_google_response(body: &str, api_url: &str) -> Result<GoogleResult> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        translate_error!(translation_api, 200, format!("无法解析响应: {}", e), api_url)
    })?;

    let segments = value
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| translate_error!(translation_api, 200, "响应中缺少译文分段", api_url))?;

    let text = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|v| v.as_str()))
        .collect::<String>();

    let detected_lang = value.get(2).and_then(|v| v.as_str()).map(str::to_string);

    Ok(GoogleResult {
        text,
        detected_lang,
    })
}

/// DeepLX请求体
#[derive(Debug, Serialize)]
struct DeepLxRequest<'a> {
    text: &'a str,
    source_lang: String,
    target_lang: String,
}

/// DeepLX响应体
#[derive(Debug, Deserialize)]
pub struct DeepLxResponse {
    pub code: i32,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub source_lang: Option<String>,
}

/// DeepLX兼容接口
pub struct DeepLxTranslator {
    client: Client,
    api_url: String,
}

impl DeepLxTranslator {
    pub fn new(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
        }
    }

    async fn request(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<DeepLxResponse> {
        debug!("发送DeepLX请求到: {} ({} 字符)", self.api_url, text.len());

        let request = DeepLxRequest {
            text,
            source_lang: deeplx_lang_code(source_lang),
            target_lang: deeplx_lang_code(target_lang),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await?;

        let body = read_success_body(response, &self.api_url).await?;
        parse_deeplx_response(&body, &self.api_url)
    }
}

#[async_trait]
impl Translator for DeepLxTranslator {
    async fn detect(&self, text: &str) -> Result<String> {
        let result = self
            .request(detection_sample(text), "auto", service_config::DETECT_PROBE_TARGET)
            .await?;

        result
            .source_lang
            .filter(|lang| !lang.is_empty())
            .map(|lang| lang.to_lowercase())
            .ok_or_else(|| translate_error!(detection, "DeepLX响应中没有source_lang字段"))
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        Ok(self.request(text, source_lang, target_lang).await?.data)
    }
}

/// DeepLX使用大写语言代码，`auto` 保持不变
fn deeplx_lang_code(code: &str) -> String {
    if code.eq_ignore_ascii_case("auto") {
        "auto".to_string()
    } else {
        code.to_uppercase()
    }
}

/// 解析DeepLX响应
pub fn parse_deeplx_response(body: &str, api_url: &str) -> Result<DeepLxResponse> {
    let response: DeepLxResponse = serde_json::from_str(body).map_err(|e| {
        translate_error!(translation_api, 200, format!("无法解析DeepLX响应: {}", e), api_url)
    })?;

    if response.code != 200 {
        return Err(translate_error!(
            translation_api,
            u16::try_from(response.code).unwrap_or(500),
            format!("DeepLX翻译失败，返回代码: {}", response.code),
            api_url
        ));
    }

    Ok(response)
}
