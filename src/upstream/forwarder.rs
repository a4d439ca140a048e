use std::time::Duration;

use reqwest::{Client, StatusCode, header};

/// 注入到上游查询串中的凭证参数名
const API_KEY_PARAM: &str = "api_key";

/// 上游请求的总超时
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// 已读取完整响应体的上游应答
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// 上游转发器，持有出站 HTTP 客户端与上游源地址
#[derive(Clone)]
pub struct UpstreamForwarder {
    client: Client,
    base_url: String,
}

impl UpstreamForwarder {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    /// 以调用方自己的凭证向上游发起 GET
    ///
    /// 调用方查询参数原样转发，凭证参数被覆盖注入。任何状态码都作为
    /// 成功返回，网络、超时和 DNS 失败返回错误；不做重试。返回的错误
    /// 已剥离请求 URL，其查询串含有注入的凭证，不能进入日志或响应。
    pub async fn forward(
        &self,
        api_key: &str,
        path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let query = inject_credential(query, api_key);

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&query)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?
            .to_vec();

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

/// 覆盖调用方可能自带的凭证参数，追加代理注入的凭证
fn inject_credential(query: &[(String, String)], api_key: &str) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = query
        .iter()
        .filter(|(name, _)| name.as_str() != API_KEY_PARAM)
        .cloned()
        .collect();
    params.push((API_KEY_PARAM.to_string(), api_key.to_string()));
    params
}
