use thiserror::Error;

/// 内容类型长度前缀固定为 3 位十进制数字
const LEN_PREFIX_DIGITS: usize = 3;

/// 3 位长度前缀能表示的内容类型最大字节数
const MAX_CONTENT_TYPE_LEN: usize = 999;

/// 缓存响应数据模型
/// 持久化格式：3 位零填充的内容类型字节长度 + 内容类型 + 原始响应体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// 缓存值编解码错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("content type is {0} bytes, the length prefix supports at most 999")]
    ContentTypeTooLong(usize),
    #[error("cached value is shorter than the 3-byte length prefix")]
    MissingLengthPrefix,
    #[error("content type length prefix is not a decimal integer")]
    InvalidLengthPrefix,
    #[error("content type length {declared} exceeds the {available} bytes that follow the prefix")]
    TruncatedContentType { declared: usize, available: usize },
    #[error("cached content type is not valid UTF-8")]
    ContentTypeNotUtf8,
}

impl CachedResponse {
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// 编码为单个存储值，响应体原样追加，不做任何转义
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let content_type = self.content_type.as_bytes();
        if content_type.len() > MAX_CONTENT_TYPE_LEN {
            return Err(CodecError::ContentTypeTooLong(content_type.len()));
        }

        let mut value = Vec::with_capacity(LEN_PREFIX_DIGITS + content_type.len() + self.body.len());
        value.extend_from_slice(format!("{:03}", content_type.len()).as_bytes());
        value.extend_from_slice(content_type);
        value.extend_from_slice(&self.body);
        Ok(value)
    }

    /// 从存储值还原，所有边界都显式检查
    pub fn decode(value: &[u8]) -> Result<Self, CodecError> {
        if value.len() < LEN_PREFIX_DIGITS {
            return Err(CodecError::MissingLengthPrefix);
        }
        let (prefix, rest) = value.split_at(LEN_PREFIX_DIGITS);

        let declared = std::str::from_utf8(prefix)
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or(CodecError::InvalidLengthPrefix)?;
        if declared > rest.len() {
            return Err(CodecError::TruncatedContentType {
                declared,
                available: rest.len(),
            });
        }

        let (content_type, body) = rest.split_at(declared);
        let content_type = std::str::from_utf8(content_type)
            .map_err(|_| CodecError::ContentTypeNotUtf8)?
            .to_string();

        Ok(Self {
            content_type,
            body: body.to_vec(),
        })
    }
}
