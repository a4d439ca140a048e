use data_encoding::BASE32;
use sha2::{Digest, Sha256};

/// 缓存键前缀，避免与共享存储中的其他键冲突
const CACHE_KEY_PREFIX: &str = "flickr-api-proxy:cache:";

/// 由调用方凭证、请求路径和查询参数派生缓存键
///
/// 凭证只参与哈希，不会以明文形式出现在键中；相同的参数集合
/// 无论传入顺序如何都派生出同一个键。
pub fn response_cache_key(api_key: &str, path: &str, query: &[(String, String)]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(path.as_bytes());
    hasher.update(canonical_query(query).as_bytes());
    format!("{}{}", CACHE_KEY_PREFIX, BASE32.encode(&hasher.finalize()))
}

/// 查询参数的规范编码：整个键值对排序后做标准表单编码
fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs = query.to_vec();
    pairs.sort();

    let mut encoded = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in &pairs {
        encoded.append_pair(name, value);
    }
    encoded.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn key_ignores_parameter_order() {
        let forward = pairs(&[("method", "flickr.test.echo"), ("format", "json"), ("a", "1")]);
        let shuffled = pairs(&[("a", "1"), ("format", "json"), ("method", "flickr.test.echo")]);
        assert_eq!(
            response_cache_key("key", "/services/rest", &forward),
            response_cache_key("key", "/services/rest", &shuffled)
        );
    }

    #[test]
    fn key_ignores_order_of_repeated_parameters() {
        let forward = pairs(&[("tag", "sunset"), ("tag", "beach")]);
        let reversed = pairs(&[("tag", "beach"), ("tag", "sunset")]);
        assert_eq!(
            response_cache_key("key", "/services/rest", &forward),
            response_cache_key("key", "/services/rest", &reversed)
        );
    }

    #[test]
    fn key_differs_per_credential() {
        let query = pairs(&[("method", "flickr.test.echo")]);
        assert_ne!(
            response_cache_key("alice-key", "/services/rest", &query),
            response_cache_key("bob-key", "/services/rest", &query)
        );
    }

    #[test]
    fn key_differs_per_path_and_parameters() {
        let query = pairs(&[("method", "flickr.test.echo")]);
        let other = pairs(&[("method", "flickr.photos.search")]);
        assert_ne!(
            response_cache_key("key", "/services/rest", &query),
            response_cache_key("key", "/services/feeds", &query)
        );
        assert_ne!(
            response_cache_key("key", "/services/rest", &query),
            response_cache_key("key", "/services/rest", &other)
        );
    }

    #[test]
    fn key_is_namespaced_and_base32() {
        let key = response_cache_key("key", "/services/rest", &[]);
        let digest = key.strip_prefix(CACHE_KEY_PREFIX).unwrap();
        assert!(!digest.is_empty());
        assert!(
            digest
                .chars()
                .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c) || c == '=')
        );
    }

    #[test]
    fn key_never_contains_the_raw_credential() {
        let api_key = "very-secret-credential";
        let key = response_cache_key(api_key, "/services/rest", &[]);
        assert!(!key.contains(api_key));
    }
}
