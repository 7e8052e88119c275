use redis::{AsyncCommands, RedisResult};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window counter. Returns `true` while `key` has seen at most
    /// `limit` hits in the current window.
    ///
    /// The window starts with the first hit; later hits do not extend it.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count, ttl): (i64, i64) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .ttl(key)
            .query_async(&mut conn)
            .await?;

        // -1: key exists without expiry, i.e. this hit opened the window
        if count == 1 || ttl == -1 {
            conn.expire::<_, ()>(key, window_seconds).await?;
        }

        Ok(count <= limit)
    }
}

pub fn rate_limit_key(client: &str) -> String {
    format!("ratelimit:{}", client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key_is_per_client() {
        assert_eq!(rate_limit_key("10.0.0.1"), "ratelimit:10.0.0.1");
        assert_ne!(rate_limit_key("10.0.0.1"), rate_limit_key("10.0.0.2"));
    }
}
