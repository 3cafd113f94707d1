//! Public IP resolution with a single fallback source

use crate::error::{Error, Result};
use crate::traits::IpSource;
use std::net::Ipv4Addr;
use tracing::{error, info};

/// Resolves the current public IPv4 address
///
/// The primary source is asked first. On any failure the fallback is asked
/// exactly once. If both fail the result is [`Error::IpLookup`], which is
/// fatal for the process.
pub struct IpResolver {
    primary: Box<dyn IpSource>,
    fallback: Box<dyn IpSource>,
}

impl IpResolver {
    pub fn new(primary: Box<dyn IpSource>, fallback: Box<dyn IpSource>) -> Self {
        Self { primary, fallback }
    }

    /// Resolve the current public IP
    pub async fn resolve(&self) -> Result<Ipv4Addr> {
        let primary_err = match self.primary.current().await {
            Ok(ip) => {
                info!("{} request succeeded, IP: {}", self.primary.source_name(), ip);
                return Ok(ip);
            }
            Err(e) => {
                error!("{} request failed: {}", self.primary.source_name(), e);
                e
            }
        };

        match self.fallback.current().await {
            Ok(ip) => {
                info!("{} request succeeded, IP: {}", self.fallback.source_name(), ip);
                Ok(ip)
            }
            Err(e) => {
                error!("{} request failed: {}", self.fallback.source_name(), e);
                error!("Unable to obtain public IP address from external services");
                Err(Error::ip_lookup(format!(
                    "{}: {}; {}: {}",
                    self.primary.source_name(),
                    primary_err,
                    self.fallback.source_name(),
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        answer: Option<Ipv4Addr>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl IpSource for FixedSource {
        async fn current(&self) -> Result<Ipv4Addr> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.ok_or_else(|| Error::http("connection refused"))
        }

        fn source_name(&self) -> &str {
            "fixed"
        }
    }

    fn source(answer: Option<Ipv4Addr>) -> (Box<dyn IpSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(FixedSource {
                answer,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn test_primary_answer_skips_fallback() {
        let (primary, _) = source(Some(Ipv4Addr::new(1, 2, 3, 4)));
        let (fallback, fallback_calls) = source(Some(Ipv4Addr::new(9, 9, 9, 9)));

        let ip = IpResolver::new(primary, fallback).resolve().await.unwrap();

        assert_eq!(ip, Ipv4Addr::new(1, 2, 3, 4));
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_both_failing_is_fatal() {
        let (primary, primary_calls) = source(None);
        let (fallback, fallback_calls) = source(None);

        let err = IpResolver::new(primary, fallback).resolve().await.unwrap_err();

        assert!(matches!(err, Error::IpLookup(_)));
        assert!(err.is_fatal());
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }
}
