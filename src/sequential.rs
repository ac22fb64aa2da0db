//! Sequential mapping with an inter-step delay.
//!
//! The aggregation routines all walk a list one request at a time, pausing
//! between steps so a single pipeline never bursts past the node's limit.
//! What happens when one step fails is the caller's choice.

use std::fmt::Display;
use std::future::Future;
use tokio::time::{sleep, Duration};

/// Per-step failure policy.
pub enum OnFailure<'a, I, T> {
    /// Log and drop the item.
    Skip,
    /// Log and emit a replacement built from the item.
    Substitute(&'a (dyn Fn(&I) -> T + Send + Sync)),
    /// Stop and hand the error back.
    Abort,
}

#[derive(Debug, Clone)]
pub struct Sequential<'a> {
    label: &'a str,
    delay: Duration,
    stop_after: Option<usize>,
}

impl<'a> Sequential<'a> {
    pub fn new(label: &'a str, delay: Duration) -> Self {
        Self {
            label,
            delay,
            stop_after: None,
        }
    }

    /// Stop once `n` outputs are collected.
    pub fn stop_after(mut self, n: usize) -> Self {
        self.stop_after = Some(n);
        self
    }

    pub async fn run<I, T, E, F, Fut>(
        &self,
        items: Vec<I>,
        on_failure: OnFailure<'_, I, T>,
        mut step: F,
    ) -> Result<Vec<T>, E>
    where
        I: Clone,
        E: Display,
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut out = Vec::with_capacity(self.stop_after.unwrap_or(items.len()).min(items.len()));
        if self.stop_after == Some(0) {
            return Ok(out);
        }
        let total = items.len();

        for (index, item) in items.into_iter().enumerate() {
            match step(item.clone()).await {
                Ok(v) => out.push(v),
                Err(e) => match &on_failure {
                    OnFailure::Skip => {
                        log::warn!(
                            "[stellarx][{}] step {}/{} failed, skipping: {}",
                            self.label,
                            index + 1,
                            total,
                            e
                        );
                    }
                    OnFailure::Substitute(make) => {
                        log::warn!(
                            "[stellarx][{}] step {}/{} failed, substituting: {}",
                            self.label,
                            index + 1,
                            total,
                            e
                        );
                        out.push(make(&item));
                    }
                    OnFailure::Abort => return Err(e),
                },
            }

            if self.stop_after.is_some_and(|n| out.len() >= n) {
                break;
            }
            if index + 1 < total && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn even_only(n: u32) -> std::future::Ready<Result<u32, String>> {
        std::future::ready(if n % 2 == 0 {
            Ok(n * 10)
        } else {
            Err(format!("odd {n}"))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_policy_drops_failures() {
        let seq = Sequential::new("test", Duration::from_millis(100));
        let start = Instant::now();
        let out = seq
            .run(vec![1, 2, 3, 4], OnFailure::Skip, even_only)
            .await
            .unwrap();
        assert_eq!(out, vec![20, 40]);
        // three gaps between four steps
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_substitute_policy_keeps_length() {
        let sub = |n: &u32| *n;
        let out = Sequential::new("test", Duration::ZERO)
            .run(vec![1, 2, 3], OnFailure::Substitute(&sub), even_only)
            .await
            .unwrap();
        assert_eq!(out, vec![1, 20, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_policy_returns_error() {
        let err = Sequential::new("test", Duration::ZERO)
            .run(vec![2, 3, 4], OnFailure::Abort, even_only)
            .await
            .unwrap_err();
        assert_eq!(err, "odd 3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_after_limits_steps() {
        let mut calls = 0;
        let start = Instant::now();
        let out = Sequential::new("test", Duration::from_millis(100))
            .stop_after(2)
            .run(vec![2, 4, 6, 8], OnFailure::Skip, |n| {
                calls += 1;
                even_only(n)
            })
            .await
            .unwrap();
        assert_eq!(out, vec![20, 40]);
        assert_eq!(calls, 2);
        assert_eq!(start.elapsed(), Duration::from_millis(100));
    }
}
