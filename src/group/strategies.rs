//! # Startup strategies for static groups.
//!
//! An [`Init`] drives a pool while it is still dynamic. When it returns, the
//! static group closes the pool and reports ready.
//!
//! | Strategy     | Next member starts when...             | Aborts when...                          |
//! |--------------|----------------------------------------|-----------------------------------------|
//! | [`Parallel`] | immediately                            | the pool closes                         |
//! | [`Ordered`]  | the previous member entered            | the previous member never became ready  |
//! | [`Serial`]   | the previous member exited cleanly     | the previous member failed              |
//!
//! [`StaticGroup::queue_ordered`](crate::StaticGroup::queue_ordered) starts
//! with [`Ordered`] and stops members in start order.

use async_trait::async_trait;

use crate::group::{DynamicClient, Member};

/// Drives a pool during static-group startup.
///
/// Implement it for custom startup orders and pass it to
/// [`StaticGroup::new`](crate::StaticGroup::new).
#[async_trait]
pub trait Init: Send + Sync + 'static {
    /// Inserts `members` through `client`; returns when startup is complete or aborted.
    async fn init(&self, members: &[Member], client: &DynamicClient);
}

/// Starts every member at once; ready once all of them have entered.
#[derive(Clone, Copy, Debug, Default)]
pub struct Parallel;

#[async_trait]
impl Init for Parallel {
    async fn init(&self, members: &[Member], client: &DynamicClient) {
        let mut entrances = client.entrance_listener();
        let mut inserted = 0usize;

        for member in members {
            if client.insert(member.clone()).await.is_err() {
                return;
            }
            inserted += 1;
        }
        client.close();

        let mut entered = 0usize;
        while entered < inserted {
            if entrances.recv().await.is_none() {
                break;
            }
            entered += 1;
        }
    }
}

/// Starts each member once the previous one is ready.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ordered;

#[async_trait]
impl Init for Ordered {
    async fn init(&self, members: &[Member], client: &DynamicClient) {
        let mut entrances = client.entrance_listener();

        for member in members {
            if client.insert(member.clone()).await.is_err() {
                return;
            }
            match entrances.recv().await {
                Some(entrance) if entrance.process.is_ready() => {}
                Some(entrance) => {
                    tracing::debug!(
                        member = entrance.member.name(),
                        "member exited before ready; ordered start aborted"
                    );
                    return;
                }
                None => return,
            }
        }
    }
}

/// Starts each member once the previous one exited cleanly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Serial;

#[async_trait]
impl Init for Serial {
    async fn init(&self, members: &[Member], client: &DynamicClient) {
        let mut exits = client.exit_listener();

        for member in members {
            if client.insert(member.clone()).await.is_err() {
                return;
            }
            match exits.recv().await {
                Some(exit) if exit.result.is_ok() => {}
                Some(exit) => {
                    tracing::debug!(member = exit.member.name(), "member failed; serial run aborted");
                    return;
                }
                None => return,
            }
        }
    }
}
