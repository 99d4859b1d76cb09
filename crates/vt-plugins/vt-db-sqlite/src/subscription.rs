use async_trait::async_trait;
use uuid::Uuid;
use vt_core::{Subscription, SubscriptionRepo, UserSummary};

use crate::{ts, SqliteStore};

#[async_trait]
impl SubscriptionRepo for SqliteStore {
    async fn toggle_subscription(&self, subscription: Subscription) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM subscriptions WHERE subscriber = ? AND channel = ?")
            .bind(subscription.subscriber)
            .bind(subscription.channel)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO subscriptions (id, subscriber, channel, created_at) VALUES (?, ?, ?, ?) \
                 ON CONFLICT (subscriber, channel) DO NOTHING",
            )
            .bind(subscription.id)
            .bind(subscription.subscriber)
            .bind(subscription.channel)
            .bind(ts(subscription.created_at))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(removed == 0)
    }

    async fn subscribers(&self, channel: Uuid) -> anyhow::Result<Vec<UserSummary>> {
        let rows: Vec<(Uuid, String, String)> = sqlx::query_as(
            "SELECT u.id, u.username, u.avatar FROM subscriptions AS s \
             JOIN users AS u ON u.id = s.subscriber \
             WHERE s.channel = ? ORDER BY s.created_at DESC, s.id DESC",
        )
        .bind(channel)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(summary).collect())
    }

    async fn subscribed_channels(&self, subscriber: Uuid) -> anyhow::Result<Vec<UserSummary>> {
        let rows: Vec<(Uuid, String, String)> = sqlx::query_as(
            "SELECT u.id, u.username, u.avatar FROM subscriptions AS s \
             JOIN users AS u ON u.id = s.channel \
             WHERE s.subscriber = ? ORDER BY s.created_at DESC, s.id DESC",
        )
        .bind(subscriber)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(summary).collect())
    }
}

fn summary((id, username, avatar): (Uuid, String, String)) -> UserSummary {
    UserSummary {
        id,
        username,
        avatar,
    }
}
