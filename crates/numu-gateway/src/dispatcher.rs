use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use numu_core::Notice;
use numu_types::events::GatewayEvent;
use numu_types::models::Booking;

type UserSender = mpsc::UnboundedSender<GatewayEvent>;

/// Routes events to the connections of the users they are addressed to.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

#[derive(Default)]
struct DispatcherInner {
    /// user_id -> [(conn_id, sender)], one entry per open socket
    user_channels: RwLock<HashMap<Uuid, Vec<(Uuid, UserSender)>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user_id`. Returns (conn_id, receiver).
    pub async fn register_user_channel(
        &self,
        user_id: Uuid,
    ) -> (Uuid, mpsc::UnboundedReceiver<GatewayEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .user_channels
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push((conn_id, tx));
        (conn_id, rx)
    }

    pub async fn unregister_user_channel(&self, user_id: Uuid, conn_id: Uuid) {
        let mut channels = self.inner.user_channels.write().await;
        if let Some(conns) = channels.get_mut(&user_id) {
            conns.retain(|(id, _)| *id != conn_id);
            if conns.is_empty() {
                channels.remove(&user_id);
            }
        }
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.inner.user_channels.read().await.contains_key(&user_id)
    }

    /// Send to every open connection of `user_id`. Offline users get
    /// nothing; their feed still holds the notification.
    pub async fn send_to_user(&self, user_id: Uuid, event: GatewayEvent) {
        let channels = self.inner.user_channels.read().await;
        if let Some(conns) = channels.get(&user_id) {
            for (_, tx) in conns {
                let _ = tx.send(event.clone());
            }
        }
    }

    pub async fn deliver(&self, notices: Vec<Notice>) {
        for notice in notices {
            self.send_to_user(
                notice.user_id,
                GatewayEvent::NotificationCreate {
                    notification: notice.notification,
                },
            )
            .await;
        }
    }

    /// Tell both parties that `booking` moved to its current status.
    pub async fn booking_changed(&self, booking: &Booking) {
        for user_id in [booking.renter.id, booking.owner.id] {
            self.send_to_user(
                user_id,
                GatewayEvent::BookingStatusChanged {
                    booking_id: booking.id,
                    status: booking.status,
                },
            )
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use numu_types::models::{Notification, NotificationKind};

    use super::*;

    fn notice(user_id: Uuid) -> Notice {
        Notice {
            user_id,
            notification: Notification {
                id: Uuid::new_v4(),
                kind: NotificationKind::System,
                title: "t".into(),
                message: "m".into(),
                is_read: false,
                created_at: Utc::now(),
                link: None,
            },
        }
    }

    #[tokio::test]
    async fn deliver_reaches_every_connection_of_the_user_only() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let (_, mut first) = dispatcher.register_user_channel(user).await;
        let (_, mut second) = dispatcher.register_user_channel(user).await;
        let (_, mut bystander) = dispatcher.register_user_channel(other).await;

        dispatcher.deliver(vec![notice(user)]).await;

        assert!(matches!(first.try_recv(), Ok(GatewayEvent::NotificationCreate { .. })));
        assert!(matches!(second.try_recv(), Ok(GatewayEvent::NotificationCreate { .. })));
        assert!(bystander.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_only_drops_that_connection() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();
        let (old, _old_rx) = dispatcher.register_user_channel(user).await;
        let (_, mut current) = dispatcher.register_user_channel(user).await;

        dispatcher.unregister_user_channel(user, old).await;
        assert!(dispatcher.is_online(user).await);

        dispatcher.deliver(vec![notice(user)]).await;
        assert!(current.try_recv().is_ok());
    }

    #[tokio::test]
    async fn last_unregister_takes_user_offline() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();
        let (conn, _rx) = dispatcher.register_user_channel(user).await;
        dispatcher.unregister_user_channel(user, conn).await;
        assert!(!dispatcher.is_online(user).await);
        // Sending to an offline user is a no-op.
        dispatcher.deliver(vec![notice(user)]).await;
    }
}
