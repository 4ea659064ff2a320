//! Violation reports
//!
//! A blocked action produces one message for the player who tried it and one
//! audit message for every connected administrator.

use crate::host::{Actor, Notifier};
use crate::logging;
use crate::registry::Purpose;
use chrono::{DateTime, Utc};

/// A single blocked use of a banned material
#[derive(Debug, Clone)]
pub struct ViolationReport {
    pub actor: Actor,
    pub purpose: Purpose,
    /// Display name of the material
    pub resource: String,
    pub at: DateTime<Utc>,
}

impl ViolationReport {
    pub fn new(actor: Actor, purpose: Purpose, resource: impl Into<String>) -> Self {
        Self {
            actor,
            purpose,
            resource: resource.into(),
            at: Utc::now(),
        }
    }

    /// Message for the offending player
    #[must_use]
    pub fn player_message(&self) -> String {
        format!("You cannot {} {}!", self.purpose.activity(), self.resource)
    }

    /// Audit message for administrators
    #[must_use]
    pub fn admin_message(&self) -> String {
        format!(
            "{} tried to {} {}!",
            self.actor.name,
            self.purpose.activity(),
            self.resource
        )
    }

    /// Send both messages and log the violation. Returns how many
    /// administrators received the audit message; zero is not an error.
    pub async fn deliver(&self, notifier: &dyn Notifier) -> usize {
        let player_message = self.player_message();
        let admin_message = self.admin_message();

        notifier.send_to_actor(self.actor.id, &player_message).await;
        let admins = notifier.broadcast_to_admins(&admin_message).await;

        logging::log_violation(self, admins);
        admins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ActorId, MockNotifier};
    use mockall::predicate::eq;

    fn report() -> ViolationReport {
        ViolationReport::new(
            Actor::new(ActorId::new_random(), "Alex"),
            Purpose::SmeltFueling,
            "Lava Bucket",
        )
    }

    #[test]
    fn test_messages() {
        let report = report();
        assert_eq!(
            report.player_message(),
            "You cannot fuel a furnace with Lava Bucket!"
        );
        assert_eq!(
            report.admin_message(),
            "Alex tried to fuel a furnace with Lava Bucket!"
        );
    }

    #[tokio::test]
    async fn test_deliver_to_actor_and_admins() {
        let report = report();
        let actor_id = report.actor.id;

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_to_actor()
            .with(eq(actor_id), eq("You cannot fuel a furnace with Lava Bucket!"))
            .times(1)
            .returning(|_, _| ());
        notifier
            .expect_broadcast_to_admins()
            .with(eq("Alex tried to fuel a furnace with Lava Bucket!"))
            .times(1)
            .returning(|_| 2);

        assert_eq!(report.deliver(&notifier).await, 2);
    }

    #[tokio::test]
    async fn test_deliver_without_admins_online() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send_to_actor().times(1).returning(|_, _| ());
        notifier
            .expect_broadcast_to_admins()
            .times(1)
            .returning(|_| 0);

        assert_eq!(report().deliver(&notifier).await, 0);
    }
}
