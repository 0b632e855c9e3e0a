//! The registry's entry set.

use chrono::{DateTime, TimeDelta, Utc};
use coordinet_common::{CoordinetError, PeerRecord, Position};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// A registered node
#[derive(Debug, Clone)]
pub struct NodeInfo {
    /// Unique node identifier
    pub id: String,
    /// Advertised `ip:port`
    pub address: String,
    /// Source IP reported by the node
    pub ip: String,
    /// Last register or heartbeat (monotonic, drives eviction)
    pub last_seen: Instant,
    /// First registration (wall clock); kept across re-registrations
    pub registered_at: DateTime<Utc>,
    /// Last reported position
    pub position: Position,
}

impl NodeInfo {
    pub fn to_record(&self) -> PeerRecord {
        PeerRecord::new(&self.id, &self.address, &self.ip, self.position)
    }

    /// Time since first registration
    pub fn membership(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.registered_at)
    }
}

/// Membership registry. One lock guards the whole entry set; every
/// operation, including the sweep, holds it for its full critical section.
pub struct Registry {
    nodes: Mutex<BTreeMap<String, NodeInfo>>,
    ttl: Duration,
}

impl Registry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            nodes: Mutex::new(BTreeMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or overwrite the entry for `id`
    pub async fn register(&self, id: &str, address: &str, ip: &str, position: Position) {
        self.register_at(id, address, ip, position, Instant::now()).await
    }

    pub(crate) async fn register_at(
        &self,
        id: &str,
        address: &str,
        ip: &str,
        position: Position,
        now: Instant,
    ) {
        let mut nodes = self.nodes.lock().await;
        let wall_now = Utc::now();

        let registered_at = match nodes.get(id) {
            Some(existing) => {
                tracing::info!(
                    node = %id,
                    registered_at = %existing.registered_at.to_rfc3339(),
                    member_secs = existing.membership(wall_now).num_seconds(),
                    "Node re-registered"
                );
                existing.registered_at
            }
            None => wall_now,
        };

        nodes.insert(
            id.to_string(),
            NodeInfo {
                id: id.to_string(),
                address: address.to_string(),
                ip: ip.to_string(),
                last_seen: now,
                registered_at,
                position,
            },
        );

        tracing::info!(
            node = %id,
            address = %address,
            ip = %ip,
            position = ?position,
            "Node registered"
        );
    }

    /// Refresh `last_seen` and store the reported position
    pub async fn heartbeat(&self, id: &str, position: Position) -> Result<(), CoordinetError> {
        self.heartbeat_at(id, position, Instant::now()).await
    }

    pub(crate) async fn heartbeat_at(
        &self,
        id: &str,
        position: Position,
        now: Instant,
    ) -> Result<(), CoordinetError> {
        let mut nodes = self.nodes.lock().await;

        let node = nodes
            .get_mut(id)
            .ok_or_else(|| CoordinetError::NotFound(id.to_string()))?;

        node.last_seen = now;
        node.position = position;

        tracing::debug!(node = %id, position = ?position, "Node pinged");
        Ok(())
    }

    /// Point-in-time snapshot of every entry, ordered by id
    pub async fn list_active(&self) -> Vec<PeerRecord> {
        let nodes = self.nodes.lock().await;
        nodes.values().map(NodeInfo::to_record).collect()
    }

    pub async fn get(&self, id: &str) -> Option<NodeInfo> {
        self.nodes.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.nodes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.lock().await.is_empty()
    }

    /// Remove entries not refreshed within the TTL. Returns evicted ids.
    pub async fn evict_stale(&self) -> Vec<String> {
        self.evict_stale_at(Instant::now()).await
    }

    pub(crate) async fn evict_stale_at(&self, now: Instant) -> Vec<String> {
        let mut nodes = self.nodes.lock().await;
        let ttl = self.ttl;

        let stale: Vec<String> = nodes
            .values()
            .filter(|node| now.saturating_duration_since(node.last_seen) > ttl)
            .map(|node| node.id.clone())
            .collect();

        let wall_now = Utc::now();
        for id in &stale {
            if let Some(node) = nodes.remove(id) {
                tracing::info!(
                    node = %id,
                    registered_at = %node.registered_at.to_rfc3339(),
                    member_secs = node.membership(wall_now).num_seconds(),
                    "Node removed due to inactivity"
                );
            }
        }

        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_heartbeat_unknown_node_is_not_found() {
        let registry = Registry::new(TTL);
        let result = registry.heartbeat("ghost", Position::ORIGIN).await;
        assert!(matches!(result, Err(CoordinetError::NotFound(id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_register_then_heartbeat() {
        let registry = Registry::new(TTL);
        registry.register("n1", "h1:8001", "10.0.0.1", Position::ORIGIN).await;

        assert_ok!(registry.heartbeat("n1", Position::new(3.0, 4.0, 0.5)).await);

        let node = registry.get("n1").await.unwrap();
        assert_eq!(node.position, Position::new(3.0, 4.0, 0.5));
    }

    #[tokio::test]
    async fn test_register_overwrites() {
        let registry = Registry::new(TTL);
        registry.register("n1", "h1:8001", "10.0.0.1", Position::ORIGIN).await;
        let first = registry.get("n1").await.unwrap();

        registry
            .register("n1", "h9:8001", "10.0.0.9", Position::new(1.0, 1.0, 1.0))
            .await;
        let second = registry.get("n1").await.unwrap();

        assert_eq!(registry.len().await, 1);
        assert_eq!(second.address, "h9:8001");
        assert_eq!(second.ip, "10.0.0.9");
        assert_eq!(second.registered_at, first.registered_at);
        assert!(second.last_seen >= first.last_seen);
    }

    #[tokio::test]
    async fn test_list_active_snapshot_is_idempotent() {
        let registry = Registry::new(TTL);
        registry
            .register("n2", "h2:8002", "10.0.0.2", Position::new(1.0, 0.0, 0.0))
            .await;
        registry.register("n1", "h1:8001", "10.0.0.1", Position::ORIGIN).await;

        let first = registry.list_active().await;
        let second = registry.list_active().await;

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, "n1");
        assert_eq!(first[1].id, "n2");
    }

    #[tokio::test]
    async fn test_stale_entry_evicted() {
        let registry = Registry::new(TTL);
        registry.register("n1", "h1:8001", "10.0.0.1", Position::ORIGIN).await;

        let later = Instant::now() + TTL + Duration::from_secs(1);
        let evicted = registry.evict_stale_at(later).await;

        assert_eq!(evicted, vec!["n1".to_string()]);
        assert!(registry.list_active().await.is_empty());
        assert_err!(registry.heartbeat("n1", Position::ORIGIN).await);
    }

    #[tokio::test]
    async fn test_fresh_entry_survives_sweeps() {
        let registry = Registry::new(TTL);
        let start = Instant::now();
        registry.register_at("n1", "h1:8001", "10.0.0.1", Position::ORIGIN, start).await;
        registry.register_at("n2", "h2:8002", "10.0.0.2", Position::ORIGIN, start).await;

        // n1 heartbeats every 15s for ten minutes; n2 goes silent
        let period = Duration::from_secs(15);
        let mut now = start;
        for round in 1..=40 {
            now += period;
            assert_ok!(registry.heartbeat_at("n1", Position::ORIGIN, now).await);
            let evicted = registry.evict_stale_at(now).await;
            if round == 5 {
                // 75s since n2's registration
                assert_eq!(evicted, vec!["n2".to_string()]);
            } else {
                assert!(evicted.is_empty(), "round {round} evicted {evicted:?}");
            }
        }

        let remaining = registry.list_active().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "n1");
    }

    #[tokio::test]
    async fn test_entry_at_exactly_ttl_survives() {
        let registry = Registry::new(TTL);
        let start = Instant::now();
        registry.register_at("n1", "h1:8001", "10.0.0.1", Position::ORIGIN, start).await;

        assert!(registry.evict_stale_at(start + TTL).await.is_empty());
        let just_after = start + TTL + Duration::from_millis(1);
        assert_eq!(registry.evict_stale_at(just_after).await.len(), 1);
    }

    #[tokio::test]
    async fn test_membership_counts_from_first_registration() {
        let registry = Registry::new(TTL);
        registry.register("n1", "h1:8001", "10.0.0.1", Position::ORIGIN).await;
        let first = registry.get("n1").await.unwrap();

        registry.register("n1", "h1:8001", "10.0.0.1", Position::ORIGIN).await;
        let again = registry.get("n1").await.unwrap();

        let later = first.registered_at + TimeDelta::seconds(90);
        assert_eq!(again.membership(later), TimeDelta::seconds(90));
        assert!(again.membership(Utc::now()) >= TimeDelta::zero());
    }
}
