//! Gossip partner selection.
//!
//! Self is excluded by exact identity: a record is ours if it carries our
//! id or our exact advertised address (a stale registration under an old
//! id). Other nodes sharing our IP stay eligible.

use rand::Rng;

use coordinet_common::PeerRecord;

use crate::identity::NodeIdentity;

/// Every listed node except ourselves
pub fn candidates<'a>(peers: &'a [PeerRecord], me: &NodeIdentity) -> Vec<&'a PeerRecord> {
    peers
        .iter()
        .filter(|peer| peer.id != me.id && peer.address != me.address)
        .collect()
}

/// Pick one candidate uniformly at random, or `None` if we are alone
pub fn select_peer<'a, G: Rng>(
    peers: &'a [PeerRecord],
    me: &NodeIdentity,
    rng: &mut G,
) -> Option<&'a PeerRecord> {
    let candidates = candidates(peers, me);
    if candidates.is_empty() {
        return None;
    }
    let index = rng.random_range(0..candidates.len());
    Some(candidates[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinet_common::Position;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn me() -> NodeIdentity {
        NodeIdentity::new("node1", "10.0.0.1".parse().unwrap(), 8001)
    }

    fn peer(id: &str, address: &str, ip: &str) -> PeerRecord {
        PeerRecord::new(id, address, ip, Position::ORIGIN)
    }

    #[test]
    fn test_excludes_self_by_id() {
        let peers = vec![
            peer("node1", "10.0.0.1:8001", "10.0.0.1"),
            peer("node2", "10.0.0.2:8002", "10.0.0.2"),
        ];
        let found = candidates(&peers, &me());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "node2");
    }

    #[test]
    fn test_excludes_self_under_another_id() {
        let peers = vec![peer("old-name", "10.0.0.1:8001", "10.0.0.1")];
        assert!(candidates(&peers, &me()).is_empty());
    }

    #[test]
    fn test_ip_prefix_is_not_self() {
        // 10.0.0.1 is a prefix of 10.0.0.12
        let peers = vec![peer("node12", "10.0.0.12:8012", "10.0.0.12")];
        assert_eq!(candidates(&peers, &me()).len(), 1);
    }

    #[test]
    fn test_colocated_node_is_a_candidate() {
        let peers = vec![peer("node2", "10.0.0.1:8002", "10.0.0.1")];
        assert_eq!(candidates(&peers, &me()).len(), 1);
    }

    #[test]
    fn test_alone_selects_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_peer(&[], &me(), &mut rng).is_none());

        let only_self = vec![peer("node1", "10.0.0.1:8001", "10.0.0.1")];
        assert!(select_peer(&only_self, &me(), &mut rng).is_none());
    }

    #[test]
    fn test_single_candidate_always_chosen() {
        let peers = vec![
            peer("node1", "10.0.0.1:8001", "10.0.0.1"),
            peer("node2", "10.0.0.2:8002", "10.0.0.2"),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            assert_eq!(select_peer(&peers, &me(), &mut rng).unwrap().id, "node2");
        }
    }

    #[test]
    fn test_seeded_selection_is_deterministic() {
        let peers: Vec<_> = (2..8)
            .map(|i| {
                let ip = format!("10.0.0.{i}");
                peer(&format!("node{i}"), &format!("{ip}:800{i}"), &ip)
            })
            .collect();

        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| select_peer(&peers, &me(), &mut rng).unwrap().id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(123), pick(123));
    }

    #[test]
    fn test_selection_covers_all_candidates() {
        let peers = vec![
            peer("node2", "10.0.0.2:8002", "10.0.0.2"),
            peer("node3", "10.0.0.3:8003", "10.0.0.3"),
            peer("node4", "10.0.0.4:8004", "10.0.0.4"),
        ];
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..3_000 {
            let chosen = select_peer(&peers, &me(), &mut rng).unwrap();
            *counts.entry(chosen.id.clone()).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        for (id, count) in counts {
            assert!((800..1200).contains(&count), "{id} chosen {count} times");
        }
    }
}
