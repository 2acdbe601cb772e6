//! Multi-Source Message Reconciliation
//!
//! Combines message lists from independent stores into one ordered,
//! duplicate-free conversation without a central authority. For the same
//! dedup key, the later-arriving copy overwrites the earlier one
//! (last-write-wins by arrival order, not by timestamp) — messages are
//! immutable once sent, so the copies only ever differ in transport
//! artifacts. The final ordering is ascending by timestamp with the dedup
//! key as tie-break, which makes it independent of merge order.

use std::collections::HashMap;

use super::message::ChatMessage;

/// Merge any number of partial message lists into one deduplicated,
/// timestamp-ordered conversation.
pub fn merge_sources<I>(sources: I) -> Vec<ChatMessage>
where
    I: IntoIterator<Item = Vec<ChatMessage>>,
{
    let mut by_key: HashMap<String, ChatMessage> = HashMap::new();

    for source in sources {
        for message in source {
            by_key.insert(message.dedup_key(), message);
        }
    }

    let mut merged: Vec<(String, ChatMessage)> = by_key.into_iter().collect();
    merged.sort_by(|(ka, a), (kb, b)| a.timestamp.cmp(&b.timestamp).then_with(|| ka.cmp(kb)));
    merged.into_iter().map(|(_, m)| m).collect()
}

/// Merge two lists; convenience for the common local+remote case.
pub fn merge_two(first: Vec<ChatMessage>, second: Vec<ChatMessage>) -> Vec<ChatMessage> {
    merge_sources([first, second])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, sender: &str, content: &str, timestamp: i64) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            sender: sender.to_string(),
            content: content.to_string(),
            timestamp,
        }
    }

    #[test]
    fn merge_is_idempotent() {
        let list = vec![
            msg("m1", "0xaa", "hello", 1_000),
            msg("m2", "0xbb", "hi", 2_000),
        ];

        let once = merge_sources([list.clone()]);
        let twice = merge_sources([list.clone(), list]);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_order_does_not_change_final_sequence() {
        let local = vec![
            msg("m1", "0xaa", "hello", 1_000),
            msg("m3", "0xaa", "anyone?", 5_000),
        ];
        let remote = vec![
            msg("m2", "0xbb", "hi", 2_000),
            msg("m4", "0xbb", "here", 6_000),
        ];

        let ab = merge_two(local.clone(), remote.clone());
        let ba = merge_two(remote, local);
        assert_eq!(ab, ba);
        assert_eq!(
            ab.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["m1", "m2", "m3", "m4"]
        );
    }

    #[test]
    fn near_simultaneous_duplicates_collapse() {
        // Same message written by two stores that both dropped the id,
        // with slightly different observed timestamps in one bucket
        let a = vec![msg("", "0xaa", "hello", 1_700_000_001_000)];
        let b = vec![msg("", "0xaa", "hello", 1_700_000_004_000)];

        let merged = merge_two(a, b);
        assert_eq!(merged.len(), 1);
        // LWW by arrival: the second store's copy survives
        assert_eq!(merged[0].timestamp, 1_700_000_004_000);
    }

    #[test]
    fn later_arrival_overwrites_same_key() {
        let first = vec![msg("m1", "0xaa", "hello", 1_000)];
        // Same id resurfacing from a backup with a transport-mangled
        // timestamp; arrival order decides
        let second = vec![msg("m1", "0xaa", "hello", 1_500)];

        let merged = merge_two(first, second);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].timestamp, 1_500);
    }

    #[test]
    fn output_sorted_by_timestamp() {
        let shuffled = vec![
            msg("m3", "0xaa", "three", 3_000),
            msg("m1", "0xaa", "one", 1_000),
            msg("m2", "0xbb", "two", 2_000),
        ];

        let merged = merge_sources([shuffled]);
        let times: Vec<i64> = merged.iter().map(|m| m.timestamp).collect();
        assert_eq!(times, vec![1_000, 2_000, 3_000]);
    }

    #[test]
    fn empty_sources_are_fine() {
        assert!(merge_sources(Vec::<Vec<ChatMessage>>::new()).is_empty());
        assert!(merge_two(Vec::new(), Vec::new()).is_empty());

        let one = vec![msg("m1", "0xaa", "hello", 1_000)];
        assert_eq!(merge_two(one.clone(), Vec::new()), one);
    }
}
