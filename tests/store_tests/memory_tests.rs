//! MemoryStore Tests
//!
//! Tests verify:
//! - set/add/replace conditions and statuses
//! - get/get_multi hits and misses
//! - incr/decr counter semantics
//! - TTL expiry
//! - Behavior with no active servers
//! - Statistics
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tagcache::store::{ByteStore, MemoryStore, ServerSpec, StoreStatus};
use tagcache::{Tag, TagCacheError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store() -> MemoryStore {
    MemoryStore::with_servers(vec![ServerSpec::parse("127.0.0.1:11211").unwrap()])
}

fn payload_of(store: &MemoryStore, key: &str) -> Option<Vec<u8>> {
    store.get(key).unwrap().map(|entry| entry.payload.to_vec())
}

// =============================================================================
// Storage Command Tests
// =============================================================================

#[test]
fn test_set_and_get_keeps_tag() {
    let store = setup_store();

    let status = store.set("blo", b"42", Tag::SMALL_INTEGER, 0).unwrap();
    assert_eq!(status, StoreStatus::Stored);

    let entry = store.get("blo").unwrap().unwrap();
    assert_eq!(entry.payload.as_ref(), b"42");
    assert_eq!(entry.tag, Tag::SMALL_INTEGER);
}

#[test]
fn test_set_overwrites() {
    let store = setup_store();

    store.set("blo", b"first", Tag::TEXT, 0).unwrap();
    store.set("blo", b"second", Tag::TEXT, 0).unwrap();

    assert_eq!(payload_of(&store, "blo"), Some(b"second".to_vec()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_add_only_when_absent() {
    let store = setup_store();

    assert_eq!(store.add("blo", b"will be set", Tag::TEXT, 0).unwrap(), StoreStatus::Stored);
    assert_eq!(
        store.add("blo", b"will be NOT set", Tag::TEXT, 0).unwrap(),
        StoreStatus::NotStored
    );
    assert_eq!(payload_of(&store, "blo"), Some(b"will be set".to_vec()));
}

#[test]
fn test_replace_only_when_present() {
    let store = setup_store();

    assert_eq!(
        store.replace("blo", b"will NOT be set", Tag::TEXT, 0).unwrap(),
        StoreStatus::NotStored
    );
    assert_eq!(payload_of(&store, "blo"), None);

    store.set("blo", b"blu", Tag::TEXT, 0).unwrap();
    assert_eq!(store.replace("blo", b"replace", Tag::TEXT, 0).unwrap(), StoreStatus::Stored);
    assert_eq!(payload_of(&store, "blo"), Some(b"replace".to_vec()));
}

#[test]
fn test_delete() {
    let store = setup_store();

    store.set("blo", b"blu", Tag::TEXT, 0).unwrap();
    assert_eq!(store.delete("blo").unwrap(), StoreStatus::Deleted);
    assert_eq!(store.delete("blo").unwrap(), StoreStatus::NotFound);
    assert_eq!(payload_of(&store, "blo"), None);
}

#[test]
fn test_invalid_keys_rejected() {
    let store = setup_store();

    assert!(matches!(
        store.set("has space", b"x", Tag::TEXT, 0),
        Err(TagCacheError::InvalidKey(_))
    ));
    assert!(matches!(store.get(""), Err(TagCacheError::InvalidKey(_))));
    assert!(matches!(
        store.get_multi(&["ok", "not ok"]),
        Err(TagCacheError::InvalidKey(_))
    ));
}

// =============================================================================
// Retrieval Tests
// =============================================================================

#[test]
fn test_get_multi_omits_missing_keys() {
    let store = setup_store();

    store.set("blo", b"bli", Tag::TEXT, 0).unwrap();
    store.set("number", b"6", Tag::TEXT, 0).unwrap();

    let found = store.get_multi(&["blo", "number", "doesnotexist"]).unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found["blo"].payload.as_ref(), b"bli");
    assert_eq!(found["number"].payload.as_ref(), b"6");
    assert!(!found.contains_key("doesnotexist"));
}

#[test]
fn test_binary_payload_preserved() {
    let store = setup_store();
    let payload: Vec<u8> = (0..=255).collect();

    store.set("binary", &payload, Tag::TEXT, 0).unwrap();
    assert_eq!(payload_of(&store, "binary"), Some(payload));
}

// =============================================================================
// Counter Tests
// =============================================================================

#[test]
fn test_incr_decr() {
    let store = setup_store();

    store.set("number", b"5", Tag::TEXT, 0).unwrap();
    assert_eq!(store.incr("number", 3).unwrap(), Some(8));
    assert_eq!(store.decr("number", 2).unwrap(), Some(6));
    assert_eq!(payload_of(&store, "number"), Some(b"6".to_vec()));
}

#[test]
fn test_counter_keeps_tag() {
    let store = setup_store();

    store.set("counter", b"10", Tag::SMALL_INTEGER, 0).unwrap();
    store.incr("counter", 1).unwrap();

    assert_eq!(store.get("counter").unwrap().unwrap().tag, Tag::SMALL_INTEGER);
}

#[test]
fn test_decr_floors_at_zero() {
    let store = setup_store();

    store.set("counter", b"1", Tag::TEXT, 0).unwrap();
    assert_eq!(store.decr("counter", 2).unwrap(), Some(0));
}

#[test]
fn test_incr_wraps_at_u64() {
    let store = setup_store();

    store.set("counter", u64::MAX.to_string().as_bytes(), Tag::TEXT, 0).unwrap();
    assert_eq!(store.incr("counter", 2).unwrap(), Some(1));
}

#[test]
fn test_counter_on_missing_key() {
    let store = setup_store();

    assert_eq!(store.incr("missing", 1).unwrap(), None);
    assert_eq!(store.decr("missing", 1).unwrap(), None);
}

#[test]
fn test_counter_on_non_numeric_value() {
    let store = setup_store();

    store.set("word", b"bli", Tag::TEXT, 0).unwrap();
    assert_eq!(store.incr("word", 1).unwrap(), None);
    assert_eq!(store.decr("word", 1).unwrap(), None);

    // The value itself is left alone
    assert_eq!(payload_of(&store, "word"), Some(b"bli".to_vec()));
}

// =============================================================================
// Expiry Tests
// =============================================================================

#[test]
fn test_ttl_expiry() {
    let store = setup_store();

    store.set("short", b"lived", Tag::TEXT, 1).unwrap();
    store.set("forever", b"lived", Tag::TEXT, 0).unwrap();
    assert!(store.get("short").unwrap().is_some());

    thread::sleep(Duration::from_millis(1100));

    assert!(store.get("short").unwrap().is_none());
    assert!(store.get("forever").unwrap().is_some());

    // An expired key counts as absent for add
    assert_eq!(store.add("short", b"again", Tag::TEXT, 0).unwrap(), StoreStatus::Stored);
}

#[test]
fn test_absolute_ttl_in_the_past_expires_immediately() {
    let store = setup_store();

    // Above the 30 day threshold, so read as a unix timestamp long gone
    store.set("old", b"x", Tag::TEXT, 60 * 60 * 24 * 31).unwrap();
    assert!(store.get("old").unwrap().is_none());
}

// =============================================================================
// Server List Tests
// =============================================================================

#[test]
fn test_no_servers_stores_nothing() {
    let store = MemoryStore::new();

    assert_eq!(store.set("bli", b"bla", Tag::TEXT, 0).unwrap(), StoreStatus::NotStored);
    assert!(store.get("bli").unwrap().is_none());
    assert!(store.get_multi(&["bli"]).unwrap().is_empty());
    assert!(store.stats().unwrap().is_empty());
}

#[test]
fn test_zero_weight_server_is_inactive() {
    let store = MemoryStore::with_servers(vec![ServerSpec::weighted("127.0.0.1:11211", 0).unwrap()]);

    assert_eq!(store.set("bli", b"bla", Tag::TEXT, 0).unwrap(), StoreStatus::NotStored);
}

#[test]
fn test_set_servers_restores_service() {
    let store = setup_store();

    store.set_servers(&[]).unwrap();
    assert_eq!(store.set("bli", b"bla", Tag::TEXT, 0).unwrap(), StoreStatus::NotStored);

    store
        .set_servers(&[ServerSpec::parse("127.0.0.1:11211").unwrap()])
        .unwrap();
    assert_eq!(store.set("bla", b"bli", Tag::TEXT, 0).unwrap(), StoreStatus::Stored);
    assert_eq!(payload_of(&store, "bla"), Some(b"bli".to_vec()));
}

#[test]
fn test_flush_all() {
    let store = setup_store();

    store.set("a", b"1", Tag::TEXT, 0).unwrap();
    store.set("b", b"2", Tag::TEXT, 0).unwrap();

    assert_eq!(store.flush_all().unwrap(), StoreStatus::Ok);
    assert!(store.is_empty());
}

// =============================================================================
// Statistics Tests
// =============================================================================

#[test]
fn test_stats_per_server() {
    let store = MemoryStore::with_servers(vec![
        ServerSpec::parse("10.0.0.1:11211").unwrap(),
        ServerSpec::parse("10.0.0.2:11211").unwrap(),
    ]);

    store.set("blo", b"bli", Tag::TEXT, 0).unwrap();
    store.get("blo").unwrap();
    store.get("missing").unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].server, "10.0.0.1:11211");
    assert_eq!(stats[1].server, "10.0.0.2:11211");

    let first = &stats[0];
    assert_eq!(first.get("curr_items"), Some("1"));
    assert_eq!(first.get("bytes"), Some("3"));
    assert_eq!(first.get("cmd_set"), Some("1"));
    assert_eq!(first.get("cmd_get"), Some("2"));
    assert_eq!(first.get("get_hits"), Some("1"));
    assert_eq!(first.get("get_misses"), Some("1"));
    assert_eq!(first.get("version"), Some(tagcache::VERSION));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_and_readers() {
    let store = Arc::new(setup_store());
    let mut handles = Vec::new();

    for t in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let key = format!("t{}-k{}", t, i);
                store.set(&key, key.as_bytes(), Tag::TEXT, 0).unwrap();
                let entry = store.get(&key).unwrap().unwrap();
                assert_eq!(entry.payload.as_ref(), key.as_bytes());
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 800);
}

#[test]
fn test_concurrent_incr() {
    let store = Arc::new(setup_store());
    store.set("counter", b"0", Tag::TEXT, 0).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..250 {
                    store.incr("counter", 1).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(payload_of(&store, "counter"), Some(b"1000".to_vec()));
}
