use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use vibecoin_trie::trie::{compress, PatriciaNode, PatriciaTrie};
use vibecoin_trie::{HashFunction, Keccak256Hasher, Sha256Hasher};

fn random_key(rng: &mut StdRng) -> String {
    // Short keys over a small alphabet so prefixes collide often
    let len = rng.gen_range(0..6);
    let key: String = (0..len).map(|_| ['0', '1', 'a', 'f'][rng.gen_range(0..4)]).collect();
    format!("0x{}", key)
}

fn root_hash<H: HashFunction>(trie: &PatriciaTrie<String>, hasher: &H) -> String {
    trie.calculate_root_hash(hasher).unwrap().to_hex()
}

#[test]
fn test_account_balances() {
    let trie = PatriciaTrie::from_entries(vec![
        ("0xa711355", "45.0 ETH"),
        ("0xa77d337", "1.00 WEI"),
        ("0xa7f9365", "1.1 ETH"),
    ])
    .unwrap();

    assert_eq!(trie.size(), 3);
    assert_eq!(trie.get("0xa711355"), Some(&"45.0 ETH"));
    assert_eq!(trie.get("0xa77d337"), Some(&"1.00 WEI"));
    assert_eq!(trie.get("0xa7f9365"), Some(&"1.1 ETH"));

    // The shared "a7" prefix is one extension, not three top-level leaves
    match trie.root().as_ref() {
        PatriciaNode::Extension { shared_prefix, next_node } => {
            assert_eq!(shared_prefix.to_hex(), "a7");
            assert_eq!(next_node.child_count(), 3);
        }
        other => panic!("expected extension root, got {:?}", other),
    }
}

#[test]
fn test_keys_prefixing_each_other() {
    let trie = PatriciaTrie::from_entries(vec![
        ("0xa1", "short"),
        ("0xa12", "medium"),
        ("0xa123", "long"),
    ])
    .unwrap();

    assert_eq!(trie.size(), 3);
    assert_eq!(trie.get("0xa1"), Some(&"short"));
    assert_eq!(trie.get("0xa12"), Some(&"medium"));
    assert_eq!(trie.get("0xa123"), Some(&"long"));
    assert_eq!(trie.get("0xa"), None);
    assert_eq!(trie.get("0xa1234"), None);
    assert!(trie.is_canonical());
}

#[test]
fn test_delete_collapses_branch() {
    let trie = PatriciaTrie::from_entries(vec![("0xa11", "v1"), ("0xa12", "v2")]).unwrap();
    let trie = trie.delete("0xa12");

    assert_eq!(trie.size(), 1);
    assert_eq!(trie.get("0xa11"), Some(&"v1"));
    assert_eq!(trie.get("0xa12"), None);
    assert!(!matches!(trie.root().as_ref(), PatriciaNode::Branch { .. }));
    assert!(trie.is_canonical());
}

#[test]
fn test_random_operations_stay_canonical() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut trie: PatriciaTrie<String> = PatriciaTrie::new();
    let mut model = BTreeMap::new();

    for step in 0..2000 {
        let key = random_key(&mut rng);
        if rng.gen_bool(0.6) {
            let value = format!("v{}", step);
            trie = trie.insert(&key, value.clone()).unwrap();
            model.insert(key.clone(), value);
        } else {
            trie = trie.delete(&key);
            model.remove(&key);
        }

        assert!(trie.is_canonical(), "not canonical after step {} ({})\n{}", step, key, trie);
        assert_eq!(trie.size(), model.len());
        assert_eq!(trie.get(&key), model.get(&key));
    }

    // Every surviving key resolves, and nothing else is stored
    for (key, value) in &model {
        assert_eq!(trie.get(key), Some(value));
    }
    let stored: Vec<String> = trie.entries().into_iter().map(|(k, _)| format!("0x{}", k)).collect();
    let expected: Vec<String> = model.keys().cloned().collect();
    assert_eq!(stored, expected);
}

#[test]
fn test_root_hash_is_order_independent() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut pairs: Vec<(String, String)> = (0..64)
        .map(|i| (format!("0x{:x}", rng.gen::<u32>() >> (i % 24)), format!("value-{}", i)))
        .collect();
    pairs.sort();
    pairs.dedup_by(|a, b| a.0 == b.0);

    let reference = PatriciaTrie::from_entries(pairs.clone()).unwrap();
    let reference_hash = root_hash(&reference, &Sha256Hasher);

    for _ in 0..20 {
        pairs.shuffle(&mut rng);
        let trie = PatriciaTrie::from_entries(pairs.clone()).unwrap();
        assert_eq!(root_hash(&trie, &Sha256Hasher), reference_hash);
        assert_eq!(trie.root(), reference.root());
    }
}

#[test]
fn test_delete_inverts_insert() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut trie: PatriciaTrie<String> = PatriciaTrie::new();

    for step in 0..300 {
        let key = random_key(&mut rng);
        if trie.contains_key(&key) {
            trie = trie.delete(&key);
            continue;
        }

        let inserted = trie.insert(&key, format!("v{}", step)).unwrap();
        let restored = inserted.delete(&key);

        assert_eq!(restored.root(), trie.root(), "delete({}) did not invert insert", key);
        assert_eq!(restored.size(), trie.size());
        assert_eq!(root_hash(&restored, &Keccak256Hasher), root_hash(&trie, &Keccak256Hasher));

        trie = inserted;
    }
}

#[test]
fn test_hash_sensitivity() {
    let base = PatriciaTrie::from_entries(vec![
        ("0x01", "one".to_string()),
        ("0x0123", "two".to_string()),
        ("0xff", "three".to_string()),
    ])
    .unwrap();
    let base_hash = root_hash(&base, &Sha256Hasher);

    // Changed value
    let changed_value = base.insert("0x0123", "TWO".to_string()).unwrap();
    assert_ne!(root_hash(&changed_value, &Sha256Hasher), base_hash);

    // Changed key, same value
    let moved = base.delete("0x0123").insert("0x0124", "two".to_string()).unwrap();
    assert_ne!(root_hash(&moved, &Sha256Hasher), base_hash);

    // Restoring the value restores the hash
    let restored = changed_value.insert("0x0123", "two".to_string()).unwrap();
    assert_eq!(root_hash(&restored, &Sha256Hasher), base_hash);
}

#[test]
fn test_old_versions_survive_mutation() {
    let v1 = PatriciaTrie::from_entries(vec![("0xabc", 1u64), ("0xabd", 2)]).unwrap();
    let v2 = v1.insert("0xabe", 3).unwrap();
    let v3 = v2.delete("0xabc");

    assert_eq!(v1.size(), 2);
    assert_eq!(v1.get("0xabe"), None);
    assert_eq!(v2.get("0xabc"), Some(&1));
    assert_eq!(v3.get("0xabc"), None);
    assert_eq!(v3.get("0xabe"), Some(&3));
}

#[test]
fn test_compress_is_identity_on_canonical_tries() {
    let trie = PatriciaTrie::from_entries(vec![("0x1", "a"), ("0x12", "b"), ("0x2345", "c"), ("0x2399", "d")]).unwrap();
    assert_eq!(&compress(trie.root()), trie.root());
}
