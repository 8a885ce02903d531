//! Contratos del CacheStore en memoria: round-trip byte-idéntico, commit
//! idempotente, divergencia reportada y lecturas concurrentes limpias.

use std::sync::Arc;
use std::thread;

use modelflow_core::{
    ArtifactSnapshot, CacheEntry, CacheError, CacheStore, ContentHasher, InMemoryCacheStore,
    InMemoryWorkspace, Workspace,
};

fn snapshot(path: &str, bytes: &[u8]) -> ArtifactSnapshot {
    let hasher = ContentHasher::new();
    ArtifactSnapshot::new(path, bytes.to_vec(), hasher.fingerprint_bytes(bytes))
}

#[test]
fn commit_lookup_restore_round_trip_is_byte_identical() {
    let store = InMemoryCacheStore::new();
    let outputs = vec![snapshot("models/model.bin", b"\x00\x01weights\xff"),
                       snapshot("reports/metrics.json", br#"{"acc":0.9}"#)];
    store.commit(CacheEntry::new("fp-1", outputs.clone())).expect("commit");

    let entry = store.lookup("fp-1").expect("lookup").expect("entry");
    assert_eq!(entry.outputs, outputs);

    let mut workspace = InMemoryWorkspace::new();
    store.restore(&entry, &mut workspace).expect("restore");
    assert_eq!(workspace.read("models/model.bin").expect("read").expect("bytes"),
               b"\x00\x01weights\xff");
    assert_eq!(workspace.read("reports/metrics.json").expect("read").expect("bytes"),
               br#"{"acc":0.9}"#);
}

#[test]
fn lookup_of_unknown_fingerprint_is_a_clean_missing() {
    let store = InMemoryCacheStore::new();
    assert!(store.lookup("nope").expect("lookup").is_none());
}

#[test]
fn identical_recommit_is_a_noop() {
    let store = InMemoryCacheStore::new();
    let outputs = vec![snapshot("a", b"same")];
    store.commit(CacheEntry::new("fp", outputs.clone())).expect("first");
    store.commit(CacheEntry::new("fp", outputs)).expect("idempotent recommit");
    assert_eq!(store.len(), 1);
}

#[test]
fn divergent_commit_is_reported_and_never_overwrites() {
    let store = InMemoryCacheStore::new();
    store.commit(CacheEntry::new("fp", vec![snapshot("a", b"original")]))
         .expect("first");

    let err = store.commit(CacheEntry::new("fp", vec![snapshot("a", b"mutant")]))
                   .expect_err("divergent outputs");
    assert_eq!(err, CacheError::Inconsistency { fingerprint: "fp".into() });

    // First entry intact.
    let entry = store.lookup("fp").expect("lookup").expect("entry");
    assert_eq!(entry.outputs[0].bytes, b"original");
}

#[test]
fn concurrent_readers_observe_full_entries_or_missing() {
    let store = Arc::new(InMemoryCacheStore::new());
    let fingerprints: Vec<String> = (0..32).map(|i| format!("fp-{i}")).collect();

    let writer = {
        let store = Arc::clone(&store);
        let fingerprints = fingerprints.clone();
        thread::spawn(move || {
            for fp in fingerprints {
                let outputs = vec![snapshot("one", fp.as_bytes()), snapshot("two", fp.as_bytes())];
                store.commit(CacheEntry::new(fp, outputs)).expect("commit");
            }
        })
    };

    let readers: Vec<_> = (0..4).map(|_| {
                                    let store = Arc::clone(&store);
                                    let fingerprints = fingerprints.clone();
                                    thread::spawn(move || {
                                        for _ in 0..200 {
                                            for fp in &fingerprints {
                                                if let Some(entry) = store.lookup(fp).expect("lookup") {
                                                    // Never a torn entry.
                                                    assert_eq!(entry.outputs.len(), 2);
                                                    assert_eq!(entry.fingerprint, *fp);
                                                }
                                            }
                                        }
                                    })
                                })
                                .collect();

    writer.join().expect("writer");
    for reader in readers {
        reader.join().expect("reader");
    }
    assert_eq!(store.len(), 32);
}
