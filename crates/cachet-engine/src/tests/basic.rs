//! Roundtrip, determinism, and handle tests against the in-memory backend.

use cachet_store::StoreError;

use crate::ContentError;

use super::helpers::{blake3_store, siv_store, test_data};

// -----------------------------------------------------------------------
// Put / get roundtrips
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_empty_content() {
    let (store, backend) = siv_store(256);

    let handle = store.put_content(b"").await.unwrap();
    assert_eq!(handle.length(), 0);
    assert_eq!(
        backend.len(),
        1,
        "empty content is exactly one canonical leaf"
    );

    let got = store.get_content(&handle).await.unwrap();
    assert_eq!(got.as_ref(), b"");

    store.delete_content(&handle).await.unwrap();
    assert!(backend.is_empty());
}

#[tokio::test]
async fn test_small_content() {
    let (store, backend) = siv_store(256);
    let data = b"This is a test content.";

    let handle = store.put_content(data).await.unwrap();
    assert_eq!(handle.length(), data.len() as u64);

    let got = store.get_content(&handle).await.unwrap();
    assert_eq!(got.as_ref(), data.as_slice());

    store.delete_content(&handle).await.unwrap();
    assert!(backend.is_empty());
}

#[tokio::test]
async fn test_roundtrip_various_sizes() {
    let (store, _) = siv_store(256);

    for size in [1, 63, 64, 255, 256, 257, 1024, 5000, 65_536, 200_000] {
        let data = test_data(size);
        let handle = store.put_content(&data).await.unwrap();
        let got = store.get_content(&handle).await.unwrap();
        assert_eq!(got.as_ref(), data.as_slice(), "roundtrip failed at size {size}");
    }
}

#[tokio::test]
async fn test_multi_level_roundtrip_and_full_delete() {
    let (store, backend) = siv_store(256);
    // Large enough to force several interior levels at c = 256.
    let data = test_data(300_000);

    let handle = store.put_content(&data).await.unwrap();
    assert!(
        backend.len() > 500,
        "expected a deep tree, got {} entries",
        backend.len()
    );

    let got = store.get_content(&handle).await.unwrap();
    assert_eq!(got.as_ref(), data.as_slice());

    store.delete_content(&handle).await.unwrap();
    assert!(backend.is_empty(), "delete must release every node");
}

// -----------------------------------------------------------------------
// Determinism
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_repeated_put_returns_identical_handle() {
    let (store, _) = siv_store(256);
    let data = test_data(100_000);

    let h1 = store.put_content(&data).await.unwrap();
    let h2 = store.put_content(&data).await.unwrap();

    assert_eq!(h1, h2);
    assert_eq!(h1.to_bytes(), h2.to_bytes());
}

#[tokio::test]
async fn test_different_contents_different_handles() {
    let (store, _) = siv_store(256);

    let h1 = store.put_content(b"hello").await.unwrap();
    let h2 = store.put_content(b"world").await.unwrap();
    assert_ne!(h1, h2);
}

#[tokio::test]
async fn test_handles_are_key_specific() {
    // Convergence holds per key: different master keys address the same
    // content differently.
    let (store_a, _) = siv_store(256);

    let backend = std::sync::Arc::new(cachet_store::MemoryBackend::new());
    let crypto = std::sync::Arc::new(cachet_crypto::Aes256SivWrapper::new(&[0x99u8; 32]));
    let store_b = crate::ContentStore::new(
        crate::ContentStoreConfig { chunk_size: 256 },
        backend,
        crypto,
    );

    let data = test_data(10_000);
    let h_a = store_a.put_content(&data).await.unwrap();
    let h_b = store_b.put_content(&data).await.unwrap();
    assert_ne!(h_a, h_b);
}

// -----------------------------------------------------------------------
// put_content_checked
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_put_checked_reports_novelty() {
    let (store, _) = siv_store(256);
    let data = test_data(10_000);

    let (h1, new) = store.put_content_checked(&data).await.unwrap();
    assert!(new, "first insertion must be new");

    let (h2, new) = store.put_content_checked(&data).await.unwrap();
    assert_eq!(h1, h2);
    assert!(!new, "second insertion must not be new");

    store.delete_content(&h1).await.unwrap();
    let (_, new) = store.put_content_checked(&data).await.unwrap();
    assert!(!new, "one of two insertions is still live");

    store.delete_content(&h1).await.unwrap();
    store.delete_content(&h1).await.unwrap();
    let (_, new) = store.put_content_checked(&data).await.unwrap();
    assert!(new, "content fully deleted, insertion is new again");
}

// -----------------------------------------------------------------------
// Handle encoding
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_handle_parse_roundtrip() {
    let (store, _) = siv_store(256);
    let data = test_data(5000);

    let handle = store.put_content(&data).await.unwrap();
    let encoded = handle.to_bytes();
    assert_eq!(encoded.len(), store.digest_size() + 8);

    let parsed = store.parse_handle(&encoded).unwrap();
    assert_eq!(parsed, handle);

    let got = store.get_content(&parsed).await.unwrap();
    assert_eq!(got.as_ref(), data.as_slice());
}

// -----------------------------------------------------------------------
// Get / delete of absent contents
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_get_after_delete_is_not_found() {
    let (store, _) = siv_store(256);
    let handle = store.put_content(b"short lived").await.unwrap();
    store.delete_content(&handle).await.unwrap();

    let err = store.get_content(&handle).await.unwrap_err();
    assert!(matches!(
        err,
        ContentError::Store(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_more_times_than_put_is_not_found() {
    let (store, backend) = siv_store(256);
    let handle = store.put_content(b"delete me once").await.unwrap();

    store.delete_content(&handle).await.unwrap();
    let err = store.delete_content(&handle).await.unwrap_err();
    assert!(matches!(
        err,
        ContentError::Store(StoreError::NotFound(_))
    ));
    assert!(backend.is_empty());
}

// -----------------------------------------------------------------------
// Integrity-only wrapper
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_keyed_blake3_wrapper_end_to_end() {
    let (store, backend) = blake3_store(256);
    let data = test_data(50_000);

    let handle = store.put_content(&data).await.unwrap();
    assert_eq!(handle.to_bytes().len(), 32 + 8);

    let got = store.get_content(&handle).await.unwrap();
    assert_eq!(got.as_ref(), data.as_slice());

    store.delete_content(&handle).await.unwrap();
    assert!(backend.is_empty());
}
