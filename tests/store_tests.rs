//! Integration tests for the in-memory knowledge store.

use std::sync::Arc;

use ragkit::{Chunk, InMemoryKnowledgeStore, KnowledgeStore, RagError};

fn chunk(topic: &str, index: usize, embedding: Vec<f32>) -> Chunk {
    Chunk {
        id: format!("{topic}_{index}"),
        text: format!("{topic} chunk {index}"),
        embedding,
        topic: topic.to_string(),
    }
}

#[tokio::test]
async fn insert_is_idempotent_per_topic() {
    let store = InMemoryKnowledgeStore::new();

    let first = store
        .insert_topic("turing", vec![chunk("turing", 0, vec![1.0, 0.0])])
        .await
        .unwrap();
    assert!(first);
    assert_eq!(store.chunk_count().await, 1);

    // Second insert fails closed: no error, no mutation
    let second = store
        .insert_topic("turing", vec![chunk("turing", 0, vec![0.0, 1.0])])
        .await
        .unwrap();
    assert!(!second);
    assert_eq!(store.chunk_count().await, 1);
    assert_eq!(store.topics().await, vec!["turing"]);
}

#[tokio::test]
async fn empty_store_query_returns_empty() {
    let store = InMemoryKnowledgeStore::new();
    let results = store.search(&[1.0, 0.0], 3).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_orders_by_descending_score() {
    let store = InMemoryKnowledgeStore::new();
    store
        .insert_topic(
            "t",
            vec![
                chunk("t", 0, vec![0.0, 1.0]),
                chunk("t", 1, vec![1.0, 0.0]),
                chunk("t", 2, vec![0.6, 0.8]),
            ],
        )
        .await
        .unwrap();

    let results = store.search(&[1.0, 0.0], 3).await.unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, ["t_1", "t_2", "t_0"]);
    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
}

#[tokio::test]
async fn ties_break_by_insertion_order() {
    let store = InMemoryKnowledgeStore::new();
    store
        .insert_topic("b", vec![chunk("b", 0, vec![1.0, 0.0])])
        .await
        .unwrap();
    store
        .insert_topic("a", vec![chunk("a", 0, vec![1.0, 0.0])])
        .await
        .unwrap();

    // Identical embeddings score identically; first inserted wins
    let results = store.search(&[1.0, 0.0], 2).await.unwrap();
    assert_eq!(results[0].chunk.id, "b_0");
    assert_eq!(results[1].chunk.id, "a_0");
}

#[tokio::test]
async fn search_respects_top_k() {
    let store = InMemoryKnowledgeStore::new();
    let chunks = (0..5).map(|i| chunk("t", i, vec![1.0, i as f32])).collect();
    store.insert_topic("t", chunks).await.unwrap();

    assert_eq!(store.search(&[1.0, 0.0], 2).await.unwrap().len(), 2);
    assert_eq!(store.search(&[1.0, 0.0], 10).await.unwrap().len(), 5);
}

#[tokio::test]
async fn missing_embedding_is_rejected() {
    let store = InMemoryKnowledgeStore::new();
    let err = store.insert_topic("t", vec![chunk("t", 0, Vec::new())]).await.unwrap_err();
    assert!(matches!(err, RagError::Store(_)));
    assert!(!store.exists("t").await);
}

#[tokio::test]
async fn empty_chunk_list_is_rejected() {
    let store = InMemoryKnowledgeStore::new();
    let err = store.insert_topic("t", Vec::new()).await.unwrap_err();
    assert!(matches!(err, RagError::Store(_)));
}

#[tokio::test]
async fn delete_topic_removes_all_chunks() {
    let store = InMemoryKnowledgeStore::new();
    store
        .insert_topic("a", vec![chunk("a", 0, vec![1.0]), chunk("a", 1, vec![1.0])])
        .await
        .unwrap();
    store.insert_topic("b", vec![chunk("b", 0, vec![1.0])]).await.unwrap();

    assert!(store.delete_topic("a").await.unwrap());
    assert!(!store.exists("a").await);
    assert_eq!(store.chunk_count().await, 1);
    assert_eq!(store.topics().await, vec!["b"]);

    // Deleting again reports absence
    assert!(!store.delete_topic("a").await.unwrap());

    // A deleted topic may be ingested again
    assert!(store.insert_topic("a", vec![chunk("a", 0, vec![1.0])]).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_of_one_topic_admit_a_single_winner() {
    let store = Arc::new(InMemoryKnowledgeStore::new());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store.insert_topic("race", vec![chunk("race", 0, vec![1.0, 0.0])]).await.unwrap()
            })
        })
        .collect();

    let mut wins = 0;
    for task in tasks {
        if task.await.unwrap() {
            wins += 1;
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(store.chunk_count().await, 1);
}
