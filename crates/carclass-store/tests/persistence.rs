//! File-backed store behavior across connections.

use carclass_store::{NewPrediction, PredictionStore};
use std::collections::HashMap;

fn new_prediction(class: &str, confidence: f64) -> NewPrediction {
    let mut all_predictions = HashMap::new();
    all_predictions.insert(class.to_string(), confidence);
    all_predictions.insert("Toyota Innova".to_string(), 1.0 - confidence);
    NewPrediction {
        image_path: format!("uploads/{class}.jpg"),
        predicted_class: class.to_string(),
        confidence,
        all_predictions,
    }
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history.db");

    let first_id = {
        let store = PredictionStore::open(&db_path).unwrap();
        store.create(new_prediction("Audi", 0.91)).unwrap().id
    };

    let store = PredictionStore::open(&db_path).unwrap();
    let fetched = store.get(first_id).unwrap();
    assert_eq!(fetched.predicted_class, "Audi");
    assert!((fetched.confidence - 0.91).abs() < 1e-12);
    assert_eq!(fetched.all_predictions.len(), 2);
}

#[test]
fn test_ids_keep_growing_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history.db");

    let first_id = {
        let store = PredictionStore::open(&db_path).unwrap();
        store.create(new_prediction("Audi", 0.9)).unwrap().id
    };

    let store = PredictionStore::open(&db_path).unwrap();
    let second_id = store.create(new_prediction("Swift", 0.6)).unwrap().id;
    assert!(second_id > first_id);
}

#[test]
fn test_open_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("deeper").join("history.db");

    let store = PredictionStore::open(&db_path).unwrap();
    store.create(new_prediction("Audi", 0.8)).unwrap();
    assert!(db_path.exists());
}

#[test]
fn test_stats_over_file_backed_store() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history.db");
    let store = PredictionStore::open(&db_path).unwrap();

    store.create(new_prediction("Audi", 0.9)).unwrap();
    store.create(new_prediction("Swift", 0.6)).unwrap();
    store.create(new_prediction("Audi", 0.8)).unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_predictions, 3);
    assert_eq!(stats.most_predicted_class.as_deref(), Some("Audi"));
    assert_eq!(stats.predictions_by_class["Audi"], 2);
    assert_eq!(stats.predictions_by_class["Swift"], 1);
}
