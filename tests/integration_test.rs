use std::fs;

use gridpath::agent::{AgentBuilder, EpsilonRecord};
use gridpath::checkpoint::CheckpointPolicy;
use gridpath::config::TrainingConfig;
use gridpath::environment::Cell;
use gridpath::routes::{self, Route};
use gridpath::trainer::Trainer;
use gridpath::run_training;

fn in_grid(cell: &Cell, grid_size: i64) -> bool {
    (0..grid_size).contains(&cell.row) && (0..grid_size).contains(&cell.col)
}

#[test]
fn test_run_training_persists_and_resumes() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("models").join("model.bin");
    let epsilon_path = dir.path().join("models").join("epsilon.json");

    let record = run_training(3, vec![Cell::new(1, 1)], 2, &model_path, &epsilon_path).unwrap();
    assert!(!record.path.is_empty());
    assert!(record.path.iter().all(|cell| in_grid(cell, 3)));
    if record.complete {
        assert_eq!(record.path.last(), Some(&Cell::new(2, 2)));
    }
    assert!(model_path.exists());

    let first = EpsilonRecord::read(&epsilon_path).unwrap();
    assert!(first.epsilon < 0.95);
    assert!(first.epsilon >= 0.01);

    run_training(3, vec![Cell::new(1, 1)], 1, &model_path, &epsilon_path).unwrap();
    let second = EpsilonRecord::read(&epsilon_path).unwrap();
    assert!(second.epsilon < first.epsilon);
    assert!(second.times_trained >= first.times_trained);
}

#[test]
fn test_run_training_json_contract() {
    let dir = tempfile::tempdir().unwrap();
    let record = run_training(2, vec![], 1, &dir.path().join("m.bin"), &dir.path().join("e.json")).unwrap();

    let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    let path = json["path"].as_array().unwrap();
    assert_eq!(path.len(), record.steps());
    assert!(path[0]["row"].is_i64());
    assert!(path[0]["col"].is_i64());
    assert_eq!(json["complete"], record.complete);
}

#[test]
fn test_run_training_rejects_tiny_grid() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_training(1, vec![], 1, &dir.path().join("m.bin"), &dir.path().join("e.json"));
    assert!(result.is_err());
    assert!(!dir.path().join("m.bin").exists());
}

#[test]
fn test_seeded_agents_train_identically() {
    let run = || {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainingConfig::new(4, vec![Cell::new(2, 1), Cell::new(1, 3)], 3, dir.path().join("m.bin"), dir.path().join("e.json"))
            .with_max_iteration(300)
            .with_checkpoint(CheckpointPolicy::Never);
        let trainer = Trainer::new(config).unwrap();
        let mut agent = AgentBuilder::new().seed(42).build().unwrap();
        trainer.run(&mut agent).unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a.last_episode, b.last_episode);
    assert_eq!(a.total_steps, b.total_steps);
    assert_eq!(a.epsilon, b.epsilon);
}

#[test]
fn test_training_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("training.json");
    fs::write(
        &config_path,
        r#"{
            "grid_size": 3,
            "obstacles": [{"row": 0, "col": 2}],
            "episodes": 1,
            "max_iteration": 100,
            "model_path": "m.bin",
            "epsilon_path": "e.json",
            "checkpoint": "never"
        }"#,
    )
    .unwrap();

    let config = TrainingConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.obstacles, vec![Cell::new(0, 2)]);
    assert_eq!(config.max_iteration, 100);
    assert_eq!(config.checkpoint, CheckpointPolicy::Never);
}

#[test]
fn test_route_unknown_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let response = routes::respond("/api/tensorflow_hard", dir.path());
    assert_eq!(response.status, 404);
    assert!(!response.is_success());
}

#[test]
fn test_route_failure_is_structured_500() {
    let dir = tempfile::tempdir().unwrap();
    // A file where the models directory should be makes every checkpoint fail.
    fs::write(dir.path().join("models"), "").unwrap();

    let response = routes::respond("/api/tensorflow_simple", dir.path());
    assert_eq!(response.status, 500);
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["kind"], "io");
    assert!(body["error"].is_string());
}

#[test]
fn test_route_model_directories() {
    let base = std::path::Path::new("/srv/app");
    assert_eq!(
        Route::TensorflowSimpleObstacles.model_dir(base),
        base.join("models").join("tensorflow_simple_obstacles")
    );
    assert_eq!("tensorflow_simple".parse::<Route>().unwrap(), Route::TensorflowSimple);
}
