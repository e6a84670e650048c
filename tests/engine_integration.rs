//! Integration tests for the adaptive engine facade

mod common;

use adaptive_engine::config::LearningConfig;
use adaptive_engine::{AdaptiveEngine, Context, EngineError, EventKind, LearningEvent};
use common::{api_context, experience, failure, seeded_engine, success};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_record_increments_total_by_one() {
    let engine = seeded_engine(0.1, 0.1);
    let ctx = api_context();

    for expected in 1..=5u64 {
        engine.record_experience(success(&ctx, "microservices")).unwrap();
        assert_eq!(engine.statistics().unwrap().total_experiences, expected);
    }
}

#[test]
fn test_single_experience_value() {
    let engine = seeded_engine(0.1, 0.0);
    let ctx = api_context();

    engine
        .record_experience(experience(&ctx, "microservices", true, 92.0, 2300.0))
        .unwrap();

    let values = engine.action_values(&ctx, &["microservices"]).unwrap();
    assert!((values[0].q_value - 0.0822).abs() < 1e-6);
    assert_eq!(values[0].visit_count, 1);
}

#[test]
fn test_greedy_choice_is_deterministic() {
    let engine = seeded_engine(0.1, 0.0);
    let ctx = api_context();
    engine.record_experience(success(&ctx, "A")).unwrap();

    for _ in 0..100 {
        assert_eq!(engine.get_best_action(&ctx, &["B", "A"]).unwrap(), "A");
    }
}

#[test]
fn test_unseen_state_picks_first_candidate() {
    let engine = seeded_engine(0.1, 0.0);
    let choice = engine.get_best_action(&Context::new("fresh", 2), &["x", "y", "z"]).unwrap();
    assert_eq!(choice, "x");
}

#[test]
fn test_full_exploration_is_roughly_uniform() {
    let engine = seeded_engine(0.1, 1.0);
    let ctx = api_context();
    let actions = ["monolith", "microservices", "serverless"];
    let mut counts: HashMap<String, usize> = HashMap::new();

    for _ in 0..1000 {
        let choice = engine.get_best_action(&ctx, &actions).unwrap();
        *counts.entry(choice).or_default() += 1;
    }

    for action in actions {
        let share = counts.get(action).copied().unwrap_or(0) as f64 / 1000.0;
        assert!((share - 1.0 / 3.0).abs() <= 0.10, "{} chosen {:.1}% of the time", action, share * 100.0);
    }
}

#[test]
fn test_choice_stays_within_candidates() {
    let engine = seeded_engine(0.3, 0.5);
    let ctx = api_context();
    engine.record_experience(success(&ctx, "outside")).unwrap();

    let actions = vec!["a".to_string(), "b".to_string()];
    for _ in 0..200 {
        let choice = engine.get_best_action(&ctx, &actions).unwrap();
        assert!(actions.contains(&choice));
    }
}

#[test]
fn test_empty_action_set_is_rejected() {
    let engine = seeded_engine(0.1, 0.2);
    let empty: [&str; 0] = [];
    let err = engine.get_best_action(&api_context(), &empty).unwrap_err();
    assert!(matches!(err, EngineError::EmptyActionSet));
}

#[test]
fn test_unseen_prediction_is_neutral() {
    let engine = seeded_engine(0.1, 0.2);
    let prediction = engine.predict_outcome(&api_context(), "microservices").unwrap();

    assert_eq!(prediction.predicted_outcome.success, 0.5);
    assert_eq!(prediction.confidence, 0.0);
    assert!(prediction.recommendations.is_empty());
}

#[test]
fn test_pattern_discovered_exactly_once() {
    let engine = seeded_engine(0.1, 0.2);
    let ctx = api_context();
    let discovered = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&discovered);
    engine.on(EventKind::PatternDiscovered, move |event| {
        if let LearningEvent::PatternDiscovered { occurrences, .. } = event {
            sink.lock().unwrap().push(*occurrences);
        }
        Ok(())
    });

    for _ in 0..2 {
        engine.record_experience(success(&ctx, "microservices")).unwrap();
    }
    assert!(discovered.lock().unwrap().is_empty());

    engine.record_experience(success(&ctx, "microservices")).unwrap();
    assert_eq!(*discovered.lock().unwrap(), vec![3]);

    for _ in 0..5 {
        engine.record_experience(failure(&ctx, "microservices")).unwrap();
    }
    assert_eq!(discovered.lock().unwrap().len(), 1);
    assert_eq!(engine.statistics().unwrap().patterns_discovered, 1);
}

#[test]
fn test_knowledge_graph_never_shrinks() {
    let engine = seeded_engine(0.1, 0.2);
    let mut previous = 0;

    for (i, decision) in ["rest", "grpc", "rest", "graphql", "grpc"].iter().enumerate() {
        let ctx = Context::new(format!("task_{}", i % 3), 4);
        let exp = if i % 2 == 0 { success(&ctx, decision) } else { failure(&ctx, decision) };
        engine.record_experience(exp).unwrap();

        let size = engine.export_knowledge().unwrap().knowledge_graph.len();
        assert!(size >= previous);
        previous = size;
    }
    assert!(previous > 0);
}

#[test]
fn test_identical_experience_counted_twice() {
    let engine = seeded_engine(0.1, 0.2);
    let exp = success(&api_context(), "microservices");

    let first = engine.record_experience(exp.clone()).unwrap();
    let second = engine.record_experience(exp).unwrap();

    assert_ne!(first, second);
    let stats = engine.statistics().unwrap();
    assert_eq!(stats.total_experiences, 2);
    assert_eq!(stats.stored_experiences, 2);
}

#[test]
fn test_api_development_scenario() {
    let engine = AdaptiveEngine::new(LearningConfig::with_rates(0.1, 0.2)).unwrap();
    let ctx = api_context();

    for quality in 90..=94 {
        engine
            .record_experience(experience(&ctx, "microservices", true, quality as f64, 1500.0))
            .unwrap();
    }

    let prediction = engine.predict_outcome(&ctx, "microservices").unwrap();
    assert!(prediction.predicted_outcome.success > 0.5);
    assert!(prediction.confidence > 0.0);
    assert!(!prediction.recommendations.is_empty());
}

#[test]
fn test_rejected_experience_leaves_state_untouched() {
    let engine = seeded_engine(0.1, 0.2);
    let recorded = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&recorded);
    engine.on(EventKind::ExperienceRecorded, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let err = engine
        .record_experience(experience(&Context::new("api", 11), "rest", true, 50.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));

    let err = engine
        .record_experience(experience(&Context::new("api", 5), "rest", true, 101.0, 10.0))
        .unwrap_err();
    assert!(err.is_recoverable());

    assert_eq!(recorded.load(Ordering::SeqCst), 0);
    let stats = engine.statistics().unwrap();
    assert_eq!(stats.total_experiences, 0);
    assert_eq!(stats.q_table_entries, 0);
    assert_eq!(stats.knowledge_nodes, 0);
}

#[test]
fn test_failing_handler_does_not_reach_caller() {
    let engine = seeded_engine(0.1, 0.2);
    let delivered = Arc::new(AtomicUsize::new(0));

    engine.on(EventKind::QLearningUpdated, |_| anyhow::bail!("sink unavailable"));
    engine.on(EventKind::QLearningUpdated, |_| panic!("handler bug"));
    let counter = Arc::clone(&delivered);
    engine.on(EventKind::QLearningUpdated, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    engine.record_experience(success(&api_context(), "rest")).unwrap();
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
    assert_eq!(engine.statistics().unwrap().total_experiences, 1);
}

#[test]
fn test_retention_cap_keeps_learning() {
    let config = LearningConfig::with_rates(0.1, 0.0).with_seed(7).with_max_experiences(Some(3));
    let engine = AdaptiveEngine::new(config).unwrap();
    let ctx = api_context();

    for _ in 0..5 {
        engine.record_experience(success(&ctx, "rest")).unwrap();
    }

    let stats = engine.statistics().unwrap();
    assert_eq!(stats.total_experiences, 5);
    assert_eq!(stats.stored_experiences, 3);
    assert_eq!(stats.evicted_experiences, 2);
    assert_eq!(engine.action_values(&ctx, &["rest"]).unwrap()[0].visit_count, 5);
}

#[test]
fn test_export_serializes_to_json() {
    let engine = seeded_engine(0.1, 0.2);
    let ctx = api_context();
    for _ in 0..3 {
        engine.record_experience(success(&ctx, "microservices")).unwrap();
    }

    let export = engine.export_knowledge().unwrap();
    let json = serde_json::to_value(&export).unwrap();

    assert_eq!(json["patterns"].as_array().unwrap().len(), 1);
    assert_eq!(json["q_table"].as_array().unwrap().len(), 1);
    assert_eq!(json["statistics"]["total_experiences"], 3);
    assert!(json["knowledge_graph"]["nodes"].as_array().unwrap().len() >= 3);
}

#[test]
fn test_every_prediction_emits_event() {
    let engine = seeded_engine(0.1, 0.2);
    let ctx = api_context();
    let predictions = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&predictions);
    engine.on(EventKind::PredictionGenerated, move |event| {
        if let LearningEvent::PredictionGenerated { decision, success, confidence, .. } = event {
            sink.lock().unwrap().push((decision.clone(), *success, *confidence));
        }
        Ok(())
    });

    engine.predict_outcome(&ctx, "serverless").unwrap();
    engine.record_experience(success(&ctx, "microservices")).unwrap();
    let seen = engine.predict_outcome(&ctx, "microservices").unwrap();

    let predictions = predictions.lock().unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0], ("serverless".to_string(), 0.5, 0.0));
    assert_eq!(predictions[1].0, "microservices");
    assert_eq!(predictions[1].1, seen.predicted_outcome.success);
    assert!(predictions[1].2 > 0.0);
}

#[test]
fn test_knowledge_event_on_reweight_only() {
    let engine = seeded_engine(0.1, 0.2);
    let deltas = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&deltas);
    engine.on(EventKind::KnowledgeUpdated, move |event| {
        if let LearningEvent::KnowledgeUpdated { new_nodes, new_edges, total_nodes, .. } = event {
            sink.lock().unwrap().push((*new_nodes, *new_edges, *total_nodes));
        }
        Ok(())
    });

    let exp = success(&api_context(), "microservices");
    engine.record_experience(exp.clone()).unwrap();
    engine.record_experience(exp).unwrap();

    let deltas = deltas.lock().unwrap();
    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[0], (3, 2, 3));
    assert_eq!(deltas[1], (0, 0, 3));
}

#[test]
fn test_delimiter_in_requirement_keeps_states_apart() {
    let engine = seeded_engine(0.1, 0.0);
    let joined = Context::new("api", 5).with_requirement("auth,cache");
    let split = Context::new("api", 5).with_requirement("auth").with_requirement("cache");

    engine.record_experience(success(&joined, "rest")).unwrap();

    let prediction = engine.predict_outcome(&split, "rest").unwrap();
    assert_eq!(prediction.predicted_outcome.success, 0.5);
    assert_eq!(prediction.confidence, 0.0);
    assert_eq!(engine.action_values(&split, &["rest"]).unwrap()[0].visit_count, 0);
}

#[test]
fn test_engine_rejects_out_of_range_rates() {
    let err = AdaptiveEngine::new(LearningConfig::with_rates(0.1, 1.5)).unwrap_err();
    assert!(matches!(err, EngineError::ConfigError(_)));
    assert!(AdaptiveEngine::new(LearningConfig::with_rates(0.0, 0.1)).is_err());
    assert!(AdaptiveEngine::with_defaults().is_ok());
}
