//! Shared fixtures for integration tests

#![allow(dead_code)]

use adaptive_engine::config::LearningConfig;
use adaptive_engine::{AdaptiveEngine, Context, Decision, NewExperience, Outcome};

/// Engine with fixed rates and a fixed seed
pub fn seeded_engine(learning_rate: f64, exploration_rate: f64) -> AdaptiveEngine {
    AdaptiveEngine::new(LearningConfig::with_rates(learning_rate, exploration_rate).with_seed(42)).unwrap()
}

pub fn api_context() -> Context {
    Context::new("api_development", 6)
        .with_requirement("scalability")
        .with_requirement("auth")
}

pub fn experience(context: &Context, chosen: &str, success: bool, quality: f64, time_ms: f64) -> NewExperience {
    NewExperience::new(context.clone(), Decision::new(chosen), Outcome::new(success, quality, time_ms))
}

pub fn success(context: &Context, chosen: &str) -> NewExperience {
    experience(context, chosen, true, 90.0, 1000.0)
}

pub fn failure(context: &Context, chosen: &str) -> NewExperience {
    experience(context, chosen, false, 20.0, 4000.0)
}
