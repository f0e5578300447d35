use serde_json::json;

use neurolens_core::report::summarize;

use super::load_state;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state()?;
    let stats = json!({
        "total_sessions": state.total_sessions,
        "streak": state.streak,
        "achievements_unlocked": state.achievements.len(),
        "history": summarize(&state.history),
    });
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
