use neurolens_core::session::AchievementBook;

use super::load_state;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state()?;
    let gallery = AchievementBook::from_unlocked(state.achievements).gallery();

    if json {
        println!("{}", serde_json::to_string_pretty(&gallery)?);
        return Ok(());
    }

    for a in &gallery {
        match a.unlocked_at {
            Some(at) => println!(
                "[x] {} {} - {} (unlocked {})",
                a.icon,
                a.title,
                a.description,
                at.format("%Y-%m-%d")
            ),
            None => println!("[ ] {} {} - {}", a.icon, a.title, a.description),
        }
    }
    Ok(())
}
