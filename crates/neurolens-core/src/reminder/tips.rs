/// Rotating eye-health tips.
pub const HEALTH_TIPS: [&str; 8] = [
    "💧 Stay hydrated! Drinking water helps maintain tear production and reduces dry eyes.",
    "🌙 Reduce blue light exposure before bed for better sleep quality.",
    "✨ Blink more often! Blinking spreads tears evenly across your eyes.",
    "🎯 Position your screen 20-26 inches away from your eyes.",
    "💡 Ensure proper lighting to reduce glare on your screen.",
    "🧘 Take regular breaks to prevent digital eye fatigue.",
    "👀 Adjust screen brightness to match your surroundings.",
    "🌿 Add plants to your workspace to improve air quality and reduce eye dryness.",
];
