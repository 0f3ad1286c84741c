pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const DATABASE: &str = "🗄️";
    pub const CLOCK: &str = "⏱️";
    pub const PERSON: &str = "👤";
    pub const HEART: &str = "❤️";
    pub const MOON: &str = "🌙";
    pub const FOOD: &str = "🥗";
    pub const RUN: &str = "🏃";
    pub const TARGET: &str = "🎯";
    pub const SEED: &str = "🌱";
    pub const DEL: &str = "🗑️";
}
