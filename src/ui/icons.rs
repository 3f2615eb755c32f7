pub struct Icons;

impl Icons {
    pub const TROPHY: &str = "🏆";
    pub const BALL: &str = "⚽";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const DATABASE: &str = "🗄️";
    pub const PERSON: &str = "👤";
    pub const SEED: &str = "🌱";
    pub const DEL: &str = "🗑️";
    pub const UP: &str = "⬆️";
    pub const EMPTY: &str = "∅";
}
