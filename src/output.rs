use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Banners and status lines are suppressed when `LEAGUEBOOK_QUIET` is set
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("LEAGUEBOOK_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
