use tracing::debug;

/// Position of a pass inside its fold, handed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldProgress {
    pub pass: &'static str,
    pub current: usize,
    pub total: usize,
}

/// Callback that ignores progress.
pub fn silent(_: FoldProgress) {}

/// Logs roughly every tenth of a fold at debug level.
pub fn log_progress(p: FoldProgress) {
    if p.total == 0 {
        return;
    }
    let step = (p.total / 10).max(1);
    if p.current % step == 0 || p.current == p.total {
        let pct = 100.0 * p.current as f64 / p.total as f64;
        debug!(pass = p.pass, current = p.current, total = p.total, "{pct:.1}% complete");
    }
}
