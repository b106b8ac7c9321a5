use std::time::{Duration, Instant};

/// 分阶段计时：每次`lap`记录自创建或上次`lap`以来的耗时。
#[derive(Clone, Debug)]
pub struct PhaseTimer {
    phases: Vec<(&'static str, Duration)>,
    since: Instant,
}

impl PhaseTimer {
    /// 创建时即开始计时。
    #[inline]
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            since: Instant::now(),
        }
    }

    /// 结束当前阶段并命名，随即开始下一阶段。
    pub fn lap(&mut self, phase: &'static str) {
        let now = Instant::now();
        self.phases.push((phase, now - self.since));
        self.since = now;
    }

    #[inline]
    pub fn total(&self) -> Duration {
        self.phases.iter().map(|(_, d)| *d).sum()
    }

    #[inline]
    pub fn get_total_ms(&self) -> u64 {
        self.total().as_millis() as u64
    }

    /// 形如`read 3ms, analyze 0ms, write 12ms`。
    pub fn summary(&self) -> String {
        self.phases
            .iter()
            .map(|(name, d)| format!("{name} {}ms", d.as_millis()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new()
    }
}
