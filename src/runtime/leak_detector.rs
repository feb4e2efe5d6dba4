use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide allocation counters, printed by `--leak-detector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakStats {
    pub handles_opened: usize,
    pub handles_released: usize,
    pub terms_created: usize,
    pub terms_deleted: usize,
    pub frames_pushed: usize,
}

impl LeakStats {
    pub fn open_handles(&self) -> usize {
        self.handles_opened.saturating_sub(self.handles_released)
    }

    pub fn live_terms(&self) -> usize {
        self.terms_created.saturating_sub(self.terms_deleted)
    }
}

static HANDLES_OPENED: AtomicUsize = AtomicUsize::new(0);
static HANDLES_RELEASED: AtomicUsize = AtomicUsize::new(0);
static TERMS_CREATED: AtomicUsize = AtomicUsize::new(0);
static TERMS_DELETED: AtomicUsize = AtomicUsize::new(0);
static FRAMES_PUSHED: AtomicUsize = AtomicUsize::new(0);

pub fn record_handle_open() {
    HANDLES_OPENED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_handle_release() {
    HANDLES_RELEASED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_term_created() {
    TERMS_CREATED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_term_deleted() {
    TERMS_DELETED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_frame_pushed() {
    FRAMES_PUSHED.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> LeakStats {
    LeakStats {
        handles_opened: HANDLES_OPENED.load(Ordering::Relaxed),
        handles_released: HANDLES_RELEASED.load(Ordering::Relaxed),
        terms_created: TERMS_CREATED.load(Ordering::Relaxed),
        terms_deleted: TERMS_DELETED.load(Ordering::Relaxed),
        frames_pushed: FRAMES_PUSHED.load(Ordering::Relaxed),
    }
}
