//! Celebration state machine: Idle ⇄ Celebrating.
//!
//! Starting a celebration hides a fixed set of elements and records exactly what each one looked
//! like, so finishing puts back the prior visibility rather than forcing everything visible.

use std::time::{Duration, Instant};

use engine::scheduler::TaskHandle;
use engine::ui_tree::{UiId, UiTree, Visibility};

pub const DEFAULT_CELEBRATION_DURATION: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_TITLE_PREFIX: &str = "HAPPY NEW YEAR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CelebrationPhase {
    Idle,
    Celebrating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationSession {
    pub year: i32,
    pub started_at: Instant,
    pub expires_at: Instant,
    hidden: Vec<(UiId, Visibility)>,
    end_task: Option<TaskHandle>,
}

impl CelebrationSession {
    /// Elements hidden at start with the visibility each had just before.
    pub fn hidden(&self) -> &[(UiId, Visibility)] {
        &self.hidden
    }

    pub fn end_task(&self) -> Option<TaskHandle> {
        self.end_task
    }
}

#[derive(Debug, Clone)]
pub struct CelebrationController {
    duration: Duration,
    title_prefix: String,
    hide: Vec<UiId>,
    title: UiId,
    session: Option<CelebrationSession>,
    started: u64,
}

impl CelebrationController {
    pub fn new(duration: Duration, hide: impl Into<Vec<UiId>>, title: UiId) -> Self {
        Self {
            duration,
            title_prefix: DEFAULT_TITLE_PREFIX.to_owned(),
            hide: hide.into(),
            title,
            session: None,
            started: 0,
        }
    }

    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn phase(&self) -> CelebrationPhase {
        if self.session.is_some() {
            CelebrationPhase::Celebrating
        } else {
            CelebrationPhase::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CelebrationSession> {
        self.session.as_ref()
    }

    /// Number of celebrations started since construction.
    pub fn started_count(&self) -> u64 {
        self.started
    }

    pub fn title_text(&self, year: i32) -> String {
        format!("{} {year}!", self.title_prefix)
    }

    /// Idle → Celebrating. Returns `false` and changes nothing if a session already exists.
    ///
    /// Elements missing from `ui` are skipped.
    pub fn start(&mut self, year: i32, now: Instant, ui: &mut UiTree) -> bool {
        if self.session.is_some() {
            return false;
        }

        let hidden = self
            .hide
            .iter()
            .filter_map(|id| {
                ui.set_visibility(*id, Visibility::Hidden)
                    .map(|previous| (*id, previous))
            })
            .collect();
        ui.set_visibility(self.title, Visibility::Visible);

        self.session = Some(CelebrationSession {
            year,
            started_at: now,
            expires_at: now + self.duration,
            hidden,
            end_task: None,
        });
        self.started += 1;
        true
    }

    pub fn set_end_task(&mut self, handle: TaskHandle) {
        if let Some(session) = self.session.as_mut() {
            session.end_task = Some(handle);
        }
    }

    /// Celebrating → Idle. Restores every captured visibility and returns the finished session,
    /// or `None` when idle.
    pub fn finish(&mut self, ui: &mut UiTree) -> Option<CelebrationSession> {
        let session = self.session.take()?;
        ui.set_visibility(self.title, Visibility::Hidden);
        for (id, previous) in session.hidden.iter().rev() {
            ui.set_visibility(*id, *previous);
        }
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::ui::Rect;

    const CANVAS: UiId = UiId(1);
    const A: UiId = UiId(2);
    const B: UiId = UiId(3);
    const TITLE: UiId = UiId(4);
    const MISSING: UiId = UiId(99);

    fn tree() -> UiTree {
        let mut ui = UiTree::new();
        ui.insert_canvas(CANVAS, Rect::from_size(10, 10));
        ui.insert_label(CANVAS, A, Rect::default());
        ui.insert_label(CANVAS, B, Rect::default());
        ui.insert_label(CANVAS, TITLE, Rect::default());
        ui.set_visibility(TITLE, Visibility::Hidden);
        ui
    }

    #[test]
    fn start_is_guarded_while_active() {
        let mut ui = tree();
        let mut c = CelebrationController::new(Duration::from_secs(5), vec![A, B], TITLE);
        let now = Instant::now();
        assert!(c.start(2030, now, &mut ui));
        assert!(!c.start(2031, now, &mut ui));
        assert_eq!(c.started_count(), 1);
        assert_eq!(c.session().map(|s| s.year), Some(2030));
        assert_eq!(c.session().map(|s| s.expires_at), Some(now + Duration::from_secs(5)));
    }

    #[test]
    fn finish_restores_prior_visibility_exactly() {
        let mut ui = tree();
        ui.set_visibility(B, Visibility::Hidden);
        let mut c = CelebrationController::new(Duration::from_secs(5), vec![A, B, MISSING], TITLE);

        c.start(2030, Instant::now(), &mut ui);
        assert_eq!(ui.visibility(A), Some(Visibility::Hidden));
        assert_eq!(ui.visibility(TITLE), Some(Visibility::Visible));
        assert_eq!(c.session().map(|s| s.hidden().len()), Some(2));

        let session = c.finish(&mut ui).expect("session was active");
        assert_eq!(session.year, 2030);
        assert_eq!(ui.visibility(A), Some(Visibility::Visible));
        assert_eq!(ui.visibility(B), Some(Visibility::Hidden));
        assert_eq!(ui.visibility(TITLE), Some(Visibility::Hidden));
        assert_eq!(c.phase(), CelebrationPhase::Idle);
        assert!(c.finish(&mut ui).is_none());
    }

    #[test]
    fn title_names_the_year() {
        let c = CelebrationController::new(DEFAULT_CELEBRATION_DURATION, Vec::<UiId>::new(), TITLE)
            .with_title_prefix("HELLO");
        assert_eq!(c.title_text(2027), "HELLO 2027!");
    }
}
