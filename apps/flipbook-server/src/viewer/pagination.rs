//! Pagination controller
//!
//! Single source of truth for navigation. UI commands go through
//! [`PaginationController::next`] / [`PaginationController::previous`], which
//! return the command the flip renderer must execute. Moves that originate in
//! the renderer (drag, corner click) arrive via
//! [`PaginationController::external_jump`] and never produce a command, so the
//! two sides cannot ping-pong.

use serde::Serialize;

/// Navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum PaginationState {
    #[default]
    Empty,
    Ready { current: usize, total: usize },
}

/// Command to forward to the flip renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Previous,
}

#[derive(Debug, Default)]
pub struct PaginationController {
    state: PaginationState,
}

impl PaginationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    /// Current page, 0 when empty
    pub fn current_page(&self) -> usize {
        match self.state {
            PaginationState::Empty => 0,
            PaginationState::Ready { current, .. } => current,
        }
    }

    pub fn total_pages(&self) -> usize {
        match self.state {
            PaginationState::Empty => 0,
            PaginationState::Ready { total, .. } => total,
        }
    }

    /// Enter `Ready(1, total)`; a zero-page document stays `Empty`
    pub fn load(&mut self, total: usize) {
        self.state = if total == 0 {
            PaginationState::Empty
        } else {
            PaginationState::Ready { current: 1, total }
        };
    }

    /// Advance one page; `None` at the last page or when empty
    pub fn next(&mut self) -> Option<NavCommand> {
        match &mut self.state {
            PaginationState::Ready { current, total } if *current < *total => {
                *current += 1;
                Some(NavCommand::Next)
            }
            _ => None,
        }
    }

    /// Go back one page; `None` at the first page or when empty
    pub fn previous(&mut self) -> Option<NavCommand> {
        match &mut self.state {
            PaginationState::Ready { current, .. } if *current > 1 => {
                *current -= 1;
                Some(NavCommand::Previous)
            }
            _ => None,
        }
    }

    /// Adopt a page reported by the renderer
    ///
    /// Out-of-range pages are dropped. Returns whether the state changed.
    pub fn external_jump(&mut self, page: usize) -> bool {
        match &mut self.state {
            PaginationState::Ready { current, total } => {
                if page == 0 || page > *total {
                    tracing::warn!(
                        "Ignoring renderer jump to page {} (document has {} pages)",
                        page,
                        total
                    );
                    return false;
                }
                let changed = *current != page;
                *current = page;
                changed
            }
            PaginationState::Empty => {
                tracing::warn!("Ignoring renderer jump to page {} with no document", page);
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.state = PaginationState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(total: usize) -> PaginationController {
        let mut controller = PaginationController::new();
        controller.load(total);
        controller
    }

    #[test]
    fn test_load_starts_at_first_page() {
        let controller = ready(5);
        assert_eq!(controller.state(), PaginationState::Ready { current: 1, total: 5 });
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.total_pages(), 5);
    }

    #[test]
    fn test_load_zero_pages_stays_empty() {
        let controller = ready(0);
        assert_eq!(controller.state(), PaginationState::Empty);
        assert_eq!(controller.current_page(), 0);
    }

    #[test]
    fn test_next_and_previous_bounds() {
        let mut controller = ready(3);
        assert_eq!(controller.previous(), None);
        assert_eq!(controller.current_page(), 1);

        assert_eq!(controller.next(), Some(NavCommand::Next));
        assert_eq!(controller.next(), Some(NavCommand::Next));
        assert_eq!(controller.current_page(), 3);
        assert_eq!(controller.next(), None);
        assert_eq!(controller.current_page(), 3);

        assert_eq!(controller.previous(), Some(NavCommand::Previous));
        assert_eq!(controller.previous(), Some(NavCommand::Previous));
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn test_step_is_noop_only_at_bounds() {
        for total in 1..=6 {
            for start in 1..=total {
                let mut controller = ready(total);
                controller.external_jump(start);

                let moved = controller.next().is_some();
                assert_eq!(moved, start != total);
                assert_eq!(controller.current_page(), if moved { start + 1 } else { start });

                let mut controller = ready(total);
                controller.external_jump(start);
                let moved = controller.previous().is_some();
                assert_eq!(moved, start != 1);
                assert_eq!(controller.current_page(), if moved { start - 1 } else { start });
            }
        }
    }

    #[test]
    fn test_empty_ignores_navigation() {
        let mut controller = PaginationController::new();
        assert_eq!(controller.next(), None);
        assert_eq!(controller.previous(), None);
        assert!(!controller.external_jump(1));
        assert_eq!(controller.state(), PaginationState::Empty);
    }

    #[test]
    fn test_external_jump_range() {
        let mut controller = ready(4);
        assert!(controller.external_jump(4));
        assert_eq!(controller.current_page(), 4);
        assert!(!controller.external_jump(4));
        assert!(!controller.external_jump(0));
        assert!(!controller.external_jump(5));
        assert_eq!(controller.current_page(), 4);
    }

    #[test]
    fn test_clear() {
        let mut controller = ready(2);
        controller.next();
        controller.clear();
        assert_eq!(controller.state(), PaginationState::Empty);
        assert_eq!(controller.total_pages(), 0);
    }
}
