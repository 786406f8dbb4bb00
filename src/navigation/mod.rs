//! Page navigation controls: previous/next buttons and a rank input

/// A user interaction with the navigation controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Previous,
    Next,
    GoTo(u32),
}

/// Parse the rank input box; clamps into `1..=page_count`
pub fn parse_rank_input(input: &str, page_count: usize) -> Option<NavCommand> {
    let rank: u32 = input.trim().parse().ok()?;
    let max = u32::try_from(page_count).ok().filter(|n| *n > 0)?;
    Some(NavCommand::GoTo(rank.clamp(1, max)))
}

/// State of the navigation controls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationUi {
    attached: bool,
    displayed_rank: Option<u32>,
    page_count: usize,
}

impl NavigationUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, page_count: usize) {
        self.attached = true;
        self.page_count = page_count;
    }

    pub fn detach(&mut self) {
        *self = Self::default();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn displayed_rank(&self) -> Option<u32> {
        self.displayed_rank
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Refresh the displayed rank after a page change
    pub fn update(&mut self, rank: u32, page_count: usize) {
        if self.attached {
            self.displayed_rank = Some(rank);
            self.page_count = page_count;
        }
    }

    /// Rank a command leads to, if it leads anywhere
    pub fn target_rank(&self, command: NavCommand) -> Option<u32> {
        if !self.attached || self.page_count == 0 {
            return None;
        }
        let last = self.page_count as u32;
        let current = self.displayed_rank.unwrap_or(1);
        let target = match command {
            NavCommand::Previous => current.checked_sub(1).filter(|r| *r >= 1)?,
            NavCommand::Next => Some(current + 1).filter(|r| *r <= last)?,
            NavCommand::GoTo(rank) => rank.clamp(1, last),
        };
        (target != current || self.displayed_rank.is_none()).then_some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_controls_do_nothing() {
        let mut ui = NavigationUi::new();
        assert_eq!(ui.target_rank(NavCommand::Next), None);
        ui.update(2, 3);
        assert_eq!(ui.displayed_rank(), None);
    }

    #[test]
    fn test_prev_next_bounds() {
        let mut ui = NavigationUi::new();
        ui.attach(3);
        ui.update(1, 3);
        assert_eq!(ui.target_rank(NavCommand::Previous), None);
        assert_eq!(ui.target_rank(NavCommand::Next), Some(2));

        ui.update(3, 3);
        assert_eq!(ui.target_rank(NavCommand::Next), None);
        assert_eq!(ui.target_rank(NavCommand::Previous), Some(2));
        assert_eq!(ui.target_rank(NavCommand::GoTo(3)), None);
        assert_eq!(ui.target_rank(NavCommand::GoTo(9)), None);
        assert_eq!(ui.target_rank(NavCommand::GoTo(0)), Some(1));
    }

    #[test]
    fn test_parse_rank_input() {
        assert_eq!(parse_rank_input(" 2 ", 3), Some(NavCommand::GoTo(2)));
        assert_eq!(parse_rank_input("12", 3), Some(NavCommand::GoTo(3)));
        assert_eq!(parse_rank_input("two", 3), None);
        assert_eq!(parse_rank_input("1", 0), None);
    }

    #[test]
    fn test_detach_resets() {
        let mut ui = NavigationUi::new();
        ui.attach(2);
        ui.update(2, 2);
        ui.detach();
        assert!(!ui.is_attached());
        assert_eq!(ui.displayed_rank(), None);
    }
}
