use super::{Renderer, format_date, neutralize_block, neutralize_line};
use crate::storage::Problem;

/// One displayed problem, with user text already made terminal-safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemCard {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub date: String,
    pub code: Vec<String>,
}

impl ProblemCard {
    pub fn project(problem: &Problem) -> Self {
        ProblemCard {
            id: problem.id.clone(),
            title: neutralize_line(&problem.title),
            topic: neutralize_line(&problem.topic),
            difficulty: neutralize_line(&problem.difficulty),
            date: format_date(&problem.date),
            code: neutralize_block(&problem.code),
        }
    }
}

/// Per-card actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Edit,
    Delete,
}

/// Terminal renderer state: the cards currently on screen plus the cursor.
/// Rendering replaces both, so actions only ever target displayed records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListView {
    cards: Vec<ProblemCard>,
    selected: usize,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[ProblemCard] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&ProblemCard> {
        self.cards.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.cards.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// ID of the record an action on the selected card applies to
    pub fn action_target(&self, action: CardAction) -> Option<(CardAction, &str)> {
        self.selected().map(|card| (action, card.id.as_str()))
    }
}

impl Renderer for ListView {
    fn render(&mut self, problems: &[Problem]) {
        self.cards = problems.iter().map(ProblemCard::project).collect();
        self.selected = 0;
        log::debug!("rendered {} cards", self.cards.len());
    }
}
