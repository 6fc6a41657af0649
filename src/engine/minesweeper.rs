//! Minesweeper: reveal safe cells on a 24-cell board and cash out before hitting a mine.

use std::collections::BTreeSet;

use crate::{
    engine::{random::RandomSource, scale_float, Wager},
    error::game::GameError,
};

pub const GRID_CELLS: usize = 24;
pub const MIN_MINES: usize = 1;
pub const MAX_MINES: usize = 5;

fn base_multiplier(mines: usize) -> f64 {
    match mines {
        1 => 1.1,
        2 => 1.2,
        3 => 1.3,
        4 => 1.5,
        _ => 1.8,
    }
}

/// Payout multiplier after `revealed` safe cells on a board with `mines` mines.
///
/// `base × (1.2 + 0.15·mines)^p × (1 + p²·0.3·mines)` where `p` is the fraction of safe
/// cells revealed, floored at 1.0.
pub fn multiplier(mines: usize, revealed: usize) -> f64 {
    let base = base_multiplier(mines);
    let safe = (GRID_CELLS - mines) as f64;
    let progress = revealed as f64 / safe;
    let mines = mines as f64;

    let growth = (1.2 + 0.15 * mines).powf(progress);
    let bonus = 1.0 + progress * progress * 0.3 * mines;

    (base * growth * bonus).max(1.0)
}

/// Multipliers for every reveal count from 0 to all safe cells.
pub fn multiplier_curve(mines: usize) -> Vec<f64> {
    (0..=GRID_CELLS - mines)
        .map(|revealed| multiplier(mines, revealed))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinesweeperPhase {
    Active,
    /// Hit a mine at this cell.
    Lost { cell: usize },
    /// Cashed out, or cleared every safe cell.
    Won { payout: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Safe { revealed: usize },
    Mine,
    Cleared { payout: i64 },
}

#[derive(Debug, Clone)]
pub struct MinesweeperGame {
    bet: i64,
    mines: BTreeSet<usize>,
    revealed: BTreeSet<usize>,
    curve: Vec<f64>,
    phase: MinesweeperPhase,
}

impl MinesweeperGame {
    pub fn check_mine_count(mines: usize) -> Result<(), GameError> {
        if (MIN_MINES..=MAX_MINES).contains(&mines) {
            Ok(())
        } else {
            Err(GameError::invalid(format!(
                "Mine count must be between {MIN_MINES} and {MAX_MINES}."
            )))
        }
    }

    /// Places `mine_count` unique mines with a partial Fisher-Yates shuffle.
    pub fn new(bet: i64, mine_count: usize, rng: &mut impl RandomSource) -> Result<Self, GameError> {
        Self::check_mine_count(mine_count)?;

        let mut cells: Vec<usize> = (0..GRID_CELLS).collect();
        for i in 0..mine_count {
            let j = rng.randint(i as i64, (GRID_CELLS - 1) as i64) as usize;
            cells.swap(i, j);
        }

        Ok(Self::with_mines(bet, cells[..mine_count].iter().copied().collect()))
    }

    pub(crate) fn with_mines(bet: i64, mines: BTreeSet<usize>) -> Self {
        let curve = multiplier_curve(mines.len());
        Self {
            bet,
            mines,
            revealed: BTreeSet::new(),
            curve,
            phase: MinesweeperPhase::Active,
        }
    }

    pub fn bet(&self) -> i64 {
        self.bet
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn safe_cells(&self) -> usize {
        GRID_CELLS - self.mines.len()
    }

    pub fn phase(&self) -> MinesweeperPhase {
        self.phase
    }

    pub fn revealed(&self) -> &BTreeSet<usize> {
        &self.revealed
    }

    /// Mine positions, only once the round is over.
    pub fn mines(&self) -> Option<&BTreeSet<usize>> {
        match self.phase {
            MinesweeperPhase::Active => None,
            _ => Some(&self.mines),
        }
    }

    pub fn current_multiplier(&self) -> f64 {
        self.curve[self.revealed.len()]
    }

    /// What cashing out right now would pay.
    pub fn current_payout(&self) -> i64 {
        scale_float(self.bet, self.current_multiplier())
    }

    pub fn check_reveal(&self, cell: usize) -> Result<(), GameError> {
        if self.phase != MinesweeperPhase::Active {
            return Err(GameError::invalid("This board is already finished."));
        }
        if cell >= GRID_CELLS {
            return Err(GameError::invalid(format!(
                "Pick a cell between 1 and {GRID_CELLS}."
            )));
        }
        if self.revealed.contains(&cell) {
            return Err(GameError::invalid("That cell is already revealed."));
        }
        Ok(())
    }

    /// Reveals a zero-based cell.
    pub fn reveal(&mut self, cell: usize) -> Result<RevealOutcome, GameError> {
        self.check_reveal(cell)?;

        if self.mines.contains(&cell) {
            self.phase = MinesweeperPhase::Lost { cell };
            return Ok(RevealOutcome::Mine);
        }

        self.revealed.insert(cell);
        if self.revealed.len() == self.safe_cells() {
            let payout = self.current_payout();
            self.phase = MinesweeperPhase::Won { payout };
            return Ok(RevealOutcome::Cleared { payout });
        }

        Ok(RevealOutcome::Safe {
            revealed: self.revealed.len(),
        })
    }

    pub fn check_cash_out(&self) -> Result<(), GameError> {
        if self.phase != MinesweeperPhase::Active {
            return Err(GameError::invalid("This board is already finished."));
        }
        if self.revealed.is_empty() {
            return Err(GameError::invalid("Reveal at least one cell before cashing out."));
        }
        Ok(())
    }

    pub fn cash_out(&mut self) -> Result<i64, GameError> {
        self.check_cash_out()?;
        let payout = self.current_payout();
        self.phase = MinesweeperPhase::Won { payout };
        Ok(payout)
    }
}

impl Wager for MinesweeperGame {
    fn stake_at_risk(&self) -> i64 {
        match self.phase {
            MinesweeperPhase::Active => self.bet,
            _ => 0,
        }
    }
}
