//! Time allocation for UCI clocks
//!
//! Turns `go` clock parameters into the per-move budget checked by iterative
//! deepening between passes.

use crate::search::params::TimeManagement as TM;

/// Budgets never drop below this many milliseconds
const MIN_BUDGET_MS: u64 = 10;

pub struct TimeManager;

impl TimeManager {
    /// Compute milliseconds to allocate given TimeManagement and go parameters
    ///
    /// A fixed `movetime` wins. Otherwise the mover's remaining clock is split
    /// over the moves still to play, plus 80% of the increment. Without any
    /// clock the configured per-move default applies.
    #[allow(clippy::too_many_arguments)]
    pub fn allocate_time(
        time_mgmt: &TM,
        wtime: Option<u64>,
        btime: Option<u64>,
        winc: Option<u64>,
        binc: Option<u64>,
        movetime: Option<u64>,
        movestogo: Option<u64>,
        side_is_white: bool,
    ) -> u64 {
        if let Some(mt) = movetime {
            return mt;
        }

        // at least 2 so the last move before a time control is not given everything
        let moves_to_go = movestogo.unwrap_or(time_mgmt.moves_to_go).max(2);

        let (remaining, increment) = if side_is_white {
            (wtime, winc)
        } else {
            (btime, binc)
        };

        match remaining {
            Some(clock) => {
                let base_time = (clock / moves_to_go).max(MIN_BUDGET_MS);
                let increment_bonus = increment.map(|inc| (inc * 8) / 10).unwrap_or(0);
                base_time + increment_bonus
            }
            None => time_mgmt.msec_per_move,
        }
    }
}
