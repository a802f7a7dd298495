use crate::board::State;
use crate::random::RandomGenerator;

/// Chooses moves during the simulation phase.
pub trait RolloutPolicy<S: State> {
    /// Picks one of `moves` for the player to move in `state`.
    ///
    /// Returns `None` only when `moves` is empty.
    fn choose<K: RandomGenerator>(
        &self,
        state: &S,
        moves: &[S::Move],
        rng: &mut K,
    ) -> Option<S::Move>;
}

/// Picks uniformly among the legal moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRollout;

impl<S: State> RolloutPolicy<S> for RandomRollout {
    fn choose<K: RandomGenerator>(
        &self,
        _state: &S,
        moves: &[S::Move],
        rng: &mut K,
    ) -> Option<S::Move> {
        rng.get_random_from_slice(moves).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::tic_tac_toe::TicTacToeState;
    use crate::random::SeededRandomGenerator;

    #[test]
    fn random_rollout_picks_a_legal_move() {
        let state = TicTacToeState::new();
        let moves = state.moves(state.player());
        let mut rng = SeededRandomGenerator::new(5);
        for _ in 0..20 {
            let mv = RandomRollout.choose(&state, &moves, &mut rng).unwrap();
            assert!(moves.contains(&mv));
        }
    }

    #[test]
    fn random_rollout_without_moves_is_none() {
        let state = TicTacToeState::new();
        let mut rng = SeededRandomGenerator::new(5);
        assert!(RandomRollout.choose(&state, &[], &mut rng).is_none());
    }
}
