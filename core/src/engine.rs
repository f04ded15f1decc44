use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use rand::prelude::*;
use smallvec::SmallVec;

use crate::score::MAX_SCORE;
use crate::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlipOutcome {
    NoChange,
    /// First card of a pair turned up
    Flipped,
    Matched,
    /// Second card differs, both turn back down after [`MISMATCH_DELAY_MS`]
    Mismatched,
    /// Last pair matched
    Won,
}

impl FlipOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TimerOutcome {
    NoChange,
    Ticked,
    /// A mismatched pair turned back down
    Reset,
}

impl TimerOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// The game engine: owns the deal, runs the flip/match rules and keeps moves, time and score.
///
/// Time only advances through [`TimerEvent`]s requested from the [`Scheduler`] and handed back via
/// [`Engine::handle_timer`].
pub struct Engine<S> {
    scheduler: S,
    rng: SmallRng,
    observers: Vec<BoxedObserver>,
    difficulty: Difficulty,
    cards: Vec<Card>,
    face_up: SmallVec<[CardId; 2]>,
    matched_pairs: CardCount,
    moves: u32,
    elapsed_secs: u32,
    score: Score,
    phase: Phase,
    epoch: Epoch,
}

impl<S: Scheduler> Engine<S> {
    pub fn new(scheduler: S, seed: u64) -> Self {
        Self {
            scheduler,
            rng: SmallRng::seed_from_u64(seed),
            observers: Vec::new(),
            difficulty: Default::default(),
            cards: Vec::new(),
            face_up: SmallVec::new(),
            matched_pairs: 0,
            moves: 0,
            elapsed_secs: 0,
            score: MAX_SCORE,
            phase: Default::default(),
            epoch: Default::default(),
        }
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn grid(&self) -> GridShape {
        self.difficulty.grid()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(usize::from(id))
    }

    /// Face-up cards still waiting on resolution, at most two.
    pub fn face_up(&self) -> &[CardId] {
        &self.face_up
    }

    pub fn matched_pairs(&self) -> CardCount {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> CardCount {
        (self.cards.len() / 2) as CardCount
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase.is_playing()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn summary(&self) -> Option<GameSummary> {
        self.phase.is_won().then_some(GameSummary {
            moves: self.moves,
            elapsed_secs: self.elapsed_secs,
            score: self.score,
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            difficulty: self.difficulty,
            grid: self.grid(),
            cards: self.cards.iter().map(CardView::from).collect(),
            moves: self.moves,
            elapsed_secs: self.elapsed_secs,
            score: self.score,
            matched_pairs: self.matched_pairs,
            total_pairs: self.total_pairs(),
            phase: self.phase,
        }
    }

    /// Replaces whatever game was running with a fresh deal for `difficulty` and starts the clock.
    pub fn start_game(&mut self, difficulty: Difficulty) {
        self.scheduler.clear_interval();
        self.epoch = self.epoch.next();

        self.difficulty = difficulty;
        self.cards = deck::deal(difficulty.grid(), &mut self.rng);
        self.face_up.clear();
        self.matched_pairs = 0;
        self.moves = 0;
        self.elapsed_secs = 0;
        self.score = MAX_SCORE;
        self.phase = Phase::Playing;

        self.scheduler
            .set_interval(TICK_PERIOD_MS, TimerEvent::Tick(self.epoch));
        log::debug!(
            "game {} started: {} with {} cards",
            self.epoch,
            difficulty,
            self.cards.len()
        );
        self.notify();
    }

    /// Starts a new game with the current difficulty.
    pub fn restart(&mut self) {
        self.start_game(self.difficulty);
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.start_game(difficulty);
    }

    /// Turns a card face-up, resolving the pair once two are up.
    ///
    /// Flipping while not playing, flipping a card that is already up or matched, and flipping while a mismatched
    /// pair is still showing are all `Ok(NoChange)`. Only an id outside the deal is an error.
    pub fn flip_card(&mut self, id: CardId) -> Result<FlipOutcome> {
        let index = self.validate_id(id)?;

        if !self.phase.is_playing() || self.face_up.len() >= 2 {
            return Ok(FlipOutcome::NoChange);
        }

        let card = &mut self.cards[index];
        if card.is_flipped() || card.is_matched() {
            return Ok(FlipOutcome::NoChange);
        }

        card.turn_up();
        log::trace!("flip card {}: {}", id, card.face().symbol());
        self.face_up.push(id);
        self.notify();

        if self.face_up.len() < 2 {
            return Ok(FlipOutcome::Flipped);
        }

        let outcome = self.resolve_pair();
        self.notify();
        Ok(outcome)
    }

    /// Applies a fired timer.
    ///
    /// Events scheduled by a previous game are dropped, so a late mismatch reset can never touch a newer deal.
    pub fn handle_timer(&mut self, event: TimerEvent) -> TimerOutcome {
        if event.epoch() != self.epoch {
            log::debug!("dropping stale {:?}, current game is {}", event, self.epoch);
            return TimerOutcome::NoChange;
        }

        let outcome = match event {
            TimerEvent::Tick(_) => self.tick(),
            TimerEvent::MismatchReset(_) => self.reset_mismatch(),
        };
        if outcome.has_update() {
            self.notify();
        }
        outcome
    }

    fn resolve_pair(&mut self) -> FlipOutcome {
        self.moves = self.moves.saturating_add(1);
        self.update_score();

        let (first, second) = (usize::from(self.face_up[0]), usize::from(self.face_up[1]));
        if self.cards[first].face() != self.cards[second].face() {
            self.scheduler
                .set_timeout(MISMATCH_DELAY_MS, TimerEvent::MismatchReset(self.epoch));
            return FlipOutcome::Mismatched;
        }

        self.cards[first].mark_matched();
        self.cards[second].mark_matched();
        self.face_up.clear();
        self.matched_pairs += 1;

        if self.matched_pairs == self.total_pairs() {
            self.end_game();
            FlipOutcome::Won
        } else {
            FlipOutcome::Matched
        }
    }

    fn tick(&mut self) -> TimerOutcome {
        if !self.phase.is_playing() {
            return TimerOutcome::NoChange;
        }

        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        self.update_score();
        log::trace!("tick {}s, score {}", self.elapsed_secs, self.score);
        TimerOutcome::Ticked
    }

    fn reset_mismatch(&mut self) -> TimerOutcome {
        if self.face_up.len() < 2 {
            return TimerOutcome::NoChange;
        }

        for id in self.face_up.drain(..) {
            self.cards[usize::from(id)].turn_down();
        }
        TimerOutcome::Reset
    }

    fn end_game(&mut self) {
        if !self.phase.is_playing() {
            return;
        }

        self.phase = Phase::Won;
        self.scheduler.clear_interval();
        log::info!(
            "game {} won: {} moves, {}s, score {}",
            self.epoch,
            self.moves,
            self.elapsed_secs,
            self.score
        );
    }

    fn update_score(&mut self) {
        self.score = score::compute(self.moves, self.elapsed_secs);
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }

        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.notify(&snapshot);
        }
    }

    fn validate_id(&self, id: CardId) -> Result<usize> {
        let index = usize::from(id);
        if index < self.cards.len() {
            Ok(index)
        } else {
            Err(GameError::InvalidCardId {
                id,
                len: self.cards.len(),
            })
        }
    }
}

impl Engine<ManualScheduler> {
    /// Advances virtual time by `ms`, handling every timer that falls due on the way.
    pub fn advance(&mut self, ms: u64) {
        let until_ms = self.scheduler.now_ms().saturating_add(ms);
        while let Some(event) = self.scheduler.pop_due(until_ms) {
            self.handle_timer(event);
        }
        self.scheduler.settle(until_ms);
    }
}

impl<S: fmt::Debug> fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("scheduler", &self.scheduler)
            .field("difficulty", &self.difficulty)
            .field("cards", &self.cards)
            .field("face_up", &self.face_up)
            .field("matched_pairs", &self.matched_pairs)
            .field("moves", &self.moves)
            .field("elapsed_secs", &self.elapsed_secs)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    fn started(difficulty: Difficulty) -> Engine<ManualScheduler> {
        let mut engine = Engine::new(ManualScheduler::new(), 0x5eed);
        engine.start_game(difficulty);
        engine
    }

    fn record(engine: &mut Engine<ManualScheduler>) -> Rc<RefCell<Vec<Snapshot>>> {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        engine.subscribe(move |snapshot: &Snapshot| sink.borrow_mut().push(snapshot.clone()));
        frames
    }

    fn partner_of(engine: &Engine<ManualScheduler>, id: CardId) -> CardId {
        let face = engine.cards()[usize::from(id)].face();
        engine
            .cards()
            .iter()
            .find(|card| card.id() != id && card.face() == face)
            .map(Card::id)
            .unwrap()
    }

    fn unmatched_pair(engine: &Engine<ManualScheduler>) -> (CardId, CardId) {
        let first = engine
            .cards()
            .iter()
            .find(|card| !card.is_matched())
            .map(Card::id)
            .unwrap();
        (first, partner_of(engine, first))
    }

    fn mismatched_pair(engine: &Engine<ManualScheduler>) -> (CardId, CardId) {
        let (first, partner) = unmatched_pair(engine);
        let other = engine
            .cards()
            .iter()
            .find(|card| !card.is_matched() && card.id() != first && card.id() != partner)
            .map(Card::id)
            .unwrap();
        (first, other)
    }

    fn match_next_pair(engine: &mut Engine<ManualScheduler>) -> FlipOutcome {
        let (a, b) = unmatched_pair(engine);
        assert_eq!(engine.flip_card(a).unwrap(), FlipOutcome::Flipped);
        engine.flip_card(b).unwrap()
    }

    #[test]
    fn engine_starts_idle_without_cards() {
        let mut engine = Engine::new(ManualScheduler::new(), 1);

        assert_eq!(engine.phase(), Phase::NotStarted);
        assert!(!engine.scheduler().has_interval());
        assert_eq!(
            engine.flip_card(0),
            Err(GameError::InvalidCardId { id: 0, len: 0 })
        );
    }

    #[test]
    fn start_game_deals_and_resets_counters() {
        let engine = started(Difficulty::Easy);

        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(engine.cards().len(), 16);
        assert_eq!(engine.total_pairs(), 8);
        assert_eq!(engine.moves(), 0);
        assert_eq!(engine.elapsed_secs(), 0);
        assert_eq!(engine.score(), 1000);
        assert!(engine.face_up().is_empty());
        assert!(engine.scheduler().has_interval());
    }

    #[test]
    fn flipping_the_same_card_twice_is_a_no_op() {
        let mut engine = started(Difficulty::Easy);

        assert_eq!(engine.flip_card(4).unwrap(), FlipOutcome::Flipped);
        assert_eq!(engine.flip_card(4).unwrap(), FlipOutcome::NoChange);
        assert_eq!(engine.moves(), 0);
        assert_eq!(engine.face_up(), &[4]);
    }

    #[test]
    fn matched_pair_stays_up_and_ignores_further_flips() {
        let mut engine = started(Difficulty::Easy);
        let (a, b) = unmatched_pair(&engine);

        engine.flip_card(a).unwrap();
        assert_eq!(engine.flip_card(b).unwrap(), FlipOutcome::Matched);
        assert_eq!(engine.moves(), 1);
        assert_eq!(engine.matched_pairs(), 1);
        assert!(engine.face_up().is_empty());
        assert!(engine.card(a).unwrap().is_matched());

        assert_eq!(engine.flip_card(a).unwrap(), FlipOutcome::NoChange);
        assert_eq!(engine.moves(), 1);
        assert!(engine.face_up().is_empty());
    }

    #[test]
    fn mismatch_turns_back_down_after_the_delay() {
        let mut engine = started(Difficulty::Easy);
        let (a, b) = mismatched_pair(&engine);

        engine.flip_card(a).unwrap();
        assert_eq!(engine.flip_card(b).unwrap(), FlipOutcome::Mismatched);
        assert_eq!(engine.moves(), 1);

        engine.advance(u64::from(MISMATCH_DELAY_MS) - 1);
        assert!(engine.card(a).unwrap().is_flipped());
        assert!(engine.card(b).unwrap().is_flipped());

        engine.advance(1);
        assert_eq!(engine.card(a).unwrap().state(), CardState::FaceDown);
        assert_eq!(engine.card(b).unwrap().state(), CardState::FaceDown);
        assert!(engine.face_up().is_empty());
        assert_eq!(engine.moves(), 1);
    }

    #[test]
    fn flips_are_ignored_while_a_mismatch_is_showing() {
        let mut engine = started(Difficulty::Easy);
        let (a, b) = mismatched_pair(&engine);
        let third = engine
            .cards()
            .iter()
            .map(Card::id)
            .find(|&id| id != a && id != b)
            .unwrap();

        engine.flip_card(a).unwrap();
        engine.flip_card(b).unwrap();

        assert_eq!(engine.flip_card(third).unwrap(), FlipOutcome::NoChange);
        assert_eq!(engine.card(third).unwrap().state(), CardState::FaceDown);
        assert_eq!(engine.face_up().len(), 2);
        assert_eq!(engine.moves(), 1);

        engine.advance(u64::from(MISMATCH_DELAY_MS));
        assert_eq!(engine.flip_card(third).unwrap(), FlipOutcome::Flipped);
    }

    #[test]
    fn out_of_range_id_is_an_error_and_changes_nothing() {
        let mut engine = started(Difficulty::Easy);
        let before = engine.snapshot();

        assert_eq!(
            engine.flip_card(16),
            Err(GameError::InvalidCardId { id: 16, len: 16 })
        );
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn score_after_three_moves_and_twelve_seconds() {
        let mut engine = started(Difficulty::Easy);
        assert_eq!(engine.score(), 1000);

        for _ in 0..3 {
            assert_eq!(match_next_pair(&mut engine), FlipOutcome::Matched);
        }
        engine.advance(12_000);

        assert_eq!(engine.moves(), 3);
        assert_eq!(engine.elapsed_secs(), 12);
        assert_eq!(engine.score(), 984);
    }

    #[test]
    fn score_never_increases_and_bottoms_out_at_zero() {
        let mut engine = started(Difficulty::Easy);
        let frames = record(&mut engine);

        for _ in 0..210 {
            let (a, b) = mismatched_pair(&engine);
            engine.flip_card(a).unwrap();
            assert_eq!(engine.flip_card(b).unwrap(), FlipOutcome::Mismatched);
            engine.advance(u64::from(MISMATCH_DELAY_MS));
        }

        assert_eq!(engine.moves(), 210);
        assert_eq!(engine.score(), 0);
        let frames = frames.borrow();
        assert!(frames.windows(2).all(|pair| pair[1].score <= pair[0].score));
    }

    #[test]
    fn clock_ticks_once_per_second() {
        let mut engine = started(Difficulty::Medium);

        engine.advance(5_500);
        assert_eq!(engine.elapsed_secs(), 5);

        engine.advance(500);
        assert_eq!(engine.elapsed_secs(), 6);
    }

    #[test]
    fn new_game_replaces_the_running_clock() {
        let mut engine = started(Difficulty::Easy);
        engine.advance(2_000);
        assert_eq!(engine.elapsed_secs(), 2);

        engine.restart();
        engine.restart();
        engine.advance(3_000);

        assert_eq!(engine.elapsed_secs(), 3);
        assert_eq!(engine.score(), 1000);
    }

    #[test]
    fn stale_mismatch_reset_does_not_touch_a_new_game() {
        let mut engine = started(Difficulty::Easy);
        let (a, b) = mismatched_pair(&engine);
        engine.flip_card(a).unwrap();
        engine.flip_card(b).unwrap();
        assert_eq!(engine.scheduler().pending_timeouts(), 1);

        engine.start_game(Difficulty::Easy);
        assert_eq!(engine.flip_card(0).unwrap(), FlipOutcome::Flipped);

        engine.advance(u64::from(MISMATCH_DELAY_MS));
        assert_eq!(engine.scheduler().pending_timeouts(), 0);
        assert_eq!(engine.face_up(), &[0]);
        assert!(engine.card(0).unwrap().is_flipped());
    }

    #[test]
    fn due_timers_can_be_delivered_by_the_host() {
        let mut engine = started(Difficulty::Easy);
        let (a, b) = mismatched_pair(&engine);
        engine.flip_card(a).unwrap();
        engine.flip_card(b).unwrap();

        let tick = engine.scheduler_mut().pop_due(1_000).unwrap();
        assert_eq!(tick, TimerEvent::Tick(engine.epoch()));
        assert_eq!(engine.handle_timer(tick), TimerOutcome::Ticked);

        let reset = engine.scheduler_mut().pop_due(1_000).unwrap();
        assert_eq!(reset, TimerEvent::MismatchReset(engine.epoch()));
        assert_eq!(engine.handle_timer(reset), TimerOutcome::Reset);

        assert_eq!(engine.scheduler_mut().pop_due(1_000), None);
        assert_eq!(engine.elapsed_secs(), 1);
        assert!(engine.face_up().is_empty());
    }

    #[test]
    fn stale_events_are_reported_as_no_change() {
        let mut engine = started(Difficulty::Easy);
        let old_epoch = engine.epoch();
        engine.restart();

        assert_eq!(
            engine.handle_timer(TimerEvent::Tick(old_epoch)),
            TimerOutcome::NoChange
        );
        assert_eq!(engine.elapsed_secs(), 0);
        assert_eq!(
            engine.handle_timer(TimerEvent::Tick(engine.epoch())),
            TimerOutcome::Ticked
        );
    }

    #[test]
    fn matching_every_pair_wins_exactly_once() {
        let mut engine = started(Difficulty::Easy);
        let frames = record(&mut engine);
        engine.advance(4_000);

        for _ in 0..7 {
            assert_eq!(match_next_pair(&mut engine), FlipOutcome::Matched);
            assert!(engine.is_playing());
        }
        assert_eq!(match_next_pair(&mut engine), FlipOutcome::Won);

        assert_eq!(engine.phase(), Phase::Won);
        assert_eq!(engine.matched_pairs(), 8);
        assert!(!engine.scheduler().has_interval());
        assert_eq!(
            engine.summary(),
            Some(GameSummary {
                moves: 8,
                elapsed_secs: 4,
                score: 960,
            })
        );

        engine.advance(10_000);
        assert_eq!(engine.flip_card(0).unwrap(), FlipOutcome::NoChange);
        assert_eq!(engine.elapsed_secs(), 4);

        let frames = frames.borrow();
        let wins: Vec<_> = frames.iter().filter(|frame| frame.is_won()).collect();
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].summary(), engine.summary());
    }

    #[test]
    fn set_difficulty_restarts_with_new_grid() {
        let mut engine = started(Difficulty::Easy);
        match_next_pair(&mut engine);
        let epoch = engine.epoch();

        engine.set_difficulty(Difficulty::Hard);
        assert_eq!(engine.difficulty(), Difficulty::Hard);
        assert_eq!(engine.cards().len(), 36);
        assert_eq!(engine.moves(), 0);
        assert_eq!(engine.matched_pairs(), 0);
        assert!(engine.epoch() > epoch);

        engine.restart();
        assert_eq!(engine.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn observers_see_every_change() {
        let mut engine = Engine::new(ManualScheduler::new(), 9);
        let frames = record(&mut engine);

        engine.start_game(Difficulty::Easy);
        let (a, b) = mismatched_pair(&engine);
        engine.flip_card(a).unwrap();
        engine.flip_card(b).unwrap();
        engine.advance(u64::from(MISMATCH_DELAY_MS));

        let frames = frames.borrow();
        let moves: Vec<u32> = frames.iter().map(|frame| frame.moves).collect();
        // start, first flip, second flip, resolution, tick, reset
        assert_eq!(moves, [0, 0, 0, 1, 1, 1]);
        assert!(frames.last().unwrap().cards.iter().all(|card| !card.is_face_visible()));
    }

    #[test]
    fn snapshot_serializes_for_renderers() {
        let mut engine = started(Difficulty::Medium);
        engine.flip_card(2).unwrap();

        let value = serde_json::to_value(engine.snapshot()).unwrap();

        assert_eq!(value["difficulty"], "medium");
        assert_eq!(value["grid"]["cols"], 5);
        assert_eq!(value["phase"], "Playing");
        assert_eq!(value["score"], 1000);
        assert_eq!(value["cards"].as_array().unwrap().len(), 20);
        assert_eq!(value["cards"][2]["state"], "FaceUp");
    }
}
