use crate::overlay::WinOverlay;
use crate::scheduler::BrowserScheduler;
use crate::utils::*;
use clap::Args;
use memorama_core as game;
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

/// Latest snapshot published by the engine, the only thing the view reads from.
#[derive(Clone, Default)]
pub(crate) struct Frame(Rc<RefCell<Option<Rc<game::Snapshot>>>>);

impl Frame {
    fn current(&self) -> Option<Rc<game::Snapshot>> {
        self.0.borrow().clone()
    }
}

impl game::Observer for Frame {
    fn notify(&mut self, snapshot: &game::Snapshot) {
        *self.0.borrow_mut() = Some(Rc::new(snapshot.clone()));
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Flip(game::CardId),
    Timer(game::TimerEvent),
    NewGame,
    SelectDifficulty(game::Difficulty),
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    card: game::CardView,
    callback: Callback<game::CardId>,
}

#[function_component(CardTile)]
fn card_component(props: &CardProps) -> Html {
    let CardProps { card, callback } = props.clone();

    let class = classes!(
        "card",
        card.is_face_visible().then_some("flipped"),
        card.is_matched().then_some("matched"),
    );
    let symbol = if card.is_face_visible() {
        card.face.symbol()
    } else {
        ""
    };

    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("card {} clicked", card.id);
        callback.emit(card.id);
    });

    html! {
        <div {class} {onclick}>
            <div class="card-inner">
                <div class="card-front">{symbol}</div>
                <div class="card-back"/>
            </div>
        </div>
    }
}

#[derive(Args, Properties, Debug, Default, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Difficulty of the first game: easy, medium or hard
    #[arg(short, long, default_value_t)]
    pub difficulty: game::Difficulty,
}

pub(crate) struct GameView {
    engine: game::Engine<BrowserScheduler>,
    frame: Frame,
}

impl GameView {
    fn difficulty_label(difficulty: game::Difficulty) -> &'static str {
        use game::Difficulty::*;
        match difficulty {
            Easy => "Easy (4x4)",
            Medium => "Medium (4x5)",
            Hard => "Hard (6x6)",
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let GameProps { seed, difficulty } = ctx.props().clone();
        let seed = seed.unwrap_or_else(js_random_seed);
        log::debug!("seed: {}", seed);

        let frame = Frame::default();
        let scheduler = BrowserScheduler::new(ctx.link().callback(Msg::Timer));
        let mut engine = game::Engine::new(scheduler, seed);
        engine.subscribe(frame.clone());
        engine.start_game(difficulty);

        Self { engine, frame }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Flip(id) => match self.engine.flip_card(id) {
                Ok(outcome) => {
                    log::debug!("flip {}: {:?}", id, outcome);
                    outcome.has_update()
                }
                Err(err) => {
                    log::error!("rejected flip: {}", err);
                    false
                }
            },
            Timer(event) => self.engine.handle_timer(event).has_update(),
            NewGame => {
                log::debug!("new game");
                self.engine.restart();
                true
            }
            SelectDifficulty(difficulty) => {
                log::debug!("difficulty: {}", difficulty);
                self.engine.set_difficulty(difficulty);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let Some(frame) = self.frame.current() else {
            return html! {};
        };

        let cb_new_game = ctx.link().callback(|_: MouseEvent| NewGame);
        let cb_play_again = ctx.link().callback(|_: MouseEvent| NewGame);
        let cb_flip = ctx.link().callback(Flip);
        let board_style = format!("grid-template-columns: repeat({}, 1fr)", frame.grid.cols);

        html! {
            <div class="memorama">
                <header>
                    <div class="stats">
                        <span>{"Moves: "}<strong id="moves">{frame.moves}</strong></span>
                        <span>{"Time: "}<strong id="timer">{format_secs(frame.elapsed_secs)}</strong></span>
                        <span>{"Score: "}<strong id="score">{frame.score}</strong></span>
                    </div>
                    <nav class="difficulty">
                        {
                            for game::Difficulty::ALL.into_iter().map(|difficulty| {
                                let class = classes!(
                                    "difficulty-btn",
                                    (difficulty == frame.difficulty).then_some("active"),
                                );
                                let onclick = ctx
                                    .link()
                                    .callback(move |_: MouseEvent| SelectDifficulty(difficulty));
                                html! {
                                    <button {class} {onclick} data-difficulty={difficulty.name()}>
                                        {Self::difficulty_label(difficulty)}
                                    </button>
                                }
                            })
                        }
                    </nav>
                    <button id="new-game" onclick={cb_new_game}>{"New Game"}</button>
                </header>
                <div id="game-board" class={classes!("game-board", frame.is_playing().then_some("playable"))} style={board_style}>
                    {
                        for frame.cards.iter().map(|&card| html! {
                            <CardTile {card} callback={cb_flip.clone()}/>
                        })
                    }
                </div>
                {
                    frame
                        .summary()
                        .map(|summary| html! { <WinOverlay {summary} on_play_again={cb_play_again} /> })
                        .unwrap_or_default()
                }
            </div>
        }
    }
}
