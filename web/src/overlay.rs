use memorama_core::GameSummary;
use yew::prelude::*;

use crate::utils::*;

#[derive(Properties, PartialEq)]
pub(crate) struct WinOverlayProps {
    pub summary: GameSummary,
    pub on_play_again: Callback<MouseEvent>,
}

#[function_component]
pub(crate) fn WinOverlay(props: &WinOverlayProps) -> Html {
    let GameSummary {
        moves,
        elapsed_secs,
        score,
    } = props.summary;

    html! {
        <Modal>
            <dialog id="congratulations" open={true}>
                <article>
                    <h2>{"Congratulations!"}</h2>
                    <p>{"You found every pair."}</p>
                    <ul>
                        <li>{"Moves: "}<strong id="final-moves">{moves}</strong></li>
                        <li>{"Time: "}<strong id="final-time">{format_secs(elapsed_secs)}</strong></li>
                        <li>{"Score: "}<strong id="final-score">{score}</strong></li>
                    </ul>
                    <footer>
                        <button id="play-again" onclick={props.on_play_again.clone()}>{"Play Again"}</button>
                    </footer>
                </article>
            </dialog>
        </Modal>
    }
}
