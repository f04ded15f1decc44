use gloo::timers::callback::{Interval, Timeout};
use memorama_core::{Scheduler, TimerEvent};
use yew::Callback;

/// Browser clock, fired timers are emitted on `deliver`, which the view wires to `Msg::Timer`.
pub(crate) struct BrowserScheduler {
    deliver: Callback<TimerEvent>,
    ticker: Option<Interval>,
}

impl BrowserScheduler {
    pub(crate) fn new(deliver: Callback<TimerEvent>) -> Self {
        Self {
            deliver,
            ticker: None,
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn set_interval(&mut self, period_ms: u32, event: TimerEvent) {
        let deliver = self.deliver.clone();
        // replacing the old `Interval` drops it, which cancels it
        self.ticker = Some(Interval::new(period_ms, move || deliver.emit(event)));
    }

    fn clear_interval(&mut self) {
        drop(self.ticker.take());
    }

    fn set_timeout(&mut self, delay_ms: u32, event: TimerEvent) {
        let deliver = self.deliver.clone();
        // must outlive this call, a superseded game's reset is filtered by its epoch
        let _ = Timeout::new(delay_ms, move || deliver.emit(event)).forget();
    }
}
