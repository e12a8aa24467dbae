//! Search input debouncing.
//!
//! Keystrokes arrive on one channel; a search term is forwarded only after
//! the input has been quiet for the debounce delay. A newer keystroke
//! cancels the pending one. Closing the input flushes whatever is pending.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::controller::ControlEvent;
use crate::render::SEARCH_DEBOUNCE_MS;

pub struct SearchDebouncer {
    delay: Duration,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(SEARCH_DEBOUNCE_MS))
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Forward debounced search terms from `input` to `output` as
    /// `ControlEvent::Search`. Returns when `input` closes or `output` is
    /// dropped.
    pub async fn run(&self, mut input: mpsc::Receiver<String>, output: mpsc::Sender<ControlEvent>) {
        let mut pending: Option<(String, Instant)> = None;

        loop {
            match pending.take() {
                None => match input.recv().await {
                    Some(term) => pending = Some((term, Instant::now() + self.delay)),
                    None => return,
                },
                Some((term, deadline)) => {
                    tokio::select! {
                        next = input.recv() => match next {
                            Some(newer) => pending = Some((newer, Instant::now() + self.delay)),
                            None => {
                                let _ = output.send(ControlEvent::Search(term)).await;
                                return;
                            }
                        },
                        _ = sleep_until(deadline) => {
                            tracing::debug!("Search settled on '{}'", term);
                            if output.send(ControlEvent::Search(term)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_debouncer() -> (mpsc::Sender<String>, mpsc::Receiver<ControlEvent>) {
        let (in_tx, in_rx) = mpsc::channel(16);
        let (out_tx, out_rx) = mpsc::channel(16);
        tokio::spawn(async move { SearchDebouncer::default().run(in_rx, out_tx).await });
        (in_tx, out_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_yields_last_value_only() {
        let (input, mut output) = spawn_debouncer();

        for term in ["y", "yo", "you", "youth"] {
            input.send(term.to_string()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(output.try_recv().unwrap(), ControlEvent::Search("youth".into()));
        assert!(output.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_pauses_emit_separately() {
        let (input, mut output) = spawn_debouncer();

        input.send("arts".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(350)).await;
        input.send("sport".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(output.recv().await, Some(ControlEvent::Search("arts".into())));
        assert_eq!(output.recv().await, Some(ControlEvent::Search("sport".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_before_delay_and_flush_on_close() {
        let (input, mut output) = spawn_debouncer();

        input.send("pass".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(output.try_recv().is_err());

        drop(input);
        assert_eq!(output.recv().await, Some(ControlEvent::Search("pass".into())));
        assert_eq!(output.recv().await, None);
    }
}
