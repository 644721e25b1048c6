//! Live feed producer.
//!
//! A worker thread polls a FrameSource, decodes each frame and sends the
//! first payload found over a channel. The thread that owns the history
//! receives payloads through a Subscription and applies them there; the
//! worker never touches the history itself.
//!
//! start() on a running feed and stop() on a stopped feed do nothing.
//! Dropping the feed stops the worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::frames::{FramePoll, FrameSource};
use super::{decode_image, DEFAULT_MAX_DIMENSION};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    /// Wait between polls while the source has no new frame.
    pub poll_interval: Duration,
    pub max_dimension: u32,
}

impl Default for FeedOptions {
    fn default() -> Self {
        FeedOptions {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

enum FeedState<S> {
    Stopped(S),
    Running {
        stop: Arc<AtomicBool>,
        worker: JoinHandle<S>,
    },
    /// The worker panicked and took the source with it.
    Lost,
}

pub struct LiveFeed<S: FrameSource + 'static> {
    state: FeedState<S>,
    torch: Arc<AtomicBool>,
    options: FeedOptions,
}

impl<S: FrameSource + 'static> LiveFeed<S> {
    pub fn new(source: S, options: FeedOptions) -> Self {
        LiveFeed {
            state: FeedState::Stopped(source),
            torch: Arc::new(AtomicBool::new(false)),
            options,
        }
    }

    /// Starts sampling frames. Returns `None` if the feed is still running
    /// or its source was lost.
    pub fn start(&mut self) -> Option<Subscription> {
        // a worker that ended on its own is reclaimed before restarting
        if matches!(&self.state, FeedState::Running { worker, .. } if worker.is_finished()) {
            self.stop();
        }

        let source = match std::mem::replace(&mut self.state, FeedState::Lost) {
            FeedState::Stopped(source) => source,
            other => {
                self.state = other;
                return None;
            }
        };

        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let stop = Arc::clone(&stop);
            let torch = Arc::clone(&self.torch);
            let options = self.options;
            thread::spawn(move || sample(source, tx, stop, torch, options))
        };

        log::debug!("live feed started");
        self.state = FeedState::Running { stop, worker };
        Some(Subscription { rx })
    }

    pub fn stop(&mut self) {
        let (stop, worker) = match std::mem::replace(&mut self.state, FeedState::Lost) {
            FeedState::Running { stop, worker } => (stop, worker),
            other => {
                self.state = other;
                return;
            }
        };

        stop.store(true, Ordering::Relaxed);
        match worker.join() {
            Ok(source) => {
                log::debug!("live feed stopped");
                self.state = FeedState::Stopped(source);
            }
            Err(_) => log::error!("live feed worker panicked, frame source lost"),
        }
    }

    /// True while the worker is sampling frames.
    pub fn is_running(&self) -> bool {
        matches!(&self.state, FeedState::Running { worker, .. } if !worker.is_finished())
    }

    /// Switches the illumination aid. Has no effect on decoding.
    pub fn set_torch(&mut self, on: bool) {
        self.torch.store(on, Ordering::Relaxed);
        if let FeedState::Stopped(source) = &mut self.state {
            apply_torch(source, on);
        }
    }

    pub fn torch(&self) -> bool {
        self.torch.load(Ordering::Relaxed)
    }

    /// The frame source, available while the feed is stopped.
    pub fn source(&self) -> Option<&S> {
        match &self.state {
            FeedState::Stopped(source) => Some(source),
            _ => None,
        }
    }
}

impl<S: FrameSource + 'static> Drop for LiveFeed<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn apply_torch<S: FrameSource>(source: &mut S, on: bool) {
    if source.has_illumination() {
        source.set_illumination(on);
        log::debug!("torch {}", if on { "on" } else { "off" });
    } else if on {
        log::warn!("{} source has no illumination aid", source.name());
    }
}

fn sample<S: FrameSource>(
    mut source: S,
    tx: Sender<String>,
    stop: Arc<AtomicBool>,
    torch: Arc<AtomicBool>,
    options: FeedOptions,
) -> S {
    let mut applied_torch = None;

    while !stop.load(Ordering::Relaxed) {
        let wanted = torch.load(Ordering::Relaxed);
        if applied_torch != Some(wanted) {
            apply_torch(&mut source, wanted);
            applied_torch = Some(wanted);
        }

        match source.next_frame() {
            FramePoll::Frame(frame) => {
                let Some(payload) = decode_image(&frame, options.max_dimension) else {
                    continue;
                };
                // receiver dropped, nobody is listening anymore
                if tx.send(payload).is_err() {
                    log::debug!("live feed subscription dropped");
                    break;
                }
            }
            FramePoll::Idle => thread::sleep(options.poll_interval),
            FramePoll::Closed => {
                log::info!("{} frame source closed", source.name());
                break;
            }
        }
    }

    source
}

#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    Payload(String),
    Timeout,
    /// The worker has exited; no more payloads will arrive.
    Ended,
}

/// Receiving end of a running feed. Dropping it deregisters the consumer.
pub struct Subscription {
    rx: Receiver<String>,
}

impl Subscription {
    pub fn recv_timeout(&self, timeout: Duration) -> Delivery {
        match self.rx.recv_timeout(timeout) {
            Ok(payload) => Delivery::Payload(payload),
            Err(RecvTimeoutError::Timeout) => Delivery::Timeout,
            Err(RecvTimeoutError::Disconnected) => Delivery::Ended,
        }
    }

    /// Hands payloads to `on_decoded` on the calling thread until the feed
    /// ends or `deadline` passes. Returns the number of payloads delivered.
    pub fn dispatch_until(
        &self,
        deadline: Option<Instant>,
        mut on_decoded: impl FnMut(String),
    ) -> usize {
        let mut delivered = 0;

        loop {
            let next = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    self.recv_timeout(deadline - now)
                }
                None => match self.rx.recv() {
                    Ok(payload) => Delivery::Payload(payload),
                    Err(_) => Delivery::Ended,
                },
            };

            match next {
                Delivery::Payload(payload) => {
                    on_decoded(payload);
                    delivered += 1;
                }
                Delivery::Timeout => continue,
                Delivery::Ended => break,
            }
        }

        delivered
    }
}
