//! Startup pipeline and event handling.
//!
//! The controller is the only owner of [`AppState`]. Sync events are taken
//! off a single queue and each one is applied completely (parse, replace,
//! paint) before the next, so repaints follow arrival order.

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use kart_network::{load_layout, SyncClient, SyncEvent, SyncHandle};
use kart_protocol::ConnectionState;
use kart_state::{AppState, FileCache, LogCategory, NameState, RenderedGrid, StateError};

use crate::config::KartConfig;

pub struct Controller {
    state: AppState,
    sync: SyncHandle,
    events: mpsc::Receiver<SyncEvent>,
}

impl Controller {
    /// Fetch and parse the layout, render it, paint the initial names, then
    /// connect to the name server.
    ///
    /// Layout failures abort here: nothing is rendered from a missing or
    /// empty layout.
    pub async fn start(config: &KartConfig) -> anyhow::Result<Self> {
        let endpoint = config.sync.endpoint()?;

        let layout = load_layout(&config.layout.source)
            .await
            .with_context(|| format!("cannot start without layout {}", config.layout.source))?;
        let grid = RenderedGrid::render(&layout);
        tracing::info!(
            source = %config.layout.source,
            columns = layout.columns(),
            spots = layout.spot_count(),
            blanks = layout.blank_count(),
            "Layout ready"
        );

        let cache = config
            .names
            .resolved_cache_path()
            .map(|path| FileCache::load(&path))
            .unwrap_or_default();
        let names = NameState::initial(&cache, &config.names.cache_key, config.names.default_count);

        let mut state = AppState::new(grid, names, endpoint.to_string());
        state.push_log(
            LogCategory::Layout,
            format!(
                "Layout {}: {} columns, {} spots",
                config.layout.source,
                layout.columns(),
                layout.spot_count()
            ),
        );
        if let Err(e) = state.paint_current() {
            log_mismatch(&e);
        }

        let (sync, events) = SyncClient::connect(endpoint);
        state.set_connection(ConnectionState::Connecting);

        Ok(Self {
            state,
            sync,
            events,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply one event from the connection task.
    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Opened => {
                self.state.set_connection(ConnectionState::Open);
                self.state.push_log(
                    LogCategory::Connection,
                    format!("Connected to {}", self.state.endpoint),
                );
            }
            SyncEvent::Names(names) => {
                tracing::info!(count = names.len(), "Applying name frame");
                if let Err(e) = self.state.apply_names(names) {
                    log_mismatch(&e);
                }
            }
            SyncEvent::ConnectionLost { state, reason } => {
                self.state.mark_lost(state, reason);
            }
        }
    }

    /// Wait for the next event and apply it. Returns `false` once the
    /// connection task has finished and the queue is empty.
    pub async fn step(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Apply every event already queued without waiting.
    pub fn drain_pending(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Ask the name server to reshuffle. Ignored unless connected.
    pub fn scramble(&mut self) -> bool {
        let sent = self.sync.scramble();
        if sent {
            self.state.push_log(LogCategory::Command, "Sent SCRAMBLE");
        } else {
            self.state.push_log(
                LogCategory::Command,
                format!("SCRAMBLE ignored: connection {}", self.sync.state().as_str()),
            );
        }
        sent
    }

    /// Run without a terminal UI: print the grid after every repaint and
    /// accept `scramble` / `s` on stdin. Ends with an error when the
    /// connection is lost.
    pub async fn run_headless(self) -> anyhow::Result<()> {
        self.run_headless_with(BufReader::new(tokio::io::stdin()))
            .await
    }

    /// Headless loop reading commands from `input`, one per line.
    pub async fn run_headless_with<R>(mut self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        print_grid(&self.state);
        let mut input = input.lines();
        let mut input_open = true;

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        return Ok(());
                    };
                    let lost = event.lost_error();
                    let repaint = matches!(event, SyncEvent::Names(_));
                    self.apply(event);
                    if repaint {
                        print_grid(&self.state);
                    }
                    if let Some(err) = lost {
                        return Err(anyhow::Error::new(err).context("labels are stale"));
                    }
                }
                line = input.next_line(), if input_open => match line {
                    Ok(Some(line)) => match line.trim() {
                        "s" | "scramble" => {
                            self.scramble();
                        }
                        "" => {}
                        other => tracing::warn!(input = other, "Unknown command, expected 'scramble'"),
                    },
                    Ok(None) | Err(_) => input_open = false,
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                    return Ok(());
                }
            }
        }
    }
}

fn log_mismatch(err: &StateError) {
    match err {
        StateError::RenderMismatch { names, spots } => {
            tracing::warn!(names = *names, spots = *spots, "More names than spots; extra names dropped");
        }
    }
}

fn print_grid(state: &AppState) {
    for line in state.grid.render_text() {
        println!("{line}");
    }
    println!();
}

