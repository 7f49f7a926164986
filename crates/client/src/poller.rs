//! Polling loop for an ops view.
//!
//! Drives an [`OpsController`] from three inputs on one task: the refresh
//! ticker, operator commands, and completions of in-flight fetches. Ticks
//! and commands never wait for a pending fetch; the controller's fencing
//! decides which completions are shown.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use gsb_core::error::ConsoleError;
use gsb_core::ops::{OpsPayload, Transition, ViewModel};

use crate::controller::{Completion, OpsController, OpsRequest, OpsSource};

/// Default interval between refreshes.
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(15_000);

/// Operator input for a running ops view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpsCommand {
    Transition(Transition),
    /// Fetch now without changing state.
    Refresh,
    Quit,
}

/// Output side of the ops loop.
pub trait OpsDisplay {
    /// The shareable location changed after a transition.
    fn location_changed(&mut self, location: &str);

    /// Show the latest view (if any) and the error banner (if any).
    fn render(&mut self, view: Option<&ViewModel>, banner: Option<&str>);
}

type InFlight<'a> = BoxFuture<'a, (OpsRequest, Result<OpsPayload, ConsoleError>)>;

fn dispatch<'a, S: OpsSource>(source: &'a S, request: OpsRequest) -> InFlight<'a> {
    async move {
        let result = source.fetch(&request.state).await;
        (request, result)
    }
    .boxed()
}

/// Run the ops loop until `Quit`, the command channel closes, or `cancel`
/// fires.
///
/// The first tick fires immediately, so the view is fetched on start.
pub async fn run<S, D>(
    source: &S,
    controller: &mut OpsController,
    display: &mut D,
    mut commands: mpsc::Receiver<OpsCommand>,
    refresh: Duration,
    cancel: CancellationToken,
) where
    S: OpsSource,
    D: OpsDisplay,
{
    let mut ticker = tokio::time::interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: FuturesUnordered<InFlight<'_>> = FuturesUnordered::new();

    display.location_changed(&controller.location());
    tracing::info!(
        location = %controller.location(),
        refresh_ms = refresh.as_millis() as u64,
        "Ops polling started",
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Ops polling cancelled");
                break;
            }
            _ = ticker.tick() => {
                in_flight.push(dispatch(source, controller.poll()));
            }
            command = commands.recv() => match command {
                Some(OpsCommand::Transition(transition)) => {
                    if controller.allows(&transition) {
                        let request = controller.transition(transition);
                        display.location_changed(&controller.location());
                        in_flight.push(dispatch(source, request));
                    } else {
                        tracing::debug!(?transition, "Pager control disabled, ignoring");
                    }
                }
                Some(OpsCommand::Refresh) => {
                    in_flight.push(dispatch(source, controller.poll()));
                }
                Some(OpsCommand::Quit) | None => {
                    tracing::info!("Ops polling stopped");
                    break;
                }
            },
            Some((request, result)) = in_flight.next(), if !in_flight.is_empty() => {
                match controller.complete_now(&request, result) {
                    Completion::Stale => {}
                    Completion::Applied | Completion::Failed => {
                        display.render(controller.view(), controller.banner());
                    }
                }
            }
        }
    }
}
