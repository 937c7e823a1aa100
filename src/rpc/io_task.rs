//! Task runtime: one cooperative executor for every long-lived task.
//!
//! Uses `edge-executor` for cooperative multi-task scheduling and
//! `async-io-mini` for reactor-driven timers (no busy-spinning).
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │  futures_lite::block_on                                      │
//!  │  ┌────────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                          │  │
//!  │  │                                                        │  │
//!  │  │  ┌────────┐ ┌───────┐ ┌──────┐ ┌─────────┐ ┌────────┐  │  │
//!  │  │  │ Policy │ │ Entry │ │ Exit │ │ Display │ │ Accept │  │  │
//!  │  │  │ 100ms ⏱│ │ 50ms ⏱│ │50ms ⏱│ │ signal  │ │ 50ms ⏱ │  │  │
//!  │  │  └────────┘ └───────┘ └──────┘ └─────────┘ └───┬────┘  │  │
//!  │  │                                   spawns ┌──────▼────┐ │  │
//!  │  │                                          │ Session×N │ │  │
//!  │  │                                          └───────────┘ │  │
//!  │  └────────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────────┘
//! ```

use std::io::ErrorKind;
use std::net::TcpListener;
use std::rc::Rc;
use std::time::Duration;

use async_io_mini::Timer;
use edge_executor::LocalExecutor;
use log::{info, warn};

use super::session::run_session;
use super::transport::TcpLink;
use crate::app::ports::{Hardware, TextDisplay};
use crate::app::service::Controller;
use crate::drivers::display;
use crate::error::{self, LinkError};
use crate::sensors::counter::{self, Direction};
use crate::sensors::policy;

/// Executor run-queue depth (power of two). Scheduling onto a full queue
/// panics, so every task that can be woken at once must fit.
pub const EXECUTOR_QUEUE: usize = 64;

/// Tasks alive for the whole process (policy, entry, exit, display,
/// accept loop) plus one spare slot.
pub const RESIDENT_TASKS: usize = 6;

/// Most session tasks the run queue can hold next to the resident tasks.
/// `SystemConfig::validate` caps `max_observers` at this.
pub const MAX_SESSIONS: usize = EXECUTOR_QUEUE - RESIDENT_TASKS;

/// Accept poll interval. Connection setup is infrequent.
const ACCEPT_POLL: Duration = Duration::from_millis(50);

type Executor = LocalExecutor<'static, EXECUTOR_QUEUE>;

/// Spawn the sensor, policy and display tasks onto `executor`.
pub fn spawn_device_tasks<H, D>(executor: &Executor, controller: &Rc<Controller<H>>, display: D)
where
    H: Hardware + 'static,
    D: TextDisplay + 'static,
{
    let c = controller.clone();
    executor.spawn(async move { policy::run(&c).await }).detach();

    let c = controller.clone();
    executor
        .spawn(async move { counter::run(&c, Direction::Entry).await })
        .detach();

    let c = controller.clone();
    executor
        .spawn(async move { counter::run(&c, Direction::Exit).await })
        .detach();

    let c = controller.clone();
    executor
        .spawn(async move { display::run(&c, display).await })
        .detach();
}

/// Accept clients forever; each connection gets its own session task.
pub async fn accept_loop<H>(
    executor: &'static Executor,
    controller: Rc<Controller<H>>,
    listener: TcpListener,
) where
    H: Hardware + 'static,
{
    loop {
        match listener.accept() {
            Ok((stream, addr)) => match TcpLink::new(stream) {
                Ok(link) => {
                    info!("IO: client {} connected", addr);
                    let c = controller.clone();
                    executor
                        .spawn(async move {
                            if let Err(e) = run_session(&c, link).await {
                                warn!("IO: client {} session ended: {}", addr, e);
                            }
                        })
                        .detach();
                }
                Err(e) => warn!("IO: could not set up client {}: {}", addr, e),
            },
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                Timer::after(ACCEPT_POLL).await;
            }
            Err(e) => {
                warn!("IO: accept failed: {}", e);
                Timer::after(ACCEPT_POLL).await;
            }
        }
    }
}

/// Run the whole controller on the calling thread. Never returns unless
/// the listener cannot be made non-blocking.
pub fn run<H, D>(
    controller: Rc<Controller<H>>,
    display: D,
    listener: TcpListener,
) -> error::Result<()>
where
    H: Hardware + 'static,
    D: TextDisplay + 'static,
{
    listener.set_nonblocking(true).map_err(LinkError::from)?;
    let local = listener.local_addr().map_err(LinkError::from)?;

    // Session tasks are spawned from inside a task, so the executor must
    // outlive every task it runs.
    let executor: &'static Executor = Box::leak(Box::new(LocalExecutor::new()));

    spawn_device_tasks(executor, &controller, display);
    executor
        .spawn(accept_loop(executor, controller, listener))
        .detach();

    info!("IO: listening on {}", local);
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
    Ok(())
}
