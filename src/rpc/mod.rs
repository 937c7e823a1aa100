//! Client-facing messaging subsystem.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Messaging stack                       │
//! │                                                             │
//! │  ┌───────────┐   ┌──────────┐   ┌────────────────────────┐  │
//! │  │ TcpLink   │──▶│  Codec   │──▶│ Session → Controller   │  │
//! │  │ (socket)  │   │ (framing)│   │                        │  │
//! │  └───────────┘   └──────────┘   └───────────┬────────────┘  │
//! │       ▲                                     │ broadcast     │
//! │       │              ┌──────────────────────┘               │
//! │       │              ▼                                      │
//! │  ┌───────────┐   ┌──────────────┐                           │
//! │  │ Session   │◀──│ BroadcastHub │  (per-observer queues)    │
//! │  │ (write)   │   │              │                           │
//! │  └───────────┘   └──────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod hub;
pub mod io_task;
pub mod session;
pub mod transport;
