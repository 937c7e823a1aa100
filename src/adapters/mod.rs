//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                          | Connects to            |
//! |---------------|-------------------------------------|------------------------|
//! | `board`       | DigitalIo, NumericDisplay, SoundPort| any I/O + sound backend|
//! | `hal`         | DigitalIo                           | `embedded-hal` pins    |
//! | `sim`         | DigitalIo, SoundPort, TextDisplay   | in-memory / log output |
//! | `config_file` | ConfigPort                          | JSON file on disk      |

pub mod board;
pub mod config_file;
pub mod hal;
pub mod sim;
