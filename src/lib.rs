//! Intel AMT IDE redirection (IDE-R) virtual drive command core
//!
//! This library turns SCSI-style commands arriving over an AMT IDE-R
//! redirection channel into the exact wire messages the remote redirection
//! agent expects, serving them from a read-only view of a disk image. It is
//! the command-handling core of an IDE-R tool: transport setup, the
//! redirection handshake and image file management stay with the caller,
//! which hands in an [`IderSession`] view plus a [`RedirWrite`] sink.
//!
//! The emulation is read-only: TEST UNIT READY, MODE SENSE(6/10),
//! READ CAPACITY and READ(10) are served; everything else is answered with
//! ILLEGAL REQUEST sense.
//!
//! # Example
//!
//! ```
//! use ider_target::{device, IderHandler, IderResult, IderSession, RedirWrite};
//!
//! /// Collects outgoing wire messages; a real tool writes to the socket
//! struct Capture(Vec<Vec<u8>>);
//!
//! impl RedirWrite for Capture {
//!     fn write(&mut self, buf: &[u8]) -> IderResult<()> {
//!         self.0.push(buf.to_vec());
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> IderResult<()> {
//! let image = vec![0u8; 1440 * 1024]; // mapped floppy image
//! let session = IderSession::new(&image, 512);
//! let mut transport = Capture(Vec::new());
//!
//! // TEST UNIT READY from the remote host, sequence number 1
//! let cdb = [0x00u8, 0, 0, 0, 0, 0];
//! IderHandler::handle_command(&mut transport, &session, 1, device::FLOPPY, false, &cdb)?;
//! assert_eq!(transport.0.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handler;
pub mod mode_pages;
pub mod scsi;
pub mod session;
pub mod wire;

pub use error::{IderError, IderResult};
pub use handler::IderHandler;
pub use scsi::{device, ScsiOpcode, SenseTuple};
pub use session::{IderSession, RedirWrite};

/// Version of this library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
