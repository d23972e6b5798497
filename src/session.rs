//! Redirection session handle and transport interface
//!
//! The session is owned by the surrounding tool: it opens the image file,
//! maps it into memory and drives the redirection handshake. This core only
//! sees an immutable view of the medium plus a sink for outgoing wire
//! messages.

use crate::error::IderResult;

/// Outbound side of the redirection channel
///
/// Implementations must deliver each message as one framed write, in call
/// order. A failure here aborts the in-flight command; retry policy belongs
/// to the caller.
pub trait RedirWrite {
    fn write(&mut self, buf: &[u8]) -> IderResult<()>;
}

/// Read-only view of one redirection session's virtual medium
///
/// `medium` is typically a memory-mapped disk image. An empty slice means no
/// medium is inserted; every command then reports NOT READY. The core never
/// mutates the view.
#[derive(Debug, Clone, Copy)]
pub struct IderSession<'a> {
    medium: &'a [u8],
    lba_size: u32,
}

impl<'a> IderSession<'a> {
    pub fn new(medium: &'a [u8], lba_size: u32) -> Self {
        debug_assert!(lba_size > 0);
        IderSession { medium, lba_size }
    }

    /// The mapped medium bytes
    pub fn medium(&self) -> &'a [u8] {
        self.medium
    }

    /// Total medium size in bytes
    pub fn medium_size(&self) -> u64 {
        self.medium.len() as u64
    }

    /// Logical block size in bytes
    pub fn lba_size(&self) -> u32 {
        self.lba_size
    }

    /// Whether a medium is currently mapped
    pub fn medium_present(&self) -> bool {
        !self.medium.is_empty()
    }

    /// Index of the last addressable logical block
    pub fn last_lba(&self) -> u32 {
        let blocks = self.medium_size() / self.lba_size as u64;
        blocks.saturating_sub(1) as u32
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
