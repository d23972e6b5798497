//! IDE-R command dispatch
//!
//! One call per SCSI command: validate the CDB against the current medium,
//! route on the opcode and emit one or more wire messages through the
//! transport. The handler keeps no state between calls, so concurrent
//! sessions can dispatch from different threads.

// Dispatch functions carry the full per-command context as parameters
#![allow(clippy::too_many_arguments)]

use crate::error::IderResult;
use crate::mode_pages;
use crate::scsi::{self, device, ScsiOpcode, SenseTuple};
use crate::session::{IderSession, RedirWrite};
use crate::wire::{CommandEndResponse, DataToHost};
use byteorder::{BigEndian, ByteOrder};

/// SCSI command handler for the virtual drive
pub struct IderHandler;

impl IderHandler {
    /// Dispatch one command
    ///
    /// Every path emits at least one message: either a Data-to-Host sequence
    /// ending in a completed chunk, or a single Command-End-Response. The
    /// only `Err` outcome is a transport write failure, surfaced immediately
    /// with no internal retry.
    pub fn handle_command<T: RedirWrite>(
        transport: &mut T,
        session: &IderSession<'_>,
        sequence_number: u32,
        device_sel: u8,
        use_dma: bool,
        cdb: &[u8],
    ) -> IderResult<()> {
        if !session.medium_present() {
            return Self::send_sense(
                transport,
                sequence_number,
                device_sel,
                SenseTuple::medium_not_present(),
            );
        }

        let opcode = match cdb.first().copied().and_then(ScsiOpcode::from_u8) {
            Some(op) => op,
            None => {
                log::warn!(
                    "seqno {}: unhandled command {:#04x}",
                    sequence_number,
                    cdb.first().copied().unwrap_or(0)
                );
                return Self::send_sense(
                    transport,
                    sequence_number,
                    device_sel,
                    SenseTuple::unsupported_cdb(),
                );
            }
        };

        match opcode {
            ScsiOpcode::TestUnitReady => {
                Self::send_sense(transport, sequence_number, device_sel, SenseTuple::NONE)
            }
            ScsiOpcode::ModeSense6 => Self::handle_mode_sense_6(
                transport,
                sequence_number,
                device_sel,
                use_dma,
                cdb,
            ),
            ScsiOpcode::ModeSense10 => Self::handle_mode_sense_10(
                transport,
                session,
                sequence_number,
                device_sel,
                use_dma,
                cdb,
            ),
            ScsiOpcode::ReadCapacity10 => Self::handle_read_capacity(
                transport,
                session,
                sequence_number,
                device_sel,
                use_dma,
            ),
            ScsiOpcode::Read10 => Self::handle_read_10(
                transport,
                session,
                sequence_number,
                device_sel,
                use_dma,
                cdb,
            ),
        }
    }

    fn send_sense<T: RedirWrite>(
        transport: &mut T,
        sequence_number: u32,
        device_sel: u8,
        sense: SenseTuple,
    ) -> IderResult<()> {
        let msg = CommandEndResponse::new(sequence_number, device_sel, sense);
        transport.write(&msg.to_bytes())
    }

    fn send_data<T: RedirWrite>(
        transport: &mut T,
        sequence_number: u32,
        device_sel: u8,
        payload: &[u8],
        completed: bool,
        use_dma: bool,
    ) -> IderResult<()> {
        let msg = DataToHost::new(sequence_number, device_sel, payload, completed, use_dma);
        transport.write(&msg.to_bytes())
    }

    /// MODE SENSE(6): only the all-pages request is honored, with a fixed
    /// header describing a write-protected CD-ROM medium and no block
    /// descriptors.
    fn handle_mode_sense_6<T: RedirWrite>(
        transport: &mut T,
        sequence_number: u32,
        device_sel: u8,
        use_dma: bool,
        cdb: &[u8],
    ) -> IderResult<()> {
        match scsi::parse_mode_sense6_cdb(cdb) {
            Some((0x3F, 0x00)) => {}
            _ => {
                return Self::send_sense(
                    transport,
                    sequence_number,
                    device_sel,
                    SenseTuple::invalid_field_in_cdb(),
                );
            }
        }
        let header = [
            0x00, // mode data length
            0x05, // medium type: CD-ROM data only
            0x80, // device-specific parameters: write protect
            0x00, // block-descriptor length
        ];
        Self::send_data(transport, sequence_number, device_sel, &header, true, use_dma)
    }

    fn handle_mode_sense_10<T: RedirWrite>(
        transport: &mut T,
        session: &IderSession<'_>,
        sequence_number: u32,
        device_sel: u8,
        use_dma: bool,
        cdb: &[u8],
    ) -> IderResult<()> {
        let (page_code, alloc_len) = match scsi::parse_mode_sense10_cdb(cdb) {
            Some(parsed) => parsed,
            None => {
                return Self::send_sense(
                    transport,
                    sequence_number,
                    device_sel,
                    SenseTuple::invalid_field_in_cdb(),
                );
            }
        };

        let capacity_blocks = if device_sel == device::FLOPPY {
            mode_pages::capacity_bucket(session.medium_size())
        } else {
            0
        };
        let blob = match mode_pages::lookup(device_sel, page_code, capacity_blocks) {
            Some(blob) => blob,
            None => {
                log::debug!(
                    "seqno {}: mode sense page {:#04x} unsupported for device {:#04x}",
                    sequence_number,
                    page_code,
                    device_sel
                );
                return Self::send_sense(
                    transport,
                    sequence_number,
                    device_sel,
                    SenseTuple::invalid_field_in_cdb(),
                );
            }
        };

        // Never hand back more than the canned page actually holds
        let len = (alloc_len as usize).min(blob.len());
        Self::send_data(transport, sequence_number, device_sel, &blob[..len], true, use_dma)
    }

    fn handle_read_capacity<T: RedirWrite>(
        transport: &mut T,
        session: &IderSession<'_>,
        sequence_number: u32,
        device_sel: u8,
        use_dma: bool,
    ) -> IderResult<()> {
        // Virtual optical media access is unsupported for this opcode
        if device_sel == device::CDROM {
            return Self::send_sense(
                transport,
                sequence_number,
                device_sel,
                SenseTuple::medium_not_present(),
            );
        }

        let mut payload = [0u8; 8];
        BigEndian::write_u32(&mut payload[0..4], session.last_lba());
        BigEndian::write_u32(&mut payload[4..8], session.lba_size());
        Self::send_data(transport, sequence_number, device_sel, &payload, true, use_dma)
    }

    fn handle_read_10<T: RedirWrite>(
        transport: &mut T,
        session: &IderSession<'_>,
        sequence_number: u32,
        device_sel: u8,
        use_dma: bool,
        cdb: &[u8],
    ) -> IderResult<()> {
        if device_sel == device::CDROM {
            return Self::send_sense(
                transport,
                sequence_number,
                device_sel,
                SenseTuple::medium_not_present(),
            );
        }
        let (lba, count) = match scsi::parse_read10_cdb(cdb) {
            Some(parsed) => parsed,
            None => {
                return Self::send_sense(
                    transport,
                    sequence_number,
                    device_sel,
                    SenseTuple::invalid_field_in_cdb(),
                );
            }
        };
        log::debug!("seqno {}: read lba {} count {}", sequence_number, lba, count);
        Self::read_blocks(
            transport,
            session,
            sequence_number,
            device_sel,
            use_dma,
            lba,
            count,
        )
    }

    /// Stream `count` blocks starting at `lba` as Data-to-Host chunks
    ///
    /// Blocks go out in ascending order, one message each. A block whose
    /// byte range would run past the end of the medium is clamped to the
    /// remaining bytes and ends the stream; otherwise the last requested
    /// block carries the completed flag.
    fn read_blocks<T: RedirWrite>(
        transport: &mut T,
        session: &IderSession<'_>,
        sequence_number: u32,
        device_sel: u8,
        use_dma: bool,
        lba: u32,
        count: u16,
    ) -> IderResult<()> {
        if count == 0 {
            return Self::send_sense(transport, sequence_number, device_sel, SenseTuple::NONE);
        }

        let lba_size = session.lba_size() as u64;
        let medium_size = session.medium_size();
        let start = lba as u64 * lba_size;
        if start >= medium_size {
            return Self::send_sense(
                transport,
                sequence_number,
                device_sel,
                SenseTuple::lba_out_of_range(),
            );
        }

        let medium = session.medium();
        for block in 0..count as u64 {
            let chunk_start = start + block * lba_size;
            let mut chunk_len = lba_size;
            let mut completed = block + 1 == count as u64;
            if chunk_start + lba_size > medium_size {
                chunk_len = medium_size - chunk_start;
                completed = true;
            }
            let chunk = &medium[chunk_start as usize..(chunk_start + chunk_len) as usize];
            Self::send_data(
                transport,
                sequence_number,
                device_sel,
                chunk,
                completed,
                use_dma,
            )?;
            if completed {
                break;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
