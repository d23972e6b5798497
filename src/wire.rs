//! IDE-R wire message construction
//!
//! The redirection channel emulates an IDE controller: every message the
//! target sends carries an 8-byte "register block" describing which of the
//! emulated ATA task-file registers are being updated (selected by a bitmask)
//! and the values written into them. Two message shapes leave this core:
//!
//! - *Data-to-Host* (type 0x54): fixed 26-byte header followed by a payload
//!   chunk, used for every command that returns data.
//! - *Command-End-Response* (type 0x51): fixed 22 bytes, no payload, used for
//!   clean completions and sense reports.
//!
//! Field layout is a bit-exact contract with the remote redirection agent:
//! sequence number and transfer byte count are little-endian, and the
//! register blocks sit at fixed offsets. Keep all byte-offset knowledge in
//! the two `to_bytes` routines below.

use crate::scsi::SenseTuple;
use byteorder::{ByteOrder, LittleEndian};

/// Message type codes on the redirection channel
pub mod msg_type {
    pub const COMMAND_END_RESPONSE: u8 = 0x51;
    pub const DATA_TO_HOST: u8 = 0x54;
}

/// Register-presence mask bits
///
/// Each bit declares that the corresponding register field in the block
/// carries a value the remote side must latch.
pub mod reg_mask {
    pub const INTERRUPT: u8 = 0x01;
    pub const ERROR: u8 = 0x02;
    pub const SECTOR_COUNT: u8 = 0x04;
    pub const SECTOR_NUM: u8 = 0x08;
    pub const BYTE_CNT_LSB: u8 = 0x10;
    pub const BYTE_CNT_MSB: u8 = 0x20;
    pub const DRIVE_SELECT: u8 = 0x40;
    pub const STATUS: u8 = 0x80;
}

/// ATA status register bits
pub mod ata_status {
    pub const ERR: u8 = 0x01;
    pub const DRQ: u8 = 0x08;
    pub const DSC: u8 = 0x10;
    pub const DRDY: u8 = 0x40;
}

/// ATAPI interrupt-reason bits, carried in the sector-count register
pub mod interrupt_reason {
    /// Command/data: set when the transfer phase is over
    pub const CD: u8 = 0x01;
    /// I/O direction: set for device-to-host transfers
    pub const IO: u8 = 0x02;
}

/// Size of the Data-to-Host fixed header (payload follows immediately)
pub const DATA_TO_HOST_HEADER_SIZE: usize = 26;

/// Size of a Command-End-Response message
pub const COMMAND_END_RESPONSE_SIZE: usize = 22;

/// One emulated register-bank update, 8 bytes on the wire
///
/// `mask` selects which of the other fields are meaningful; unselected
/// fields are transmitted as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterBlock {
    pub mask: u8,
    pub error: u8,
    pub sector_count: u8,
    pub sector_num: u8,
    pub byte_count_lsb: u8,
    pub byte_count_msb: u8,
    pub drive_select: u8,
    pub status: u8,
}

impl RegisterBlock {
    /// Serialize into an 8-byte destination slice
    fn write_to(&self, buf: &mut [u8]) {
        buf[0] = self.mask;
        buf[1] = self.error;
        buf[2] = self.sector_count;
        buf[3] = self.sector_num;
        buf[4] = self.byte_count_lsb;
        buf[5] = self.byte_count_msb;
        buf[6] = self.drive_select;
        buf[7] = self.status;
    }
}

/// Data-to-Host message: one payload chunk plus register emulation
///
/// The input-direction block is always populated (the host reads the data
/// through the emulated data register); the output-direction block is
/// populated only when `completed` is set, signalling end-of-command.
#[derive(Debug, Clone)]
pub struct DataToHost<'a> {
    pub sequence_number: u32,
    pub completed: bool,
    pub input: RegisterBlock,
    pub output: RegisterBlock,
    pub payload: &'a [u8],
}

impl<'a> DataToHost<'a> {
    /// Build the transfer message for one chunk of payload
    ///
    /// Interrupt-driven (non-DMA) transfers assert the interrupt-pending
    /// flag so the host gets signalled per chunk; DMA transfers instead
    /// populate the byte-count registers so the remote side can program its
    /// DMA engine.
    pub fn new(
        sequence_number: u32,
        device: u8,
        payload: &'a [u8],
        completed: bool,
        use_dma: bool,
    ) -> Self {
        let base_mask = reg_mask::STATUS | reg_mask::SECTOR_COUNT;
        let mut input = RegisterBlock {
            mask: base_mask | reg_mask::BYTE_CNT_LSB | reg_mask::BYTE_CNT_MSB,
            sector_count: interrupt_reason::IO,
            drive_select: device,
            status: ata_status::DRDY | ata_status::DSC | ata_status::DRQ,
            ..Default::default()
        };
        if use_dma {
            input.byte_count_lsb = (payload.len() & 0xFF) as u8;
            input.byte_count_msb = ((payload.len() >> 8) & 0xFF) as u8;
        } else {
            input.mask |= reg_mask::INTERRUPT;
        }

        let output = if completed {
            RegisterBlock {
                mask: base_mask | reg_mask::INTERRUPT,
                sector_count: interrupt_reason::IO | interrupt_reason::CD,
                drive_select: device,
                status: ata_status::DRDY | ata_status::DSC,
                ..Default::default()
            }
        } else {
            RegisterBlock::default()
        };

        DataToHost {
            sequence_number,
            completed,
            input,
            output,
            payload,
        }
    }

    /// Serialize header plus payload, no padding
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; DATA_TO_HOST_HEADER_SIZE + self.payload.len()];
        buf[0] = msg_type::DATA_TO_HOST;
        buf[1] = if self.completed { 0x02 } else { 0x00 };
        // bytes 2-3 reserved
        LittleEndian::write_u32(&mut buf[4..8], self.sequence_number);
        LittleEndian::write_u16(&mut buf[8..10], self.payload.len() as u16);
        self.input.write_to(&mut buf[10..18]);
        self.output.write_to(&mut buf[18..26]);
        buf[DATA_TO_HOST_HEADER_SIZE..].copy_from_slice(self.payload);
        buf
    }
}

/// Command-End-Response message: completion status plus optional sense
#[derive(Debug, Clone)]
pub struct CommandEndResponse {
    pub sequence_number: u32,
    pub output: RegisterBlock,
    pub sense: SenseTuple,
}

impl CommandEndResponse {
    /// Build the completion message for a command
    ///
    /// A non-zero sense key turns the message into an error report: the
    /// error-status bit is raised, the error register carries the sense key
    /// in its upper nibble, and the sense triple rides in the trailing bytes.
    pub fn new(sequence_number: u32, device: u8, sense: SenseTuple) -> Self {
        let mut output = RegisterBlock {
            mask: reg_mask::INTERRUPT
                | reg_mask::SECTOR_COUNT
                | reg_mask::DRIVE_SELECT
                | reg_mask::STATUS,
            sector_count: interrupt_reason::IO | interrupt_reason::CD,
            drive_select: device,
            status: ata_status::DRDY | ata_status::DSC,
            ..Default::default()
        };
        if sense.is_error() {
            output.mask |= reg_mask::ERROR;
            output.error = sense.key << 4;
            output.status |= ata_status::ERR;
        }
        CommandEndResponse {
            sequence_number,
            output,
            sense,
        }
    }

    /// Serialize to the fixed 22-byte wire form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; COMMAND_END_RESPONSE_SIZE];
        buf[0] = msg_type::COMMAND_END_RESPONSE;
        buf[1] = 0x02;
        // bytes 2-3 reserved
        LittleEndian::write_u32(&mut buf[4..8], self.sequence_number);
        // bytes 8-9 reserved (no payload, no transfer count)
        self.output.write_to(&mut buf[10..18]);
        buf[18] = self.sense.key;
        buf[19] = self.sense.asc;
        buf[20] = self.sense.asq;
        buf
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scsi::device;

    #[test]
    fn test_data_to_host_pio() {
        let payload = [0xAAu8; 16];
        let msg = DataToHost::new(7, device::FLOPPY, &payload, false, false);
        let bytes = msg.to_bytes();

        assert_eq!(bytes.len(), DATA_TO_HOST_HEADER_SIZE + 16);
        assert_eq!(bytes[0], msg_type::DATA_TO_HOST);
        assert_eq!(bytes[1], 0x00); // not completed
        assert_eq!(LittleEndian::read_u32(&bytes[4..8]), 7);
        assert_eq!(LittleEndian::read_u16(&bytes[8..10]), 16);

        // Input block: interrupt asserted, byte counts declared but zero
        assert_eq!(
            bytes[10],
            reg_mask::STATUS
                | reg_mask::SECTOR_COUNT
                | reg_mask::BYTE_CNT_LSB
                | reg_mask::BYTE_CNT_MSB
                | reg_mask::INTERRUPT
        );
        assert_eq!(bytes[12], interrupt_reason::IO);
        assert_eq!(bytes[14], 0); // byte_count_lsb unused in PIO
        assert_eq!(bytes[15], 0);
        assert_eq!(bytes[16], device::FLOPPY);
        assert_eq!(bytes[17], ata_status::DRDY | ata_status::DSC | ata_status::DRQ);

        // Output block untouched for an intermediate chunk
        assert_eq!(&bytes[18..26], &[0u8; 8]);

        // Payload appended verbatim
        assert_eq!(&bytes[26..], &payload);
    }

    #[test]
    fn test_data_to_host_dma_byte_counts() {
        let payload = vec![0u8; 0x1234];
        let msg = DataToHost::new(1, device::CDROM, &payload, false, true);
        let bytes = msg.to_bytes();

        // No interrupt-pending bit for DMA
        assert_eq!(bytes[10] & reg_mask::INTERRUPT, 0);
        assert_eq!(bytes[14], 0x34);
        assert_eq!(bytes[15], 0x12);
        assert_eq!(LittleEndian::read_u16(&bytes[8..10]), 0x1234);
    }

    #[test]
    fn test_data_to_host_completed() {
        let payload = [1u8, 2, 3, 4];
        let msg = DataToHost::new(99, device::CDROM, &payload, true, false);
        let bytes = msg.to_bytes();

        assert_eq!(bytes[1], 0x02); // completion attribute
        assert_eq!(
            bytes[18],
            reg_mask::STATUS | reg_mask::SECTOR_COUNT | reg_mask::INTERRUPT
        );
        assert_eq!(bytes[20], interrupt_reason::IO | interrupt_reason::CD);
        assert_eq!(bytes[24], device::CDROM);
        assert_eq!(bytes[25], ata_status::DRDY | ata_status::DSC);
    }

    #[test]
    fn test_transfer_count_matches_payload() {
        for len in [0usize, 1, 511, 512, 2048] {
            let payload = vec![0u8; len];
            let bytes = DataToHost::new(3, device::FLOPPY, &payload, true, false).to_bytes();
            assert_eq!(LittleEndian::read_u16(&bytes[8..10]) as usize, len);
            assert_eq!(bytes.len() - DATA_TO_HOST_HEADER_SIZE, len);
        }
    }

    #[test]
    fn test_command_end_response_clean() {
        let msg = CommandEndResponse::new(42, device::FLOPPY, SenseTuple::NONE);
        let bytes = msg.to_bytes();

        assert_eq!(bytes.len(), COMMAND_END_RESPONSE_SIZE);
        assert_eq!(bytes[0], msg_type::COMMAND_END_RESPONSE);
        assert_eq!(bytes[1], 0x02);
        assert_eq!(LittleEndian::read_u32(&bytes[4..8]), 42);
        assert_eq!(
            bytes[10],
            reg_mask::INTERRUPT | reg_mask::SECTOR_COUNT | reg_mask::DRIVE_SELECT | reg_mask::STATUS
        );
        assert_eq!(bytes[11], 0); // error register clear
        assert_eq!(bytes[12], interrupt_reason::IO | interrupt_reason::CD);
        assert_eq!(bytes[16], device::FLOPPY);
        assert_eq!(bytes[17], ata_status::DRDY | ata_status::DSC);
        assert_eq!(&bytes[18..21], &[0, 0, 0]); // no sense triple
    }

    #[test]
    fn test_command_end_response_sense() {
        let sense = SenseTuple::new(0x05, 0x24, 0x00);
        let msg = CommandEndResponse::new(42, device::CDROM, sense);
        let bytes = msg.to_bytes();

        assert_ne!(bytes[10] & reg_mask::ERROR, 0);
        assert_eq!(bytes[11], 0x05 << 4); // sense key in upper nibble
        assert_ne!(bytes[17] & ata_status::ERR, 0);
        assert_eq!(bytes[18], 0x05);
        assert_eq!(bytes[19], 0x24);
        assert_eq!(bytes[20], 0x00);
    }
}
