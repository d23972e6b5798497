//! SCSI command decoding for the IDE-R virtual drive
//!
//! The redirection channel carries SCSI-style CDBs; this module defines the
//! opcode set the virtual drive recognizes, the sense-code vocabulary used to
//! report failures, and the CDB field parsers.

use byteorder::{BigEndian, ByteOrder};

/// SCSI command opcodes served by the virtual drive (read-only emulation)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScsiOpcode {
    TestUnitReady = 0x00,
    ModeSense6 = 0x1A,
    ReadCapacity10 = 0x25,
    Read10 = 0x28,
    ModeSense10 = 0x5A,
}

impl ScsiOpcode {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0x00 => Some(ScsiOpcode::TestUnitReady),
            0x1A => Some(ScsiOpcode::ModeSense6),
            0x25 => Some(ScsiOpcode::ReadCapacity10),
            0x28 => Some(ScsiOpcode::Read10),
            0x5A => Some(ScsiOpcode::ModeSense10),
            _ => None,
        }
    }
}

/// IDE drive-select values distinguishing the two emulated units
pub mod device {
    /// Virtual floppy / LS-120 unit
    pub const FLOPPY: u8 = 0xA0;
    /// Virtual CD-ROM unit
    pub const CDROM: u8 = 0xB0;
}

/// SCSI sense key codes
pub mod sense_key {
    pub const NO_SENSE: u8 = 0x00;
    pub const NOT_READY: u8 = 0x02;
    pub const ILLEGAL_REQUEST: u8 = 0x05;
}

/// Additional Sense Code (ASC) values
pub mod asc {
    pub const NO_ADDITIONAL_SENSE: u8 = 0x00;
    pub const INVALID_COMMAND_OPERATION_CODE: u8 = 0x20;
    pub const LBA_OUT_OF_RANGE: u8 = 0x21;
    pub const INVALID_FIELD_IN_CDB: u8 = 0x24;
    pub const MEDIUM_NOT_PRESENT: u8 = 0x3A;
}

/// SCSI sense triple: (key, ASC, ASQ)
///
/// An all-zero tuple means "no error"; anything else is carried in the
/// trailing bytes of a Command-End-Response message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SenseTuple {
    pub key: u8,
    pub asc: u8,
    pub asq: u8,
}

impl SenseTuple {
    /// Clean completion, no sense to report
    pub const NONE: SenseTuple = SenseTuple {
        key: sense_key::NO_SENSE,
        asc: asc::NO_ADDITIONAL_SENSE,
        asq: 0,
    };

    pub fn new(key: u8, asc: u8, asq: u8) -> Self {
        SenseTuple { key, asc, asq }
    }

    pub fn is_error(&self) -> bool {
        self.key != sense_key::NO_SENSE
    }

    /// NOT READY, MEDIUM NOT PRESENT
    pub fn medium_not_present() -> Self {
        SenseTuple::new(sense_key::NOT_READY, asc::MEDIUM_NOT_PRESENT, 0x00)
    }

    /// ILLEGAL REQUEST, INVALID FIELD IN CDB
    pub fn invalid_field_in_cdb() -> Self {
        SenseTuple::new(sense_key::ILLEGAL_REQUEST, asc::INVALID_FIELD_IN_CDB, 0x00)
    }

    /// ILLEGAL REQUEST, CDB NOT SUPPORTED
    pub fn unsupported_cdb() -> Self {
        SenseTuple::new(
            sense_key::ILLEGAL_REQUEST,
            asc::INVALID_COMMAND_OPERATION_CODE,
            0x00,
        )
    }

    /// ILLEGAL REQUEST, LOGICAL BLOCK ADDRESS OUT OF RANGE
    pub fn lba_out_of_range() -> Self {
        SenseTuple::new(sense_key::ILLEGAL_REQUEST, asc::LBA_OUT_OF_RANGE, 0x00)
    }
}

/// Parse starting LBA and block count from a READ(10) CDB
///
/// Both fields are big-endian per SBC: LBA in bytes 2-5, transfer length in
/// bytes 7-8.
pub fn parse_read10_cdb(cdb: &[u8]) -> Option<(u32, u16)> {
    if cdb.len() < 10 {
        return None;
    }
    let lba = BigEndian::read_u32(&cdb[2..6]);
    let count = BigEndian::read_u16(&cdb[7..9]);
    Some((lba, count))
}

/// Parse page code and allocation length from a MODE SENSE(10) CDB
pub fn parse_mode_sense10_cdb(cdb: &[u8]) -> Option<(u8, u16)> {
    if cdb.len() < 10 {
        return None;
    }
    let page_code = cdb[2] & 0x3F;
    let alloc_len = BigEndian::read_u16(&cdb[7..9]);
    Some((page_code, alloc_len))
}

/// Parse page code and subpage code from a MODE SENSE(6) CDB
pub fn parse_mode_sense6_cdb(cdb: &[u8]) -> Option<(u8, u8)> {
    if cdb.len() < 6 {
        return None;
    }
    Some((cdb[2], cdb[3]))
}

// ============================================================================
// Unit Tests
// ============================================================================
