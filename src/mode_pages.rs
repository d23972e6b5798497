//! Canned MODE SENSE(10) responses
//!
//! The virtual drive never synthesizes mode pages at runtime; every
//! supported (device, page) combination maps to a pre-encoded blob copied
//! onto the wire as-is. The floppy unit carries two variants of each page,
//! picked by the medium's capacity: below [`LS120_THRESHOLD_BLOCKS`] the
//! geometry of a standard 1.44 MB floppy is reported, at or above it the
//! LS-120 geometry.

use crate::scsi::device;

/// Capacity boundary (in 2 KiB blocks) between floppy and LS-120 geometry
///
/// The protocol buckets capacity in 2 KiB units regardless of the medium's
/// logical block size; see [`capacity_bucket`].
pub const LS120_THRESHOLD_BLOCKS: u32 = 0x0B40;

/// Capacity bucket used to pick the floppy vs. LS-120 page variant
pub fn capacity_bucket(medium_size: u64) -> u32 {
    (medium_size >> 11) as u32
}

static MODE_PAGE_01_FLOPPY: [u8; 20] = [
    0x00, 0x12, 0x24, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x0A, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00,
];
static MODE_PAGE_01_LS120: [u8; 20] = [
    0x00, 0x12, 0x31, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x0A, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00,
];
static MODE_PAGE_01_CDROM: [u8; 16] = [
    0x00, 0x0E, 0x01, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x06, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00,
];
static MODE_PAGE_05_FLOPPY: [u8; 40] = [
    0x00, 0x26, 0x24, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x05, 0x1E, 0x04, 0xB0, 0x02, 0x12, 0x02, 0x00,
    0x00, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x28, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x02, 0xD0, 0x00, 0x00,
];
static MODE_PAGE_05_LS120: [u8; 40] = [
    0x00, 0x26, 0x31, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x05, 0x1E, 0x10, 0xA9, 0x08, 0x20, 0x02, 0x00,
    0x03, 0xC3, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x28, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x02, 0xD0, 0x00, 0x00,
];
static MODE_PAGE_3F_FLOPPY: [u8; 94] = [
    0x00, 0x5C, 0x24, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x0A, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00, 0x03, 0x16, 0x00, 0xA0,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x12, 0x02, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xA0, 0x00,
    0x00, 0x00, 0x05, 0x1E, 0x04, 0xB0, 0x02, 0x12,
    0x02, 0x00, 0x00, 0x50, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x28, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0xD0,
    0x00, 0x00, 0x08, 0x0A, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0B, 0x06,
    0x00, 0x00, 0x00, 0x11, 0x24, 0x31,
];
static MODE_PAGE_3F_LS120: [u8; 94] = [
    0x00, 0x5C, 0x24, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x0A, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00, 0x03, 0x16, 0x00, 0xA0,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x12, 0x02, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xA0, 0x00,
    0x00, 0x00, 0x05, 0x1E, 0x10, 0xA9, 0x08, 0x20,
    0x02, 0x00, 0x03, 0xC3, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x28, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0xD0,
    0x00, 0x00, 0x08, 0x0A, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0B, 0x06,
    0x00, 0x00, 0x00, 0x11, 0x24, 0x31,
];
static MODE_PAGE_3F_CDROM: [u8; 42] = [
    0x00, 0x28, 0x01, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x06, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00,
    0x2A, 0x18, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00,
];
static MODE_PAGE_1A_CDROM: [u8; 20] = [
    0x00, 0x12, 0x01, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x1A, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
];
static MODE_PAGE_1D_CDROM: [u8; 20] = [
    0x00, 0x12, 0x01, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x1D, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
];
static MODE_PAGE_2A_CDROM: [u8; 34] = [
    0x00, 0x20, 0x01, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x2A, 0x18, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00,
];

fn floppy_variant(
    capacity_blocks: u32,
    floppy: &'static [u8],
    ls120: &'static [u8],
) -> &'static [u8] {
    if capacity_blocks < LS120_THRESHOLD_BLOCKS {
        floppy
    } else {
        ls120
    }
}

/// Resolve the canned response for a MODE SENSE(10) request
///
/// Returns `None` when the page is not supported for the given device
/// selector; the dispatcher turns that into INVALID FIELD sense.
/// `capacity_blocks` is only consulted for the floppy unit.
pub fn lookup(device_sel: u8, page_code: u8, capacity_blocks: u32) -> Option<&'static [u8]> {
    let floppy = device_sel == device::FLOPPY;
    match page_code {
        0x01 if floppy => Some(floppy_variant(
            capacity_blocks,
            &MODE_PAGE_01_FLOPPY,
            &MODE_PAGE_01_LS120,
        )),
        0x01 => Some(&MODE_PAGE_01_CDROM),
        0x05 if floppy => Some(floppy_variant(
            capacity_blocks,
            &MODE_PAGE_05_FLOPPY,
            &MODE_PAGE_05_LS120,
        )),
        0x3F if floppy => Some(floppy_variant(
            capacity_blocks,
            &MODE_PAGE_3F_FLOPPY,
            &MODE_PAGE_3F_LS120,
        )),
        0x3F => Some(&MODE_PAGE_3F_CDROM),
        0x1A if device_sel == device::CDROM => Some(&MODE_PAGE_1A_CDROM),
        0x1D if device_sel == device::CDROM => Some(&MODE_PAGE_1D_CDROM),
        0x2A if device_sel == device::CDROM => Some(&MODE_PAGE_2A_CDROM),
        _ => None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floppy_threshold_boundary() {
        let below = lookup(device::FLOPPY, 0x3F, LS120_THRESHOLD_BLOCKS - 1).unwrap();
        let at = lookup(device::FLOPPY, 0x3F, LS120_THRESHOLD_BLOCKS).unwrap();
        assert_eq!(below, &MODE_PAGE_3F_FLOPPY);
        assert_eq!(at, &MODE_PAGE_3F_LS120);
        assert_ne!(below, at);
    }

    #[test]
    fn test_capacity_bucket_units() {
        // A 1.44 MB floppy image sits well below the LS-120 threshold
        assert_eq!(capacity_bucket(1_474_560), 720);
        assert!(capacity_bucket(1_474_560) < LS120_THRESHOLD_BLOCKS);
        // A 120 MB LS-120 image sits above it
        assert!(capacity_bucket(120 * 1024 * 1024) >= LS120_THRESHOLD_BLOCKS);
    }

    #[test]
    fn test_cdrom_pages() {
        assert_eq!(lookup(device::CDROM, 0x01, 0), Some(&MODE_PAGE_01_CDROM[..]));
        assert_eq!(lookup(device::CDROM, 0x3F, 0), Some(&MODE_PAGE_3F_CDROM[..]));
        assert_eq!(lookup(device::CDROM, 0x1A, 0), Some(&MODE_PAGE_1A_CDROM[..]));
        assert_eq!(lookup(device::CDROM, 0x1D, 0), Some(&MODE_PAGE_1D_CDROM[..]));
        assert_eq!(lookup(device::CDROM, 0x2A, 0), Some(&MODE_PAGE_2A_CDROM[..]));
    }

    #[test]
    fn test_unsupported_combinations() {
        // Caching page exists only for the CD-ROM unit
        assert_eq!(lookup(device::FLOPPY, 0x1A, 0), None);
        // Flexible-disk page exists only for the floppy unit
        assert_eq!(lookup(device::CDROM, 0x05, 0), None);
        // Unknown page code
        assert_eq!(lookup(device::FLOPPY, 0x0F, 0), None);
        assert_eq!(lookup(device::CDROM, 0x0F, 0), None);
    }

    #[test]
    fn test_blob_self_describing_lengths() {
        // Byte 1 of each blob is the mode-data-length field: total - 2
        for page in [0x01u8, 0x05, 0x3F] {
            let blob = lookup(device::FLOPPY, page, 0).unwrap();
            assert_eq!(blob[1] as usize, blob.len() - 2, "floppy page {page:#04x}");
        }
        for page in [0x01u8, 0x3F, 0x1A, 0x1D, 0x2A] {
            let blob = lookup(device::CDROM, page, 0).unwrap();
            assert_eq!(blob[1] as usize, blob.len() - 2, "cdrom page {page:#04x}");
        }
    }
}
