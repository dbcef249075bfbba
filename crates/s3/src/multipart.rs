//! Multipart upload planning
//!
//! Decides whether a payload goes up in one request or in parts, and how the
//! parts are cut.

use osc_core::session::{MAX_PART_SIZE, MIN_PART_SIZE};

/// Maximum number of parts: 10,000 (S3 limit)
pub const MAX_PARTS: u64 = 10_000;

/// How a payload of a given size will be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    /// Total payload size
    pub total_size: u64,

    /// Bytes per part (the last part may be shorter)
    pub part_size: u64,
}

impl UploadPlan {
    /// Plan an upload of `total_size` bytes with the preferred part size
    ///
    /// The part size grows when the preferred size would need more than
    /// 10,000 parts.
    pub fn new(total_size: u64, preferred_part_size: u64) -> Self {
        Self {
            total_size,
            part_size: calculate_part_size(preferred_part_size, total_size),
        }
    }

    /// Whether the payload needs a multipart upload
    pub fn is_multipart(&self) -> bool {
        self.total_size > self.part_size
    }

    /// Number of parts
    pub fn parts(&self) -> u64 {
        calculate_parts(self.total_size, self.part_size)
    }

    /// Iterate `(part_number, start, end)` for every part
    pub fn ranges(&self) -> impl Iterator<Item = (i32, u64, u64)> + '_ {
        (1..=self.parts()).map(|n| {
            let part_number = n as i32;
            let (start, end) = part_byte_range(part_number, self.part_size, self.total_size);
            (part_number, start, end)
        })
    }
}

/// Calculate appropriate part size for a payload
pub fn calculate_part_size(preferred: u64, total_size: u64) -> u64 {
    let part_size = preferred.clamp(MIN_PART_SIZE, MAX_PART_SIZE);

    let parts = total_size.div_ceil(part_size);
    if parts <= MAX_PARTS {
        part_size
    } else {
        total_size
            .div_ceil(MAX_PARTS)
            .clamp(MIN_PART_SIZE, MAX_PART_SIZE)
    }
}

/// Calculate number of parts for a payload
pub fn calculate_parts(total_size: u64, part_size: u64) -> u64 {
    total_size.div_ceil(part_size)
}

/// Get byte range `[start, end)` for a 1-based part number
pub fn part_byte_range(part_number: i32, part_size: u64, total_size: u64) -> (u64, u64) {
    let start = (part_number as u64 - 1) * part_size;
    let end = (start + part_size).min(total_size);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_small_payload_is_single_part() {
        let plan = UploadPlan::new(0, MIN_PART_SIZE);
        assert!(!plan.is_multipart());

        let plan = UploadPlan::new(MIN_PART_SIZE, MIN_PART_SIZE);
        assert!(!plan.is_multipart());
    }

    #[test]
    fn test_large_payload_is_multipart() {
        let plan = UploadPlan::new(6 * MIB, MIN_PART_SIZE);
        assert!(plan.is_multipart());
        assert_eq!(plan.parts(), 2);

        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(ranges, vec![(1, 0, 5 * MIB), (2, 5 * MIB, 6 * MIB)]);
    }

    #[test]
    fn test_part_size_clamping() {
        assert_eq!(calculate_part_size(1024, 10 * MIB), MIN_PART_SIZE);
        assert_eq!(
            calculate_part_size(10 * 1024 * 1024 * 1024, 10 * MIB),
            MAX_PART_SIZE
        );
    }

    #[test]
    fn test_calculate_part_size_huge_payload() {
        let huge = 64 * MIB * 20_000;
        let size = calculate_part_size(64 * MIB, huge);
        assert!(calculate_parts(huge, size) <= MAX_PARTS);
    }

    #[test]
    fn test_calculate_parts() {
        assert_eq!(calculate_parts(100, 10), 10);
        assert_eq!(calculate_parts(101, 10), 11);
        assert_eq!(calculate_parts(99, 10), 10);
    }

    #[test]
    fn test_part_byte_range() {
        assert_eq!(part_byte_range(1, 100, 250), (0, 100));
        assert_eq!(part_byte_range(2, 100, 250), (100, 200));
        assert_eq!(part_byte_range(3, 100, 250), (200, 250));
    }
}
