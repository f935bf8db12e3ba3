//! Buffer strategy selection.

use crate::LayoutInfo;

/// Default size bound below which fixed records use a single stack buffer.
pub const DEFAULT_STATIC_THRESHOLD: usize = 64;

/// How a record's codec moves bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One buffer of exactly `fixed_size` bytes, one write or read.
    Static,
    /// A scratch buffer reused run by run, with dispatch in between.
    Streaming,
}

/// Pick the strategy for a record.
///
/// Static requires a small, exactly sized record with no dispatch. Both
/// strategies produce identical bytes; the choice only affects how many
/// sink calls are made and how much stack is used.
pub fn select_strategy(info: &LayoutInfo, threshold: usize) -> Strategy {
    if info.fixed_size < threshold && info.is_inlinable() {
        Strategy::Static
    } else {
        Strategy::Streaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutFlags;

    fn info(fixed_size: usize, flags: LayoutFlags) -> LayoutInfo {
        LayoutInfo {
            fixed_size,
            flags,
            ..LayoutInfo::default()
        }
    }

    #[test]
    fn small_fixed_record_is_static() {
        let fixed = info(14, LayoutFlags::empty());
        assert_eq!(select_strategy(&fixed, 64), Strategy::Static);
    }

    #[test]
    fn threshold_is_exclusive() {
        let fixed = info(64, LayoutFlags::empty());
        assert_eq!(select_strategy(&fixed, 64), Strategy::Streaming);
        assert_eq!(select_strategy(&fixed, 65), Strategy::Static);
    }

    #[test]
    fn zero_threshold_forces_streaming() {
        let empty = info(0, LayoutFlags::empty());
        assert_eq!(select_strategy(&empty, 0), Strategy::Streaming);
    }

    #[test]
    fn variable_or_dispatched_is_streaming() {
        for flags in [LayoutFlags::VARIABLE_LENGTH, LayoutFlags::REQUIRES_DISPATCH] {
            assert_eq!(select_strategy(&info(2, flags), 64), Strategy::Streaming);
        }
    }
}
