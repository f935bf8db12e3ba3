//! Generator configuration.

use binidl_ir::Endian;
use binidl_layout::DEFAULT_STATIC_THRESHOLD;

/// Options fixed for a whole generation run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    /// Byte order of every multi-byte field.
    pub endian: Endian,
    /// Fixed records smaller than this use the static strategy.
    ///
    /// `0` forces streaming everywhere; `usize::MAX` makes every fixed,
    /// dispatch-free record static.
    pub static_threshold: usize,
    /// Whether to emit an instance pool per record.
    pub emit_pools: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            endian: Endian::Little,
            static_threshold: DEFAULT_STATIC_THRESHOLD,
            emit_pools: true,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    #[must_use]
    pub fn with_static_threshold(mut self, threshold: usize) -> Self {
        self.static_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_pools(mut self, emit_pools: bool) -> Self {
        self.emit_pools = emit_pools;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.endian, Endian::Little);
        assert_eq!(config.static_threshold, 64);
        assert!(config.emit_pools);
    }

    #[test]
    fn builder_overrides() {
        let config = GeneratorConfig::default()
            .with_endian(Endian::Big)
            .with_static_threshold(0)
            .with_pools(false);
        assert_eq!(
            config,
            GeneratorConfig {
                endian: Endian::Big,
                static_threshold: 0,
                emit_pools: false,
            }
        );
    }
}
