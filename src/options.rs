use crate::error::KVListError;
use crate::Result;

/// Default number of trailing entries a block keeps after a split.
pub const DEFAULT_TARGET_FILL: u32 = 316;

/// Configuration for an [`UnrolledList`](crate::UnrolledList)
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    /// Trailing entries left in a block after it is split (default: 316)
    pub target_fill: u32,

    /// Trailing entries at which a block is split (default: 2 * target_fill)
    pub max_fill: u32,

    /// Call `sync_data` on flush (default: false)
    pub sync: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            target_fill: DEFAULT_TARGET_FILL,
            max_fill: 2 * DEFAULT_TARGET_FILL,
            sync: false,
        }
    }
}

impl ListOptions {
    /// Set target fill, and the split threshold to twice of it.
    pub fn target_fill(mut self, target_fill: u32) -> Self {
        self.target_fill = target_fill;
        self.max_fill = target_fill.saturating_mul(2);
        self
    }

    /// Set split threshold
    pub fn max_fill(mut self, max_fill: u32) -> Self {
        self.max_fill = max_fill;
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_fill == 0 {
            return Err(KVListError::InvalidOptions(
                "target_fill must be positive".into(),
            ));
        }
        if self.max_fill <= self.target_fill {
            return Err(KVListError::InvalidOptions(format!(
                "max_fill ({}) must be greater than target_fill ({})",
                self.max_fill, self.target_fill
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = ListOptions::default().target_fill(4).sync(true);
        assert_eq!(options.max_fill, 8);
        assert!(options.sync);
        assert!(options.validate().is_ok());

        let options = ListOptions::default().target_fill(4).max_fill(4);
        assert!(matches!(
            options.validate(),
            Err(KVListError::InvalidOptions(_))
        ));
        assert!(ListOptions::default().target_fill(0).validate().is_err());
    }
}
