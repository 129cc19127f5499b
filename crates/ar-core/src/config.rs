/// Default bound on the number of ancestors walked before giving up.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for walking the reference-frame graph.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Maximum number of ancestor frames followed before the chain is
    /// reported as structurally broken.
    pub max_depth: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GraphConfig {
    /// Set the maximum ancestor depth (at least 1).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        assert_eq!(GraphConfig::default().max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn max_depth_never_zero() {
        assert_eq!(GraphConfig::default().with_max_depth(0).max_depth, 1);
        assert_eq!(GraphConfig::default().with_max_depth(8).max_depth, 8);
    }
}
