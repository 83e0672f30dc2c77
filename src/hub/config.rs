//! Hub configuration

/// Hub configuration options
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity of each subscriber's outbound queue
    ///
    /// Determines how many pending snapshots a subscriber may accumulate
    /// before it is evicted as a slow consumer.
    pub queue_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { queue_capacity: 32 }
    }
}

impl HubConfig {
    /// Set the per-subscriber queue capacity (minimum 1)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.queue_capacity, 32);
    }

    #[test]
    fn test_builder_queue_capacity() {
        let config = HubConfig::default().queue_capacity(4);
        assert_eq!(config.queue_capacity, 4);
    }

    #[test]
    fn test_queue_capacity_floor() {
        // mpsc channels reject a zero capacity
        let config = HubConfig::default().queue_capacity(0);
        assert_eq!(config.queue_capacity, 1);
    }
}
