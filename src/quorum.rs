//! Majority arithmetic over the configured peer set.

/// Smallest number of peers that constitutes a majority of `cluster_size`.
pub fn quorum_size(cluster_size: usize) -> usize {
    cluster_size / 2 + 1
}

/// Whether `responses` positive answers out of `cluster_size` peers form a quorum.
pub fn has_quorum(responses: usize, cluster_size: usize) -> bool {
    responses >= quorum_size(cluster_size)
}
