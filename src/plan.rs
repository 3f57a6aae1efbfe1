//! The planner's output types: a single post-shuffle partition and the
//! ordered plan a registered exchange receives from the coordinator.

/// One post-shuffle (reduce-side) partition.
///
/// Invariants (upheld by every constructor in this crate, never by the
/// caller): `pre_start < pre_end <= P`; if `map_task_restriction` is set,
/// reads are limited to that single map task's output across the whole
/// `[pre_start, pre_end)` range.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PostShufflePartition {
    /// Position of this partition within its [`PostShufflePlan`]; always
    /// equal to the partition's array index.
    pub post_index: u32,
    /// Start of the covered pre-shuffle partition range (inclusive).
    pub pre_start: u32,
    /// End of the covered pre-shuffle partition range (exclusive).
    pub pre_end: u32,
    /// In broadcast mode, restricts reads to a single upstream map task's
    /// output. `None` in coalesce mode.
    pub map_task_restriction: Option<u32>,
}

impl PostShufflePartition {
    /// Number of pre-shuffle partitions this partition covers.
    #[must_use]
    pub fn pre_range_len(&self) -> u32 {
        self.pre_end - self.pre_start
    }
}

/// An ordered sequence of post-shuffle partitions handed back to one
/// registered exchange.
///
/// Invariants: `post_index` equals array position; the union of
/// `[pre_start, pre_end)` ranges either forms a contiguous, non-overlapping
/// cover of `[0, P)` (coalesce mode), or every range equals `[0, P)` with
/// distinct `map_task_restriction` values covering `[0, M)` exactly
/// (broadcast mode).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PostShufflePlan {
    partitions: Vec<PostShufflePartition>,
}

impl PostShufflePlan {
    /// Number of post-shuffle partitions in this plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether this plan has no partitions (never produced by this crate,
    /// but kept for API symmetry with `len`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Borrow the partitions in order.
    #[must_use]
    pub fn partitions(&self) -> &[PostShufflePartition] {
        &self.partitions
    }

    /// Build a coalesce-mode plan from a strictly increasing array of start
    /// indices (as produced by [`crate::coalescer::coalesce`]) and the
    /// upstream's pre-shuffle partition count `P`.
    ///
    /// `start_indices[0]` must be `0` and every entry must be `< p`; the
    /// final range's end is implicit (`p`).
    #[must_use]
    pub fn from_start_indices(start_indices: &[u32], p: u32) -> Self {
        debug_assert_eq!(start_indices.first().copied(), Some(0));
        let mut partitions = Vec::with_capacity(start_indices.len());
        for (i, &start) in start_indices.iter().enumerate() {
            let end = start_indices.get(i + 1).copied().unwrap_or(p);
            partitions.push(PostShufflePartition {
                post_index: i as u32,
                pre_start: start,
                pre_end: end,
                map_task_restriction: None,
            });
        }
        Self { partitions }
    }

    /// Build the trivial single-partition plan covering `[0, p)`, used both
    /// when there are no statistics to coalesce over and as the base case
    /// `start_indices == [0]`.
    #[must_use]
    pub fn trivial(p: u32) -> Self {
        Self::from_start_indices(&[0], p)
    }

    /// Build an `m`-long broadcast-mode plan for one side of a two-input
    /// join. `restrict_by_map_task` selects between the small side (every
    /// partition reads all of `[0, p)`, no restriction) and the large side
    /// (partition `i` is restricted to map task `i`).
    #[must_use]
    pub fn broadcast(p: u32, m: u32, restrict_by_map_task: bool) -> Self {
        let partitions = (0..m)
            .map(|i| PostShufflePartition {
                post_index: i,
                pre_start: 0,
                pre_end: p,
                map_task_restriction: restrict_by_map_task.then_some(i),
            })
            .collect();
        Self { partitions }
    }
}
