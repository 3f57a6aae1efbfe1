//! `PostShuffleReader` adapter: translates a `PartitionPlan` into reader
//! calls against the external shuffle transport (§4.5).
//!
//! Intentionally thin. Its only job is to pin down the exact arguments
//! passed to the transport and discard the transport's echoed partition id
//! (already implicit in the post-partition assignment).

use crate::exchange::ShuffleHandle;
use crate::plan::{PostShufflePartition, PostShufflePlan};

/// External shuffle transport: given a handle and a pre-shuffle partition
/// range (optionally restricted to one map task), yields rows.
///
/// Out of scope for this crate beyond this one call -- the actual transfer
/// of bytes lives in the surrounding engine.
pub trait ShuffleTransport {
    /// The row type yielded by this transport.
    type Row;
    /// The iterator returned by [`Self::get_reader`].
    type Reader: Iterator<Item = (u32, Self::Row)>;

    /// Open a reader over `[pre_start, pre_end)` of `handle`'s blocks,
    /// optionally restricted to a single map task's output.
    fn get_reader(
        &self,
        handle: &ShuffleHandle,
        pre_start: u32,
        pre_end: u32,
        map_task_restriction: Option<u32>,
    ) -> Self::Reader;
}

/// Adapter that drives a [`ShuffleTransport`] across every partition of a
/// [`PostShufflePlan`] bound to one [`ShuffleHandle`], yielding rows with
/// the transport's partition ids discarded.
pub struct PostShuffleReader<'a, T: ShuffleTransport> {
    transport: &'a T,
    handle: ShuffleHandle,
    plan: PostShufflePlan,
}

impl<'a, T: ShuffleTransport> PostShuffleReader<'a, T> {
    /// Bind a transport, the dependency handle it should read from, and the
    /// plan produced for this exchange.
    #[must_use]
    pub fn new(transport: &'a T, handle: ShuffleHandle, plan: PostShufflePlan) -> Self {
        Self {
            transport,
            handle,
            plan,
        }
    }

    /// Open the reader for a single post-shuffle partition, yielding rows
    /// with the transport's partition ids discarded.
    pub fn read_partition(&self, partition: &PostShufflePartition) -> impl Iterator<Item = T::Row> + '_ {
        self.transport
            .get_reader(
                &self.handle,
                partition.pre_start,
                partition.pre_end,
                partition.map_task_restriction,
            )
            .map(|(_partition_id, row)| row)
    }

    /// Iterate every post-shuffle partition in plan order, reading each in
    /// turn and flattening into a single row stream.
    pub fn read_all(&self) -> impl Iterator<Item = T::Row> + '_ {
        self.plan
            .partitions()
            .iter()
            .flat_map(move |partition| self.read_partition(partition))
    }

    /// The plan this reader is driving.
    #[must_use]
    pub fn plan(&self) -> &PostShufflePlan {
        &self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecTransport {
        rows: Vec<(u32, &'static str)>,
    }

    impl ShuffleTransport for VecTransport {
        type Row = &'static str;
        type Reader = std::vec::IntoIter<(u32, &'static str)>;

        fn get_reader(
            &self,
            _handle: &ShuffleHandle,
            pre_start: u32,
            pre_end: u32,
            map_task_restriction: Option<u32>,
        ) -> Self::Reader {
            let _ = map_task_restriction;
            self.rows
                .iter()
                .copied()
                .filter(|(id, _)| *id >= pre_start && *id < pre_end)
                .collect::<Vec<_>>()
                .into_iter()
        }
    }

    #[test]
    fn read_all_flattens_every_partition_in_order() {
        let transport = VecTransport {
            rows: vec![(0, "a"), (1, "b"), (2, "c")],
        };
        let plan = PostShufflePlan::from_start_indices(&[0, 2], 3);
        let reader = PostShuffleReader::new(&transport, ShuffleHandle(0), plan);
        let rows: Vec<_> = reader.read_all().collect();
        assert_eq!(rows, vec!["a", "b", "c"]);
    }

    #[test]
    fn read_partition_reads_only_its_own_range() {
        let transport = VecTransport {
            rows: vec![(0, "a"), (1, "b"), (2, "c"), (3, "d")],
        };
        let plan = PostShufflePlan::from_start_indices(&[0, 2], 4);
        let reader = PostShuffleReader::new(&transport, ShuffleHandle(0), plan.clone());
        let rows: Vec<_> = reader.read_partition(&plan.partitions()[1]).collect();
        assert_eq!(rows, vec!["c", "d"]);
    }
}
