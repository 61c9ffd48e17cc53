//! Collision resolution at group granularity.
//!
//! When a key's home group has no matching slot and no empty slot, the table
//! moves on to another group chosen by a [`ProbePolicy`]. A policy must visit
//! every group exactly once before it repeats, otherwise inserts may fail to
//! find the free slot that the load factor guarantees exists.

/// Chooses the next group to visit along a probe sequence.
pub trait ProbePolicy {
    /// Returns the group to visit after `group`.
    ///
    /// `step` counts how many groups have been left so far, starting at 1 for
    /// the move away from the home group. `num_groups` is always a power of
    /// two.
    fn next_group(&self, group: usize, step: usize, num_groups: usize) -> usize;
}

/// Visits groups in order, wrapping at the end of the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinearProbe;

impl ProbePolicy for LinearProbe {
    #[inline(always)]
    fn next_group(&self, group: usize, _step: usize, num_groups: usize) -> usize {
        (group + 1) % num_groups
    }
}

/// Jumps by one more group on every step, so the offsets from the home group
/// are the triangular numbers.
///
/// Triangular numbers modulo a power of two cover every residue, so all
/// groups are visited before the sequence repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriangularProbe;

impl ProbePolicy for TriangularProbe {
    #[inline(always)]
    fn next_group(&self, group: usize, step: usize, num_groups: usize) -> usize {
        debug_assert!(num_groups.is_power_of_two());
        (group + step) & (num_groups - 1)
    }
}

/// Position along a probe sequence.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProbeSeq {
    pub(crate) group: usize,
    step: usize,
}

impl ProbeSeq {
    #[inline(always)]
    pub(crate) fn new(home: usize) -> Self {
        ProbeSeq {
            group: home,
            step: 0,
        }
    }

    /// Number of groups left behind so far.
    #[cfg(any(test, feature = "stats"))]
    #[inline(always)]
    pub(crate) fn step(&self) -> usize {
        self.step
    }

    #[inline(always)]
    pub(crate) fn move_next<P: ProbePolicy + ?Sized>(&mut self, policy: &P, num_groups: usize) {
        self.step += 1;
        // The load factor keeps at least one empty slot in the table, so a
        // well-formed policy never needs a full cycle.
        debug_assert!(
            self.step < num_groups,
            "probe sequence wrapped without finding a free group"
        );
        self.group = policy.next_group(self.group, self.step, num_groups);
    }
}
