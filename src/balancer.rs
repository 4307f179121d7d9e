//! Load balancer: picks the staff member a new ticket is assigned to.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::storage::Workload;

/// Choose the eligible staff member with the fewest waiting or in-progress
/// tickets. Ties are broken uniformly at random.
///
/// Only `Available` and `Busy` staff are eligible. Returns `None` when no one is.
pub fn select_employee<'a, R>(workloads: &'a [Workload], rng: &mut R) -> Option<&'a Workload>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<&Workload> = workloads
        .iter()
        .filter(|w| w.status.takes_new_tickets())
        .collect();

    let min = eligible.iter().map(|w| w.active).min()?;
    let tied: Vec<&Workload> = eligible.into_iter().filter(|w| w.active == min).collect();

    tied.choose(rng).copied()
}
