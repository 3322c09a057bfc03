//! Bot records and the live roster
//!
//! Bot ids double as spawn seeds: the initial bot owns every id it may ever
//! hand out, fission partitions a contiguous low sub-range to the child, and
//! fusion folds the secondary's ids back into the primary. The roster is an
//! id-keyed arena; parent links are ids, never references.

use glam::IVec3;

use crate::Recorder;

/// Size of the bot id space, and therefore the maximum number of
/// concurrently live bots.
pub const MAX_BOTS: usize = 40;

/// Bitmask with exactly the ids in `[a, b]` set.
pub fn seed_range(a: u8, b: u8) -> u64 {
    assert!(a <= b && (b as usize) < MAX_BOTS, "bad seed range [{a}, {b}]");
    ((1u64 << (b + 1)) - 1) ^ ((1u64 << a) - 1)
}

/// Smallest id in a non-empty seed set.
pub fn lowest_seed(seeds: u64) -> u8 {
    assert!(seeds != 0, "empty seed set");
    seeds.trailing_zeros() as u8
}

/// Largest id in a non-empty seed set.
pub fn highest_seed(seeds: u64) -> u8 {
    assert!(seeds != 0, "empty seed set");
    (63 - seeds.leading_zeros()) as u8
}

/// One planning-side bot: identity, position, distributable ids, and the
/// plan it is recording.
#[derive(Debug)]
pub struct Bot {
    pub id: u8,
    pub pos: IVec3,
    pub seeds: u64,
    pub parent: Option<u8>,
    /// Rounds of this bot's plan already merged into the executor.
    pub step: u32,
    pub plan: Recorder,
}

impl Bot {
    pub fn new(id: u8, pos: IVec3, seeds: u64) -> Self {
        Self {
            id,
            pos,
            seeds,
            parent: None,
            step: 0,
            plan: Recorder::new(),
        }
    }

    /// The root bot: id 0 at the origin, owning every other id.
    pub fn initial() -> Self {
        Self::new(0, IVec3::ZERO, seed_range(1, (MAX_BOTS - 1) as u8))
    }
}

/// Live bots, kept ascending by id.
#[derive(Debug, Default)]
pub struct Roster {
    bots: Vec<Bot>,
}

impl Roster {
    /// Roster holding only the root bot.
    pub fn initial() -> Self {
        Self {
            bots: vec![Bot::initial()],
        }
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bot> {
        self.bots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bot> {
        self.bots.iter_mut()
    }

    pub fn get(&self, id: u8) -> Option<&Bot> {
        self.bots.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut Bot> {
        self.bots.iter_mut().find(|b| b.id == id)
    }

    /// Inserts a bot, keeping the roster sorted. Duplicate ids are a
    /// contract violation.
    pub fn insert(&mut self, bot: Bot) {
        let at = match self.bots.binary_search_by_key(&bot.id, |b| b.id) {
            Err(at) => at,
            Ok(_) => panic!("bot id {} is already live", bot.id),
        };
        self.bots.insert(at, bot);
    }

    pub fn remove(&mut self, id: u8) -> Option<Bot> {
        let at = self.bots.iter().position(|b| b.id == id)?;
        Some(self.bots.remove(at))
    }

    /// Planning-side fission bookkeeping: partitions the parent's seeds and
    /// inserts the child at `pos`. The child's id is the parent's lowest
    /// seed; it receives the `m` seeds above its own id. Returns the child
    /// id.
    ///
    /// Panics when the parent is not live or any requested id is outside
    /// its seeds.
    pub fn spawn(&mut self, parent_id: u8, m: u8, pos: IVec3) -> u8 {
        let parent = self
            .get_mut(parent_id)
            .unwrap_or_else(|| panic!("bot {parent_id} is not live"));
        let child_id = lowest_seed(parent.seeds);
        let granted = seed_range(child_id, child_id + m);
        assert!(
            parent.seeds & granted == granted,
            "fission ids [{child_id}, {}] outside the seeds of bot {parent_id}",
            child_id + m
        );
        parent.seeds &= !granted;
        let step = parent.step;
        let mut child = Bot::new(child_id, pos, granted & !(1 << child_id));
        child.parent = Some(parent_id);
        child.step = step;
        self.insert(child);
        child_id
    }

    /// Planning-side fusion bookkeeping: folds the secondary's seeds and id
    /// into the primary and removes it from the roster.
    pub fn fuse(&mut self, primary_id: u8, secondary_id: u8) {
        let secondary = self
            .remove(secondary_id)
            .unwrap_or_else(|| panic!("bot {secondary_id} is not live"));
        let primary = self
            .get_mut(primary_id)
            .unwrap_or_else(|| panic!("bot {primary_id} is not live"));
        primary.seeds |= secondary.seeds | 1 << secondary.id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_range_samples() {
        assert_eq!(seed_range(0, 0), 0b1);
        assert_eq!(seed_range(2, 5), 0b11_1100);
        assert_eq!(seed_range(0, 39), (1u64 << 40) - 1);
    }

    #[test]
    fn test_seed_extremes() {
        let seeds = seed_range(3, 17);
        assert_eq!(lowest_seed(seeds), 3);
        assert_eq!(highest_seed(seeds), 17);
    }

    #[test]
    fn test_initial_bot_owns_all_other_ids() {
        let bot = Bot::initial();
        assert_eq!(bot.id, 0);
        assert_eq!(bot.seeds, (1u64 << 40) - 2);
    }

    #[test]
    fn test_spawn_partitions_low_range() {
        let mut roster = Roster::initial();
        let child = roster.spawn(0, 4, IVec3::new(1, 0, 0));
        assert_eq!(child, 1);
        assert_eq!(roster.get(1).unwrap().seeds, seed_range(2, 5));
        assert_eq!(roster.get(1).unwrap().parent, Some(0));
        assert_eq!(roster.get(0).unwrap().seeds, seed_range(6, 39));
    }

    #[test]
    fn test_fission_fusion_round_trips_seeds() {
        let mut roster = Roster::initial();
        let before = roster.get(0).unwrap().seeds;
        let child = roster.spawn(0, 7, IVec3::new(0, 0, 1));
        roster.fuse(0, child);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(0).unwrap().seeds, before);
    }

    #[test]
    #[should_panic(expected = "outside the seeds")]
    fn test_spawn_rejects_ids_not_owned() {
        let mut roster = Roster::default();
        // bot 0 holds only ids 1 and 5; a two-id grant needs the missing id 2
        roster.insert(Bot::new(0, IVec3::ZERO, 1 << 1 | 1 << 5));
        roster.spawn(0, 1, IVec3::new(1, 0, 0));
    }
}
