//! Procedural chunk generation
//!
//! The world is laid out one fixed-width chunk at a time, ahead of the camera.
//! Each chunk gets its own RNG seeded from the run seed and the chunk index, so
//! a run can be regenerated from its seed and the generator state is just a
//! handful of counters.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{
    Checkpoint, Flyer, Gap, Gate, Grain, GroundHazard, Platform, PowerUp, PowerUpKind, Spring,
};
use super::state::World;
use super::zone::zone_index_for;
use crate::to_meters;
use crate::tuning::{ChunkWeights, Tuning};

/// Mixes the chunk index into the run seed
const CHUNK_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkKind {
    Safe,
    Platform,
    Gap,
    /// Spikes or a crawler on the ground
    Spike,
    Flyer,
    Gate,
}

impl ChunkKind {
    /// Gap and spike chunks count against hazard spacing
    pub fn is_ground_hazard(self) -> bool {
        matches!(self, ChunkKind::Gap | ChunkKind::Spike)
    }
}

/// Generation cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkGenerator {
    pub seed: u64,
    /// Chunks generated so far
    pub chunk_index: u64,
    /// World X (pixels) where the next chunk starts
    pub next_chunk_x: f32,
    /// Non-gate chunks since the last gate
    pub chunks_since_gate: u32,
    /// Chunks since the last gap/spike chunk
    pub chunks_since_hazard: u32,
}

/// Where and how hard the current chunk is
#[derive(Debug, Clone, Copy)]
struct Layout {
    /// Screen X of the chunk's left edge
    origin: f32,
    width: f32,
    ground_y: f32,
    screen_height: f32,
    difficulty: f32,
}

impl ChunkGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            chunk_index: 0,
            next_chunk_x: 0.0,
            chunks_since_gate: 0,
            chunks_since_hazard: u32::MAX,
        }
    }

    fn chunk_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.chunk_index.wrapping_mul(CHUNK_SEED_MIX))
    }

    /// Generate chunks until the next one starts at least one chunk plus one screen
    /// ahead of the camera. Calling again at the same distance generates nothing.
    pub fn ensure_ahead(
        &mut self,
        world: &mut World,
        tuning: &Tuning,
        distance: f32,
        screen_width: f32,
        screen_height: f32,
        ground_y: f32,
    ) -> usize {
        let mut generated = 0;
        while self.next_chunk_x - distance < tuning.chunk_width + screen_width {
            self.generate(world, tuning, distance, screen_height, ground_y);
            generated += 1;
        }
        generated
    }

    /// Lay out exactly one chunk and advance the cursor
    pub fn generate(
        &mut self,
        world: &mut World,
        tuning: &Tuning,
        distance: f32,
        screen_height: f32,
        ground_y: f32,
    ) -> ChunkKind {
        let start_m = to_meters(self.next_chunk_x);
        let mut rng = self.chunk_rng();
        let layout = Layout {
            origin: self.next_chunk_x - distance,
            width: tuning.chunk_width,
            ground_y,
            screen_height,
            difficulty: tuning.difficulty(start_m),
        };

        let kind = self.choose_kind(tuning, start_m, layout.difficulty, &mut rng);
        match kind {
            ChunkKind::Safe => lay_safe(world, &mut rng, &layout, tuning),
            ChunkKind::Platform => lay_platforms(world, &mut rng, &layout, tuning),
            ChunkKind::Gap => lay_gap(world, &mut rng, &layout, tuning),
            ChunkKind::Spike => lay_ground_hazard(world, &mut rng, &layout, tuning),
            ChunkKind::Flyer => lay_flyer(world, &mut rng, &layout, tuning),
            ChunkKind::Gate => lay_gate(world, &mut rng, &layout, tuning),
        }

        if rng.random_bool(tuning.power_up_chance as f64) {
            let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
            let x = layout.origin + layout.width * rng.random_range(0.25..0.75);
            let id = world.next_id();
            world.power_ups.push(PowerUp::new(
                id,
                kind,
                x,
                ground_y - 120.0,
                rng.random::<f32>() * std::f32::consts::TAU,
            ));
        }

        if tuning.checkpoint_every > 0
            && self.chunk_index > 0
            && self.chunk_index % tuning.checkpoint_every as u64 == 0
            && kind != ChunkKind::Gap
        {
            let id = world.next_id();
            world
                .checkpoints
                .push(Checkpoint::new(id, layout.origin + 8.0, ground_y));
        }

        log::debug!(
            "chunk {} {:?} at {:.0} m (difficulty {:.2})",
            self.chunk_index,
            kind,
            start_m,
            layout.difficulty
        );

        if kind == ChunkKind::Gate {
            self.chunks_since_gate = 0;
        } else {
            self.chunks_since_gate += 1;
        }
        if kind.is_ground_hazard() {
            self.chunks_since_hazard = 0;
        } else {
            self.chunks_since_hazard = self.chunks_since_hazard.saturating_add(1);
        }
        self.chunk_index += 1;
        self.next_chunk_x += tuning.chunk_width;
        kind
    }

    fn choose_kind(
        &self,
        tuning: &Tuning,
        start_m: f32,
        difficulty: f32,
        rng: &mut Pcg32,
    ) -> ChunkKind {
        if self.chunks_since_gate >= tuning.gate_interval(start_m) {
            return ChunkKind::Gate;
        }
        if self.chunk_index < tuning.grace_chunks as u64 {
            return ChunkKind::Safe;
        }

        let bias = tuning
            .zones
            .get(zone_index_for(&tuning.zones, start_m))
            .map(|z| z.hazard_bias)
            .unwrap_or(1.0);
        let mut weights = tuning.weights_at(difficulty);
        weights.gap *= bias;
        weights.spike *= bias;
        weights.flyer *= bias;
        if self.chunks_since_hazard < tuning.hazard_spacing {
            weights.gap = 0.0;
            weights.spike = 0.0;
        }
        pick_weighted(&weights, rng)
    }
}

fn pick_weighted(weights: &ChunkWeights, rng: &mut Pcg32) -> ChunkKind {
    let table = [
        (ChunkKind::Safe, weights.safe),
        (ChunkKind::Platform, weights.platform),
        (ChunkKind::Gap, weights.gap),
        (ChunkKind::Spike, weights.spike),
        (ChunkKind::Flyer, weights.flyer),
    ];
    let total: f32 = table.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return ChunkKind::Safe;
    }
    let mut roll = rng.random::<f32>() * total;
    for (kind, weight) in table {
        let weight = weight.max(0.0);
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    ChunkKind::Safe
}

/// Grains on a half-sine arc from `start_x` to `end_x`, peaking `arc` above `base_y`
fn scatter_grains(
    world: &mut World,
    rng: &mut Pcg32,
    tuning: &Tuning,
    start_x: f32,
    end_x: f32,
    base_y: f32,
    arc: f32,
) {
    let hi = tuning.grains_max.max(tuning.grains_min);
    let count = rng.random_range(tuning.grains_min..=hi).max(1);
    let phase = rng.random::<f32>() * std::f32::consts::TAU;
    for i in 0..count {
        let t = if count == 1 {
            0.5
        } else {
            i as f32 / (count - 1) as f32
        };
        let x = start_x + (end_x - start_x) * t;
        let y = base_y - arc * (t * std::f32::consts::PI).sin();
        let id = world.next_id();
        world.grains.push(Grain::new(id, x, y, phase + i as f32 * 0.4));
    }
}

fn armor_for(rng: &mut Pcg32, layout: &Layout, tuning: &Tuning) -> u8 {
    if layout.difficulty >= tuning.armor_from_difficulty
        && rng.random_bool(tuning.armor_chance as f64)
    {
        1
    } else {
        0
    }
}

fn lay_safe(world: &mut World, rng: &mut Pcg32, layout: &Layout, tuning: &Tuning) {
    scatter_grains(
        world,
        rng,
        tuning,
        layout.origin + 60.0,
        layout.origin + layout.width - 60.0,
        layout.ground_y - 30.0,
        30.0,
    );
}

fn lay_platforms(world: &mut World, rng: &mut Pcg32, layout: &Layout, tuning: &Tuning) {
    let count = if rng.random_bool(0.3 + 0.5 * layout.difficulty as f64) {
        2
    } else {
        1
    };
    let slot = layout.width / count as f32;
    let oscillate_chance = (tuning.oscillate_chance_max * layout.difficulty) as f64;
    for i in 0..count {
        let width = rng.random_range(110.0..190.0);
        let x = layout.origin + 60.0 + i as f32 * slot;
        let y = layout.ground_y - rng.random_range(90.0..150.0);
        let id = world.next_id();
        let platform = if rng.random_bool(oscillate_chance) {
            let amplitude = rng.random_range(18.0..36.0);
            let phase = rng.random::<f32>() * std::f32::consts::TAU;
            Platform::oscillating(id, x, y, width, 16.0, amplitude, phase)
        } else {
            Platform::new(id, x, y, width, 16.0)
        };
        if i == 0 {
            scatter_grains(world, rng, tuning, x + 10.0, x + width - 10.0, y - 28.0, 20.0);
        }
        world.platforms.push(platform);
    }
    if rng.random_bool(tuning.spring_chance as f64) {
        let id = world.next_id();
        world
            .springs
            .push(Spring::new(id, layout.origin + 20.0, layout.ground_y));
    }
}

fn lay_gap(world: &mut World, rng: &mut Pcg32, layout: &Layout, tuning: &Tuning) {
    let max_width = 80.0 + 120.0 * layout.difficulty;
    let width = rng.random_range(80.0..=max_width);
    let x = layout.origin + (layout.width - width) / 2.0;
    let id = world.next_id();
    world.gaps.push(Gap::new(id, x, width, layout.ground_y));
    scatter_grains(
        world,
        rng,
        tuning,
        x - 30.0,
        x + width + 30.0,
        layout.ground_y - 60.0,
        70.0,
    );
}

fn lay_ground_hazard(world: &mut World, rng: &mut Pcg32, layout: &Layout, tuning: &Tuning) {
    let center = layout.origin + layout.width / 2.0;
    if rng.random_bool(0.5) {
        let armor = armor_for(rng, layout, tuning);
        let id = world.next_id();
        world
            .ground_hazards
            .push(GroundHazard::crawler(id, center, layout.ground_y, armor));
    } else {
        let max_spikes = 1 + (layout.difficulty * 2.0) as u32;
        let count = rng.random_range(1..=max_spikes);
        for i in 0..count {
            let id = world.next_id();
            world.ground_hazards.push(GroundHazard::spike(
                id,
                center + i as f32 * 32.0,
                layout.ground_y,
            ));
        }
    }
    scatter_grains(
        world,
        rng,
        tuning,
        center - 60.0,
        center + 100.0,
        layout.ground_y - 70.0,
        60.0,
    );
}

fn lay_flyer(world: &mut World, rng: &mut Pcg32, layout: &Layout, tuning: &Tuning) {
    let base_y = layout.ground_y - rng.random_range(95.0..150.0);
    let armor = armor_for(rng, layout, tuning);
    let phase = rng.random::<f32>() * std::f32::consts::TAU;
    let id = world.next_id();
    world.flyers.push(Flyer::new(
        id,
        layout.origin + layout.width * 0.6,
        base_y,
        phase,
        armor,
    ));
    scatter_grains(
        world,
        rng,
        tuning,
        layout.origin + 60.0,
        layout.origin + layout.width - 60.0,
        layout.ground_y - 30.0,
        10.0,
    );
}

fn lay_gate(world: &mut World, rng: &mut Pcg32, layout: &Layout, tuning: &Tuning) {
    let x = layout.origin + layout.width / 2.0;
    scatter_grains(
        world,
        rng,
        tuning,
        layout.origin + 40.0,
        x - 40.0,
        layout.ground_y - 30.0,
        20.0,
    );
    let id = world.next_id();
    world
        .gates
        .push(Gate::new(id, x, layout.ground_y, layout.screen_height));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HEIGHT: f32 = 540.0;
    const GROUND: f32 = 476.0;

    /// Generate `n` chunks, returning each kind with its start distance (meters)
    fn run_chunks(seed: u64, tuning: &Tuning, n: usize) -> Vec<(ChunkKind, f32)> {
        let mut generator = ChunkGenerator::new(seed);
        let mut world = World::default();
        (0..n)
            .map(|_| {
                let start_m = to_meters(generator.next_chunk_x);
                let kind = generator.generate(
                    &mut world,
                    tuning,
                    generator.next_chunk_x,
                    HEIGHT,
                    GROUND,
                );
                (kind, start_m)
            })
            .collect()
    }

    #[test]
    fn test_grace_chunks_are_safe() {
        let tuning = Tuning::default();
        for seed in 0..20 {
            let chunks = run_chunks(seed, &tuning, tuning.grace_chunks as usize);
            assert!(chunks.iter().all(|(k, _)| *k == ChunkKind::Safe));
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let tuning = Tuning::default();
        let a = run_chunks(42, &tuning, 60);
        let b = run_chunks(42, &tuning, 60);
        assert_eq!(a, b);
        let c = run_chunks(43, &tuning, 60);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ensure_ahead_is_idempotent() {
        let tuning = Tuning::default();
        let mut generator = ChunkGenerator::new(5);
        let mut world = World::default();
        let first = generator.ensure_ahead(&mut world, &tuning, 0.0, 960.0, HEIGHT, GROUND);
        assert!(first > 0);
        let objects = world.object_count();
        assert_eq!(
            generator.ensure_ahead(&mut world, &tuning, 0.0, 960.0, HEIGHT, GROUND),
            0
        );
        assert_eq!(world.object_count(), objects);
        // One more chunk width of travel yields exactly one more chunk
        assert_eq!(
            generator.ensure_ahead(
                &mut world,
                &tuning,
                tuning.chunk_width,
                960.0,
                HEIGHT,
                GROUND
            ),
            1
        );
    }

    #[test]
    fn test_hazard_spacing() {
        let tuning = Tuning {
            difficulty_full_at_m: 1.0,
            ..Tuning::default()
        };
        for seed in 0..20 {
            let chunks = run_chunks(seed, &tuning, 200);
            for pair in chunks.windows(2) {
                assert!(!(pair[0].0.is_ground_hazard() && pair[1].0.is_ground_hazard()));
            }
        }
    }

    #[test]
    fn test_chunk_objects_are_placed_in_chunk() {
        let tuning = Tuning::default();
        let mut generator = ChunkGenerator::new(11);
        let mut world = World::default();
        // Camera far behind: the chunk lands off-screen to the right
        generator.next_chunk_x = 5000.0;
        generator.chunk_index = 20;
        generator.generate(&mut world, &tuning, 3000.0, HEIGHT, GROUND);
        assert!(world.grains.iter().all(|g| g.x > 1900.0 && g.x < 2600.0));
    }

    proptest! {
        #[test]
        fn prop_gate_cadence_bounds(seed in any::<u64>()) {
            let tuning = Tuning::default();
            let chunks = run_chunks(seed, &tuning, 300);
            let mut since_gate = 0u32;
            let mut interval_at_last_gate = tuning.gate_interval(0.0);
            let mut gates = 0;
            for (kind, start_m) in chunks {
                if kind == ChunkKind::Gate {
                    prop_assert!(since_gate >= tuning.gate_interval_floor);
                    prop_assert!(since_gate <= interval_at_last_gate);
                    interval_at_last_gate = tuning.gate_interval(start_m);
                    since_gate = 0;
                    gates += 1;
                } else {
                    since_gate += 1;
                    prop_assert!(since_gate <= interval_at_last_gate);
                }
            }
            prop_assert!(gates > 0);
        }
    }
}
