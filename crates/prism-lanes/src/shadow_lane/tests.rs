// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::*;
use prism_core::math::{Aabb, Vec3};
use prism_core::renderer::visibility::visible_spot_shadow_renderable_n;
use prism_core::renderer::{
    LightInstance, ShadowOptions, ShadowTechnique, ShadowUpdate, VisibilityState,
};
use prism_data::{LightRow, RenderableRow};

struct MockLights {
    shadow: Vec<bool>,
    spot: Vec<bool>,
    options: ShadowOptions,
}

impl LightManager for MockLights {
    fn is_light_caster(&self, _li: LightInstance) -> bool {
        true
    }
    fn intensity(&self, _li: LightInstance) -> f32 {
        1.0
    }
    fn is_spot_light(&self, li: LightInstance) -> bool {
        self.spot[li.0 as usize]
    }
    fn cos_outer_squared(&self, _li: LightInstance) -> f32 {
        0.5
    }
    fn is_shadow_caster(&self, li: LightInstance) -> bool {
        self.shadow[li.0 as usize]
    }
    fn shadow_options(&self, _li: LightInstance) -> &ShadowOptions {
        &self.options
    }
}

#[derive(Default)]
struct RecordingShadowMaps {
    resets: usize,
    cascades: Vec<usize>,
    spots: Vec<usize>,
}

impl ShadowMapManager for RecordingShadowMaps {
    fn reset(&mut self) {
        self.resets += 1;
        self.cascades.clear();
        self.spots.clear();
    }
    fn set_shadow_cascades(&mut self, light_index: usize, _options: &ShadowOptions) {
        self.cascades.push(light_index);
    }
    fn add_spot_shadow_map(&mut self, light_index: usize, _options: &ShadowOptions) {
        self.spots.push(light_index);
    }
    fn update(&mut self, _frame: &mut ShadowUpdate<'_>) -> ShadowTechnique {
        ShadowTechnique::empty()
    }
}

/// Light 0 is the sun; lights `1..=n` follow the given (shadow, spot) flags.
fn lights(sun_casts: bool, flags: &[(bool, bool)]) -> (MockLights, LightSoa) {
    let mut lcm = MockLights {
        shadow: vec![sun_casts],
        spot: vec![false],
        options: ShadowOptions::default(),
    };
    let mut soa = LightSoa::new();
    soa.set_directional(Some(LightInstance(0)), Vec3::new(0.0, -1.0, 0.0));
    for (i, &(shadow, spot)) in flags.iter().enumerate() {
        lcm.shadow.push(shadow);
        lcm.spot.push(spot);
        soa.push(LightRow {
            instance: Some(LightInstance(i as u32 + 1)),
            position: Vec3::ZERO,
            radius: 1.0,
            direction: Vec3::Z,
        });
    }
    // Mark every row selected, as light selection would.
    soa.columns_mut().visibility.fill(1);
    (lcm, soa)
}

// ── Classification ──

#[test]
fn test_directional_cascades_only_when_casting() {
    let lane = ShadowCasterLane::new(SceneLimits::default());
    let mut maps = RecordingShadowMaps::default();

    let (lcm, soa) = lights(true, &[]);
    assert!(lane.classify(&lcm, &soa, &mut maps).directional);
    assert_eq!(maps.cascades, vec![0]);

    let (lcm, soa) = lights(false, &[]);
    assert!(!lane.classify(&lcm, &soa, &mut maps).directional);
    assert!(maps.cascades.is_empty());
    assert_eq!(maps.resets, 2);
}

#[test]
fn test_only_shadow_casting_spots_are_registered() {
    let lane = ShadowCasterLane::new(SceneLimits::default());
    let mut maps = RecordingShadowMaps::default();
    // (shadow, spot): point caster, spot non-caster, spot caster.
    let (lcm, soa) = lights(false, &[(true, false), (false, true), (true, true)]);
    let casters = lane.classify(&lcm, &soa, &mut maps);
    assert_eq!(casters.spot_lights, vec![3]);
    assert_eq!(maps.spots, vec![3]);
}

#[test]
fn test_spot_casters_capped_in_selection_order() {
    let lane = ShadowCasterLane::new(SceneLimits::default());
    let mut maps = RecordingShadowMaps::default();
    let (lcm, soa) = lights(false, &[(true, true); 20]);
    let casters = lane.classify(&lcm, &soa, &mut maps);
    assert_eq!(casters.spot_lights, (1..=14).collect::<Vec<_>>());
    assert_eq!(maps.spots.len(), 14);

    let small = ShadowCasterLane::new(SceneLimits {
        max_shadow_casting_spots: 2,
        ..Default::default()
    });
    assert_eq!(small.classify(&lcm, &soa, &mut maps).spot_lights, vec![1, 2]);
}

// ── Partition ──

fn bucket(mask: VisibleMask) -> usize {
    match mask & VISIBLE_DIR_AND_RENDERABLE {
        VISIBLE_RENDERABLE => 0,
        VISIBLE_DIR_AND_RENDERABLE => 1,
        VISIBLE_DIR_SHADOW_RENDERABLE => 2,
        _ if mask & VISIBLE_SPOT_SHADOW_RENDERABLE != 0 => 3,
        _ => 4,
    }
}

fn store_with_masks(masks: &[VisibleMask]) -> RenderableSoa {
    let mut soa = RenderableSoa::new();
    for (i, _) in masks.iter().enumerate() {
        soa.push(RenderableRow {
            instance: i as u32,
            world_aabb: Aabb::from_center_half_extents(Vec3::new(i as f32, 0.0, 0.0), Vec3::ONE),
            layers: 0x1,
            visibility: VisibilityState::DEFAULT_CASTER,
        });
    }
    soa.visible_masks_mut()[..masks.len()].copy_from_slice(masks);
    soa
}

#[test]
fn test_partition_orders_buckets_and_covers_store() {
    let spot = visible_spot_shadow_renderable_n(0);
    let masks: Vec<VisibleMask> = (0..37)
        .map(|i| match i % 7 {
            0 => 0,
            1 => VISIBLE_RENDERABLE,
            2 => VISIBLE_DIR_AND_RENDERABLE,
            3 => VISIBLE_DIR_SHADOW_RENDERABLE | spot,
            4 => spot,
            5 => VISIBLE_RENDERABLE | visible_spot_shadow_renderable_n(5),
            _ => VISIBLE_DIR_SHADOW_RENDERABLE,
        })
        .collect();
    let mut soa = store_with_masks(&masks);

    let ranges = ShadowCasterLane::new(SceneLimits::default()).partition(&mut soa);

    // Buckets are in non-decreasing order over the whole store.
    let buckets: Vec<usize> = soa.visible_masks()[..soa.len()].iter().map(|&m| bucket(m)).collect();
    assert!(buckets.windows(2).all(|w| w[0] <= w[1]));

    // Rows moved as a whole.
    for i in 0..soa.len() {
        assert_eq!(soa.visible_masks()[i], masks[soa.instances()[i] as usize]);
        assert_eq!(soa.world_aabb_centers()[i].x, soa.instances()[i] as f32);
    }

    let count = |b: usize| buckets.iter().filter(|&&x| x == b).count();
    let (b0, b1, b2, b3) = (count(0), count(1), count(2), count(3));
    assert_eq!(ranges.visible_renderables, Range::new(0, b0 + b1));
    assert_eq!(ranges.directional_casters, Range::new(b0, b0 + b1 + b2));
    assert_eq!(ranges.spot_casters, Range::new(0, b0 + b1 + b2 + b3));
    assert_eq!(ranges.merged, ranges.spot_casters);

    for i in ranges.visible_renderables {
        assert_ne!(soa.visible_masks()[i] & VISIBLE_RENDERABLE, 0);
    }
    for i in ranges.directional_casters {
        assert_ne!(soa.visible_masks()[i] & VISIBLE_DIR_SHADOW_RENDERABLE, 0);
    }
    for i in ranges.merged.end..soa.len() {
        assert_eq!(soa.visible_masks()[i], 0);
    }
}

#[test]
fn test_partition_buckets_are_disjoint_and_cover_store() {
    let spot = visible_spot_shadow_renderable_n(3);
    let masks: Vec<VisibleMask> = (0..41)
        .map(|i| match i % 5 {
            0 => VISIBLE_DIR_SHADOW_RENDERABLE,
            1 => 0,
            2 => spot,
            3 => VISIBLE_DIR_AND_RENDERABLE | spot,
            _ => VISIBLE_RENDERABLE,
        })
        .collect();
    let mut soa = store_with_masks(&masks);

    let buckets = ShadowCasterLane::new(SceneLimits::default())
        .partition(&mut soa)
        .buckets;

    // Consecutive, so pairwise disjoint, and spanning 0..len.
    let ranges = buckets.ranges();
    assert_eq!(ranges[0].begin, 0);
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].end, pair[1].begin);
    }
    assert_eq!(ranges[3].end, soa.len());
    assert_eq!(ranges.iter().map(Range::len).sum::<usize>(), soa.len());

    let mask = |row: usize| soa.visible_masks()[row];
    assert_eq!(buckets.first_directional_caster, 8);
    for row in buckets.renderable {
        let expected = if row < buckets.first_directional_caster {
            VISIBLE_RENDERABLE
        } else {
            VISIBLE_DIR_AND_RENDERABLE
        };
        assert_eq!(mask(row) & VISIBLE_DIR_AND_RENDERABLE, expected, "row {row}");
    }
    for row in buckets.directional_caster_only {
        assert_eq!(mask(row) & VISIBLE_DIR_AND_RENDERABLE, VISIBLE_DIR_SHADOW_RENDERABLE);
    }
    for row in buckets.spot_caster_only {
        assert_eq!(mask(row), spot);
    }
    for row in buckets.invisible {
        assert_eq!(mask(row), 0);
    }
    assert_eq!(buckets.renderable.len(), 16);
    assert_eq!(buckets.directional_caster_only.len(), 9);
    assert_eq!(buckets.spot_caster_only.len(), 8);
    assert_eq!(buckets.invisible.len(), 8);
}

#[test]
fn test_partition_empty_store() {
    let mut soa = RenderableSoa::new();
    let ranges = ShadowCasterLane::new(SceneLimits::default()).partition(&mut soa);
    assert_eq!(ranges, VisibilityRanges::default());
}
