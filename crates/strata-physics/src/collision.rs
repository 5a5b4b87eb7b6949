//! Discrete voxel collision queries: per-axis sweeps, supporting-surface
//! resolution, clearance and push-up checks.
//!
//! Collision is resolved axis by axis (X, Z, then Y) against the blocks
//! spanned by the entity's AABB. Directional passability is honored on both
//! entry and exit; sloped blocks obstruct only up to their sampled corner
//! height at the crossing point.

use glam::{IVec3, Vec3};
use std::ops::RangeInclusive;

use strata_terrain::{BlockProperties, Face, TerrainQuery, support_height};

/// Geometric tolerance for boundary comparisons.
pub(crate) const EPS: f32 = 1e-4;
/// Height differences at or below this count as flat ground, not a step.
pub(crate) const STEP_EPS: f32 = 1e-3;
/// Maximum upward snap while grounded (walking up sloped surfaces).
pub(crate) const SNAP_UP: f32 = 0.25;

/// Block indices overlapped by the half-open interval `[min, max)`.
pub(crate) fn block_span(min: f32, max: f32) -> RangeInclusive<i32> {
    let lo = min.floor() as i32;
    let hi = ((max - EPS).floor() as i32).max(lo);
    lo..=hi
}

/// Fractional in-block coordinate of `coord`, clamped into the block.
fn frac_in_block(coord: f32, block: i32) -> f32 {
    (coord - block as f32).clamp(0.0, 1.0)
}

fn comp(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

/// Whether a block may be entered through the given face.
pub(crate) fn entry_allowed(props: &BlockProperties, face: Face) -> bool {
    !props.solid || props.passable_from.contains(face)
}

/// Whether a block may be exited through the given face.
///
/// Blocks that declare no passability never restrict exit.
pub(crate) fn exit_allowed(props: &BlockProperties, face: Face) -> bool {
    props.passable_from.is_empty() || props.passable_from.contains(face)
}

/// Upper bound of a block's solid occupancy relative to its base.
fn occupancy_top(props: &BlockProperties) -> f32 {
    match props.corner_heights {
        Some(corners) => corners.iter().fold(0.0f32, |acc, &h| acc.max(h)),
        None => 1.0,
    }
}

/// Result of a horizontal axis sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum HorizontalHit {
    /// Movement is unobstructed.
    Free,
    /// A solid obstruction whose top may be steppable; the resolver decides
    /// whether to auto-climb or stop.
    Obstructed {
        /// The obstructing block.
        obstacle: IVec3,
        /// Highest obstructing surface height, world units.
        obstacle_top: f32,
    },
    /// A hard block (directional gate without the crossed face).
    Blocked,
}

/// Sweeps the entity's AABB along one horizontal axis (`axis` 0 = X,
/// 2 = Z) by `delta`, checking exit faces of currently occupied blocks and
/// entry faces of newly entered blocks.
pub(crate) fn sweep_horizontal(
    terrain: &dyn TerrainQuery,
    position: Vec3,
    half_width: f32,
    height: f32,
    axis: usize,
    delta: f32,
) -> HorizontalHit {
    if delta == 0.0 {
        return HorizontalHit::Free;
    }
    let positive = delta > 0.0;
    let feet = position.y;
    let body_levels = block_span(feet + EPS, feet + height);

    let a_center = comp(position, axis);
    let perp = if axis == 0 { 2 } else { 0 };
    let p_center = comp(position, perp);
    let perp_span = block_span(p_center - half_width, p_center + half_width);

    let old_span = block_span(a_center - half_width, a_center + half_width);
    let new_span = block_span(a_center - half_width + delta, a_center + half_width + delta);

    let block_at = |a: i32, y: i32, p: i32| -> IVec3 {
        if axis == 0 {
            IVec3::new(a, y, p)
        } else {
            IVec3::new(p, y, a)
        }
    };

    // Exit: leaving a directional gate is only permitted through its
    // passable faces.
    let exit_face = Face::entry_face(axis, !positive);
    for a in old_span.clone() {
        for p in perp_span.clone() {
            for y in body_levels.clone() {
                let props = terrain.block_properties(block_at(a, y, p));
                if !exit_allowed(&props, exit_face) {
                    return HorizontalHit::Blocked;
                }
            }
        }
    }

    // Entry: check the columns the leading face moves into.
    let entered: RangeInclusive<i32> = if positive {
        (*old_span.end() + 1)..=*new_span.end()
    } else {
        *new_span.start()..=(*old_span.start() - 1)
    };
    if entered.is_empty() {
        return HorizontalHit::Free;
    }

    let entry_face = Face::entry_face(axis, positive);
    let mut worst: Option<(f32, IVec3)> = None;
    for a in entered {
        for p in perp_span.clone() {
            for y in body_levels.clone() {
                let block = block_at(a, y, p);
                let props = terrain.block_properties(block);
                if entry_allowed(&props, entry_face) {
                    continue;
                }
                if !props.passable_from.is_empty() {
                    // Gate without this face: never steppable.
                    return HorizontalHit::Blocked;
                }
                // Sample the obstructing surface at the entry edge.
                let (fx, fz) = if axis == 0 {
                    (if positive { 0.0 } else { 1.0 }, frac_in_block(p_center, p))
                } else {
                    (frac_in_block(p_center, p), if positive { 0.0 } else { 1.0 })
                };
                let top = y as f32 + support_height(&props, fx, fz).unwrap_or(1.0);
                if top > feet + STEP_EPS
                    && worst.is_none_or(|(worst_top, _)| top > worst_top)
                {
                    worst = Some((top, block));
                }
            }
        }
    }

    match worst {
        Some((obstacle_top, obstacle)) => HorizontalHit::Obstructed {
            obstacle,
            obstacle_top,
        },
        None => HorizontalHit::Free,
    }
}

/// Whether an entity box with its feet at `feet` fits at the given
/// horizontal center without intersecting solid non-gate blocks.
///
/// `exclude` is ignored (the block being stepped onto).
pub(crate) fn has_clearance(
    terrain: &dyn TerrainQuery,
    center_x: f32,
    center_z: f32,
    half_width: f32,
    feet: f32,
    height: f32,
    exclude: IVec3,
) -> bool {
    for x in block_span(center_x - half_width, center_x + half_width) {
        for z in block_span(center_z - half_width, center_z + half_width) {
            for y in block_span(feet + EPS, feet + height) {
                let block = IVec3::new(x, y, z);
                if block == exclude {
                    continue;
                }
                let props = terrain.block_properties(block);
                if props.solid
                    && props.passable_from.is_empty()
                    && y as f32 + occupancy_top(&props) > feet + EPS
                {
                    return false;
                }
            }
        }
    }
    true
}

/// Result of a vertical resolution step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct VerticalHit {
    /// Resolved feet height.
    pub new_feet: f32,
    /// The supporting block, when the entity came to rest on one.
    pub supported_by: Option<IVec3>,
    /// Whether upward movement was stopped by a ceiling.
    pub hit_ceiling: bool,
}

/// Moves the entity's feet from `position.y` toward `target_feet`,
/// stopping on supporting surfaces (descending) or ceilings (ascending).
///
/// While grounded the feet may snap upward by up to [`SNAP_UP`] to follow
/// rising sloped surfaces; airborne entities only land on surfaces crossed
/// during this step.
pub(crate) fn resolve_vertical(
    terrain: &dyn TerrainQuery,
    position: Vec3,
    half_width: f32,
    height: f32,
    target_feet: f32,
    grounded: bool,
) -> VerticalHit {
    let feet = position.y;

    if target_feet <= feet {
        let snap_limit = if grounded { feet + SNAP_UP } else { feet + EPS };
        // Grounded entities also stick to surfaces that drop away underfoot
        // by up to the snap distance (walking down sloped surfaces).
        let floor_limit = if grounded {
            target_feet - SNAP_UP
        } else {
            target_feet
        };
        let mut best: Option<(f32, IVec3)> = None;

        let y_lo = (floor_limit - 1.0).floor() as i32;
        let y_hi = snap_limit.floor() as i32;
        for x in block_span(position.x - half_width, position.x + half_width) {
            for z in block_span(position.z - half_width, position.z + half_width) {
                let fx = frac_in_block(position.x, x);
                let fz = frac_in_block(position.z, z);
                for y in y_lo..=y_hi {
                    let block = IVec3::new(x, y, z);
                    let props = terrain.block_properties(block);
                    // A block passable from above lets the entity fall through.
                    if !props.passable_from.is_empty() && props.passable_from.contains(Face::PosY) {
                        continue;
                    }
                    let Some(h) = support_height(&props, fx, fz) else {
                        continue;
                    };
                    let top = y as f32 + h;
                    if top >= floor_limit - EPS
                        && top <= snap_limit + EPS
                        && best.is_none_or(|(best_top, _)| top > best_top)
                    {
                        best = Some((top, block));
                    }
                }
            }
        }

        match best {
            Some((top, block)) => VerticalHit {
                new_feet: top,
                supported_by: Some(block),
                hit_ceiling: false,
            },
            None => VerticalHit {
                new_feet: target_feet,
                supported_by: None,
                hit_ceiling: false,
            },
        }
    } else {
        let head_old = feet + height;
        let head_new = target_feet + height;
        let y_lo = (head_old - EPS).floor() as i32 + 1;
        let y_hi = (head_new - EPS).floor() as i32;
        let mut ceiling: Option<i32> = None;

        for x in block_span(position.x - half_width, position.x + half_width) {
            for z in block_span(position.z - half_width, position.z + half_width) {
                for y in y_lo..=y_hi {
                    let props = terrain.block_properties(IVec3::new(x, y, z));
                    if !entry_allowed(&props, Face::NegY)
                        && ceiling.is_none_or(|base| y < base)
                    {
                        ceiling = Some(y);
                    }
                }
            }
        }

        match ceiling {
            Some(base) => VerticalHit {
                new_feet: base as f32 - height,
                supported_by: None,
                hit_ceiling: true,
            },
            None => VerticalHit {
                new_feet: target_feet,
                supported_by: None,
                hit_ceiling: false,
            },
        }
    }
}

/// Minimum upward correction needed to clear solid blocks intersecting the
/// entity's body, if any.
///
/// Blocks declaring directional passability are exempt: the entity is being
/// let through intentionally.
pub(crate) fn push_up_feet(
    terrain: &dyn TerrainQuery,
    position: Vec3,
    half_width: f32,
    height: f32,
) -> Option<f32> {
    let feet = position.y;
    let mut best: Option<f32> = None;
    for x in block_span(position.x - half_width, position.x + half_width) {
        for z in block_span(position.z - half_width, position.z + half_width) {
            let fx = frac_in_block(position.x, x);
            let fz = frac_in_block(position.z, z);
            for y in block_span(feet + EPS, feet + height) {
                let props = terrain.block_properties(IVec3::new(x, y, z));
                if !props.solid || !props.passable_from.is_empty() {
                    continue;
                }
                let top = y as f32 + support_height(&props, fx, fz).unwrap_or(1.0);
                if top > feet + EPS && best.is_none_or(|b| top > b) {
                    best = Some(top);
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_terrain::{BlockDef, BlockRegistry, BlockTypeId, ChunkStore, PassableFaces};

    fn registry() -> (BlockRegistry, BlockTypeId, BlockTypeId) {
        let mut reg = BlockRegistry::new();
        let stone = reg
            .register(BlockDef {
                name: "stone".to_string(),
                properties: BlockProperties::solid(),
            })
            .unwrap();
        let gate = reg
            .register(BlockDef {
                name: "gate_west".to_string(),
                properties: BlockProperties {
                    solid: true,
                    passable_from: PassableFaces::from_faces(&[Face::NegX]),
                    ..BlockProperties::AIR
                },
            })
            .unwrap();
        (reg, stone, gate)
    }

    fn flat_floor() -> (ChunkStore, BlockTypeId, BlockTypeId) {
        let (reg, stone, gate) = registry();
        let mut store = ChunkStore::new(reg, 16);
        store.set_all_loaded(true);
        store.fill(IVec3::new(-8, 0, -8), IVec3::new(8, 0, 8), stone);
        (store, stone, gate)
    }

    const HW: f32 = 0.3;
    const H: f32 = 1.8;

    #[test]
    fn test_block_span_boundaries() {
        assert_eq!(block_span(0.2, 0.8), 0..=0);
        assert_eq!(block_span(0.5, 1.5), 0..=1);
        // An AABB ending exactly on a block boundary does not enter it.
        assert_eq!(block_span(0.0, 1.0), 0..=0);
        assert_eq!(block_span(-0.5, 0.5), -1..=0);
    }

    #[test]
    fn test_sweep_free_over_open_floor() {
        let (store, _, _) = flat_floor();
        let pos = Vec3::new(0.5, 1.0, 0.5);
        let hit = sweep_horizontal(&store, pos, HW, H, 0, 0.4);
        assert_eq!(hit, HorizontalHit::Free);
    }

    #[test]
    fn test_sweep_reports_wall_obstruction() {
        let (mut store, stone, _) = flat_floor();
        // Wall two blocks tall at x=2.
        store.fill(IVec3::new(2, 1, -8), IVec3::new(2, 2, 8), stone);

        let pos = Vec3::new(1.5, 1.0, 0.5);
        // Moving +X far enough to enter x=2.
        let hit = sweep_horizontal(&store, pos, HW, H, 0, 0.5);
        match hit {
            HorizontalHit::Obstructed { obstacle_top, .. } => {
                assert!((obstacle_top - 3.0).abs() < 1e-5, "got {obstacle_top}");
            }
            other => panic!("expected obstruction, got {other:?}"),
        }
    }

    #[test]
    fn test_sweep_ignores_surface_at_feet_level() {
        let (mut store, stone, _) = flat_floor();
        // A second floor layer ahead whose top equals the entity's feet.
        store.fill(IVec3::new(2, 0, -8), IVec3::new(3, 0, 8), stone);
        let pos = Vec3::new(1.5, 1.0, 0.5);
        let hit = sweep_horizontal(&store, pos, HW, H, 0, 0.5);
        assert_eq!(hit, HorizontalHit::Free);
    }

    #[test]
    fn test_one_way_gate_entry_and_exit() {
        let (reg, _, gate) = registry();
        let mut store = ChunkStore::new(reg, 16);
        store.set_all_loaded(true);
        // Gate column at x=2, passable only from -X.
        store.fill(IVec3::new(2, 1, 0), IVec3::new(2, 3, 0), gate);

        // Approaching from the west, moving +X: enters through NegX. Allowed.
        let west = Vec3::new(1.5, 1.0, 0.5);
        assert_eq!(
            sweep_horizontal(&store, west, HW, H, 0, 0.5),
            HorizontalHit::Free
        );

        // Approaching from the east, moving -X: enters through PosX. Blocked.
        let east = Vec3::new(3.5, 1.0, 0.5);
        assert_eq!(
            sweep_horizontal(&store, east, HW, H, 0, -0.5),
            HorizontalHit::Blocked
        );

        // Standing inside the gate: exit back through NegX is allowed,
        // exit through PosX is not.
        let inside = Vec3::new(2.5, 1.0, 0.5);
        assert_eq!(
            sweep_horizontal(&store, inside, HW, H, 0, -0.5),
            HorizontalHit::Free
        );
        assert_eq!(
            sweep_horizontal(&store, inside, HW, H, 0, 0.5),
            HorizontalHit::Blocked
        );
    }

    #[test]
    fn test_vertical_landing_on_floor() {
        let (store, _, _) = flat_floor();
        let pos = Vec3::new(0.5, 1.4, 0.5);
        let hit = resolve_vertical(&store, pos, HW, H, 0.6, false);
        assert_eq!(hit.new_feet, 1.0);
        assert!(hit.supported_by.is_some());
        assert!(!hit.hit_ceiling);
    }

    #[test]
    fn test_vertical_free_fall_without_support() {
        let (reg, _, _) = registry();
        let mut store = ChunkStore::new(reg, 16);
        store.set_all_loaded(true);
        let pos = Vec3::new(0.5, 10.0, 0.5);
        let hit = resolve_vertical(&store, pos, HW, H, 9.5, false);
        assert_eq!(hit.new_feet, 9.5);
        assert!(hit.supported_by.is_none());
    }

    #[test]
    fn test_vertical_ceiling_stops_ascent() {
        let (mut store, stone, _) = flat_floor();
        // Ceiling at y=3 (entity height 1.8, standing at feet=1.0).
        store.fill(IVec3::new(-2, 3, -2), IVec3::new(2, 3, 2), stone);
        let pos = Vec3::new(0.5, 1.0, 0.5);
        let hit = resolve_vertical(&store, pos, HW, H, 1.5, false);
        assert!(hit.hit_ceiling);
        assert!((hit.new_feet - (3.0 - H)).abs() < 1e-5, "got {}", hit.new_feet);
    }

    #[test]
    fn test_grounded_snaps_up_sloped_surface() {
        let (reg, _, _) = registry();
        let mut reg = reg;
        let ramp = reg
            .register(BlockDef {
                name: "ramp".to_string(),
                properties: BlockProperties::sloped([0.0, 1.0, 0.0, 1.0], 1.0),
            })
            .unwrap();
        let mut store = ChunkStore::new(reg, 16);
        store.set_all_loaded(true);
        store.set_block(IVec3::new(0, 1, 0), ramp);

        // Standing mid-ramp: support resolves to the ramp surface even
        // though it sits above the descent target.
        let pos = Vec3::new(0.7, 1.7, 0.5);
        let hit = resolve_vertical(&store, pos, HW, H, 1.7, true);
        assert!(hit.supported_by.is_some());
        assert!(
            hit.new_feet > 1.69 && hit.new_feet <= 1.0 + 1.0 + EPS,
            "got {}",
            hit.new_feet
        );
    }

    #[test]
    fn test_fall_through_block_passable_from_above() {
        let (reg, _, _) = registry();
        let mut reg = reg;
        let trapdoor = reg
            .register(BlockDef {
                name: "trapdoor".to_string(),
                properties: BlockProperties {
                    solid: true,
                    passable_from: PassableFaces::from_faces(&[Face::PosY]),
                    ..BlockProperties::AIR
                },
            })
            .unwrap();
        let mut store = ChunkStore::new(reg, 16);
        store.set_all_loaded(true);
        store.set_block(IVec3::new(0, 5, 0), trapdoor);

        let pos = Vec3::new(0.5, 6.5, 0.5);
        let hit = resolve_vertical(&store, pos, HW, H, 5.2, false);
        assert!(
            hit.supported_by.is_none(),
            "trapdoor must not support a falling entity"
        );
    }

    #[test]
    fn test_push_up_clears_intersecting_block() {
        let (mut store, stone, gate) = flat_floor();
        store.set_block(IVec3::new(0, 1, 0), stone);

        // Body intersecting the block at y=1.
        let pos = Vec3::new(0.5, 1.3, 0.5);
        let feet = push_up_feet(&store, pos, HW, H);
        assert_eq!(feet, Some(2.0));

        // A gate block suppresses auto-push-up.
        store.set_block(IVec3::new(0, 1, 0), gate);
        assert_eq!(push_up_feet(&store, pos, HW, H), None);
    }

    #[test]
    fn test_clearance_above_step() {
        let (mut store, stone, _) = flat_floor();
        store.set_block(IVec3::new(2, 1, 0), stone);

        // Clear above the step block.
        assert!(has_clearance(&store, 2.5, 0.5, HW, 2.0, H, IVec3::new(2, 1, 0)));

        // Low ceiling above the step removes the clearance.
        store.set_block(IVec3::new(2, 3, 0), stone);
        assert!(!has_clearance(&store, 2.5, 0.5, HW, 2.0, H, IVec3::new(2, 1, 0)));
    }
}
