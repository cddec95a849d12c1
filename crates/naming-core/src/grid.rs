//! Spatial Grid
//!
//! A toroidal lattice with a per-cell occupancy bound. The grid is the only
//! owner of cell membership; agents keep a copy of their coordinates in the
//! [`Position`] component for observation.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::collections::HashMap;

use crate::components::Position;
use crate::error::GridError;

/// Lower bound on random placement attempts before giving up
pub const MIN_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Resource: toroidal grid with bounded occupancy
#[derive(Resource, Debug, Clone)]
pub struct SpatialGrid {
    width: u32,
    height: u32,
    capacity: usize,
    cells: Vec<Vec<Entity>>,
    locations: HashMap<Entity, Position>,
}

impl SpatialGrid {
    /// Create an empty grid; `width`, `height` and `capacity` must be non-zero.
    pub fn new(width: u32, height: u32, capacity: usize) -> Self {
        let cell_count = width as usize * height as usize;
        Self {
            width,
            height,
            capacity,
            cells: vec![Vec::new(); cell_count],
            locations: HashMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Maximum number of agents per cell
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn agent_count(&self) -> usize {
        self.locations.len()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Wrap signed coordinates onto the torus
    pub fn wrap(&self, x: i64, y: i64) -> Position {
        Position {
            x: x.rem_euclid(self.width as i64) as u32,
            y: y.rem_euclid(self.height as i64) as u32,
        }
    }

    fn index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    fn check_bounds(&self, pos: Position) -> Result<(), GridError> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                position: pos,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Moore neighborhood of `pos` with toroidal wraparound.
    ///
    /// Yields 8 cells on grids at least 3 wide and 3 high. On narrower grids
    /// wrapped duplicates are collapsed, and the centre is only reported when
    /// `include_center` is set.
    pub fn neighborhood(&self, pos: Position, include_center: bool) -> Vec<Position> {
        let mut cells = Vec::with_capacity(9);
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                let cell = self.wrap(pos.x as i64 + dx, pos.y as i64 + dy);
                if cell == pos && !include_center {
                    continue;
                }
                if !cells.contains(&cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Agents in a cell, in arrival order
    pub fn cell_contents(&self, pos: Position) -> &[Entity] {
        if !self.in_bounds(pos) {
            return &[];
        }
        &self.cells[self.index(pos)]
    }

    pub fn occupancy(&self, pos: Position) -> usize {
        self.cell_contents(pos).len()
    }

    /// True when one more agent fits into the cell
    pub fn has_room(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.occupancy(pos) < self.capacity
    }

    /// Agents in the Moore neighborhood of `pos`, excluding the centre cell
    pub fn neighbors(&self, pos: Position) -> Vec<Entity> {
        self.neighborhood(pos, false)
            .into_iter()
            .flat_map(|cell| self.cell_contents(cell).iter().copied())
            .collect()
    }

    pub fn locate(&self, entity: Entity) -> Option<Position> {
        self.locations.get(&entity).copied()
    }

    /// Put a not-yet-placed agent into a cell
    pub fn place_agent(&mut self, entity: Entity, pos: Position) -> Result<(), GridError> {
        self.check_bounds(pos)?;
        if self.locations.contains_key(&entity) {
            return Err(GridError::AlreadyPlaced);
        }
        if !self.has_room(pos) {
            return Err(GridError::CellFull {
                position: pos,
                capacity: self.capacity,
            });
        }
        let index = self.index(pos);
        self.cells[index].push(entity);
        self.locations.insert(entity, pos);
        Ok(())
    }

    /// Relocate a placed agent; moving onto its own cell is a no-op
    pub fn move_agent(&mut self, entity: Entity, pos: Position) -> Result<(), GridError> {
        self.check_bounds(pos)?;
        let current = self.locate(entity).ok_or(GridError::NotPlaced)?;
        if current == pos {
            return Ok(());
        }
        if !self.has_room(pos) {
            return Err(GridError::CellFull {
                position: pos,
                capacity: self.capacity,
            });
        }

        let from = self.index(current);
        self.cells[from].retain(|e| *e != entity);
        let to = self.index(pos);
        self.cells[to].push(entity);
        self.locations.insert(entity, pos);
        Ok(())
    }

    /// Place an agent on a uniformly sampled cell with room left.
    ///
    /// Gives up with [`GridError::PlacementExhausted`] after
    /// `max(MIN_PLACEMENT_ATTEMPTS, 100 * cells)` draws.
    pub fn random_placement<R: Rng + ?Sized>(
        &mut self,
        entity: Entity,
        rng: &mut R,
    ) -> Result<Position, GridError> {
        if self.locations.contains_key(&entity) {
            return Err(GridError::AlreadyPlaced);
        }
        let attempts = MIN_PLACEMENT_ATTEMPTS.max(self.cells.len().saturating_mul(100));
        for _ in 0..attempts {
            let pos = Position {
                x: rng.gen_range(0..self.width),
                y: rng.gen_range(0..self.height),
            };
            if self.has_room(pos) {
                self.place_agent(entity, pos)?;
                return Ok(pos);
            }
        }
        Err(GridError::PlacementExhausted { attempts })
    }

    /// Largest number of agents sharing any one cell
    pub fn max_occupancy(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }
}
