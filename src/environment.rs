//! # Grid Environment
//!
//! A square grid the agent crosses from the top-left corner `(0, 0)` to the
//! goal in the opposite corner `(grid_size - 1, grid_size - 1)`.
//!
//! Positions use `x` for the horizontal axis (left/right) and `y` for the
//! vertical axis (up/down, growing downward). Obstacles and recorded paths
//! are expressed as [`Cell`]s whose `row` is the `x` coordinate and whose
//! `col` is the `y` coordinate; that mapping is applied only by the
//! conversions in this module.
//!
//! Every step costs a small living cost proportional to the Manhattan
//! distance left to the goal; stepping onto an obstacle doubles it. Obstacles
//! never end an episode, only the goal does.

use ndarray::{array, Array1};
use serde::{Deserialize, Serialize};

use crate::error::{GridPathError, Result};

/// The agent's location on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

/// The state handed to the agent: the ordered pair `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct State {
    pub x: i64,
    pub y: i64,
}

impl State {
    pub fn new(x: i64, y: i64) -> Self {
        State { x, y }
    }

    /// Network input for this state
    pub fn features(&self) -> Array1<f32> {
        array![self.x as f32, self.y as f32]
    }
}

impl From<Position> for State {
    fn from(position: Position) -> Self {
        State::new(position.x as i64, position.y as i64)
    }
}

/// A grid cell as exchanged with callers, e.g. obstacles and recorded paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i64,
    pub col: i64,
}

impl Cell {
    pub fn new(row: i64, col: i64) -> Self {
        Cell { row, col }
    }
}

impl From<State> for Cell {
    fn from(state: State) -> Self {
        Cell::new(state.x, state.y)
    }
}

/// Obstacles use the same `(row, col)` convention as recorded paths
pub type Obstacle = Cell;

/// One of the four moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Every action, ordered by index
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }
}

/// Outcome of a single [`GridEnvironment::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub state: State,
    pub reward: f32,
    pub done: bool,
}

/// Reward for reaching the goal
pub const GOAL_REWARD: f32 = 1.0;

/// Multiplier applied to the living cost on obstacle cells
pub const OBSTACLE_PENALTY_FACTOR: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct GridEnvironment {
    grid_size: usize,
    obstacles: Vec<Obstacle>,
    position: Position,
}

impl GridEnvironment {
    /// Create a `grid_size` x `grid_size` environment with the agent at `(0, 0)`.
    ///
    /// Obstacles outside the grid are kept but can never be stepped on.
    pub fn new(grid_size: usize, obstacles: Vec<Obstacle>) -> Result<Self> {
        if grid_size < 2 {
            return Err(GridPathError::invalid_parameter(
                "grid_size".to_string(),
                format!("must be at least 2, got {}", grid_size),
            ));
        }

        let outside = obstacles
            .iter()
            .filter(|o| !Self::in_bounds(grid_size, o.row, o.col))
            .count();
        if outside > 0 {
            tracing::warn!(grid_size, outside, "obstacles outside the grid will never be reached");
        }

        Ok(GridEnvironment {
            grid_size,
            obstacles,
            position: Position::default(),
        })
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn goal(&self) -> Position {
        Position::new(self.grid_size - 1, self.grid_size - 1)
    }

    /// Move the agent back to the top-left corner and return its state.
    pub fn reset(&mut self) -> State {
        self.position = Position::default();
        self.state()
    }

    pub fn state(&self) -> State {
        self.position.into()
    }

    /// Whether `state` lies on the grid
    pub fn contains(&self, state: &State) -> bool {
        Self::in_bounds(self.grid_size, state.x, state.y)
    }

    fn in_bounds(grid_size: usize, x: i64, y: i64) -> bool {
        let size = grid_size as i64;
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    /// Apply `action`. A move that would leave the grid keeps the agent in place.
    pub fn step(&mut self, action: Action) -> StepResult {
        let last = self.grid_size - 1;
        let Position { x, y } = self.position;

        self.position = match action {
            Action::Up if y > 0 => Position::new(x, y - 1),
            Action::Down if y < last => Position::new(x, y + 1),
            Action::Left if x > 0 => Position::new(x - 1, y),
            Action::Right if x < last => Position::new(x + 1, y),
            _ => self.position,
        };

        let done = self.position == self.goal();
        let reward = if done {
            GOAL_REWARD
        } else if self.is_obstacle(self.position) {
            self.obstacle_cost()
        } else {
            self.living_cost()
        };

        StepResult {
            state: self.state(),
            reward,
            done,
        }
    }

    pub fn is_obstacle(&self, position: Position) -> bool {
        let cell = Cell::from(State::from(position));
        self.obstacles.contains(&cell)
    }

    /// Distance-shaped cost of standing at the current position:
    /// `-(2 * (grid_size - 1) - x - y) / 100`.
    pub fn living_cost(&self) -> f32 {
        Self::living_cost_at(self.grid_size, self.position)
    }

    /// Cost of standing on an obstacle at the current position.
    pub fn obstacle_cost(&self) -> f32 {
        self.living_cost() * OBSTACLE_PENALTY_FACTOR
    }

    pub fn living_cost_at(grid_size: usize, position: Position) -> f32 {
        let max_distance = 2 * (grid_size as i64 - 1);
        let remaining = max_distance - position.x as i64 - position.y as i64;
        -(remaining as f32) / 100.0
    }
}
