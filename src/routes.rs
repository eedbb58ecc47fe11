//! # Route Table
//!
//! The fixed training scenarios served to the front end. Each route names a
//! grid size, an obstacle layout and a model directory; a request trains the
//! persisted agent for that route for a few more episodes and answers with the
//! last episode's trajectory.
//!
//! Failures are answered with a structured JSON body instead of escaping as
//! an unhandled error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::environment::{Cell, Obstacle};
use crate::error::{GridPathError, Result};
use crate::trainer::run_training;

/// Episodes trained per request
pub const EPISODES_PER_REQUEST: usize = 10;

pub const MODEL_FILE: &str = "model.bin";
pub const EPSILON_FILE: &str = "epsilon.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    TensorflowSimple,
    TensorflowSimpleObstacles,
    TensorflowMediumObstacles,
}

impl Route {
    pub const ALL: [Route; 3] = [
        Route::TensorflowSimple,
        Route::TensorflowSimpleObstacles,
        Route::TensorflowMediumObstacles,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Route::TensorflowSimple => "tensorflow_simple",
            Route::TensorflowSimpleObstacles => "tensorflow_simple_obstacles",
            Route::TensorflowMediumObstacles => "tensorflow_medium_obstacles",
        }
    }

    /// Resolve a request path such as `/api/tensorflow_simple`
    pub fn from_path(path: &str) -> Option<Route> {
        let name = path.trim_end_matches('/').rsplit('/').next()?;
        Route::ALL.iter().copied().find(|route| route.name() == name)
    }

    pub fn grid_size(&self) -> usize {
        match self {
            Route::TensorflowSimple | Route::TensorflowSimpleObstacles => 5,
            Route::TensorflowMediumObstacles => 8,
        }
    }

    /// Obstacle layout. Layouts are shared with the front end and may list
    /// cells beyond the grid.
    pub fn obstacles(&self) -> Vec<Obstacle> {
        let cells: &[(i64, i64)] = match self {
            Route::TensorflowSimple => &[],
            Route::TensorflowSimpleObstacles => &[
                (3, 0), (4, 0), (5, 0), (6, 0), (5, 2), (5, 3),
                (5, 4), (5, 5), (5, 7), (2, 3), (3, 2),
            ],
            Route::TensorflowMediumObstacles => &[
                (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (5, 4),
                (5, 5), (5, 6), (5, 7), (0, 4), (0, 6), (1, 6),
            ],
        };
        cells.iter().map(|&(row, col)| Cell::new(row, col)).collect()
    }

    /// Directory holding this route's persisted agent, relative to `base_dir`
    pub fn model_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join("models").join(self.name())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Route {
    type Err = GridPathError;

    fn from_str(s: &str) -> Result<Self> {
        Route::from_path(s).ok_or_else(|| {
            GridPathError::invalid_parameter("route".to_string(), format!("unknown route '{}'", s))
        })
    }
}

/// Status code and JSON body answered for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    kind: &'a str,
}

impl Response {
    fn error(status: u16, kind: &str, message: String) -> Self {
        let body = serde_json::to_string(&ErrorBody { error: message, kind })
            .unwrap_or_else(|_| format!(r#"{{"error":"internal","kind":"{}"}}"#, kind));
        Response { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Train the agent behind `route` and return its latest trajectory.
pub fn serve(route: Route, base_dir: &Path) -> Result<String> {
    let dir = route.model_dir(base_dir);
    let record = run_training(
        route.grid_size(),
        route.obstacles(),
        EPISODES_PER_REQUEST,
        &dir.join(MODEL_FILE),
        &dir.join(EPSILON_FILE),
    )?;
    record.to_json()
}

/// Answer a request for `path`: 200 with the trajectory, 404 for an unknown
/// route, 500 with the error kind for a failed run.
pub fn respond(path: &str, base_dir: &Path) -> Response {
    let Some(route) = Route::from_path(path) else {
        return Response::error(404, "not_found", format!("unknown route '{}'", path));
    };

    match serve(route, base_dir) {
        Ok(body) => Response { status: 200, body },
        Err(e) => {
            tracing::error!(route = route.name(), error = %e, "training request failed");
            Response::error(500, e.kind(), e.to_string())
        }
    }
}
