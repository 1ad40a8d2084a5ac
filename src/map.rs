use anyhow::{anyhow, bail, Context};
use std::fs;

use crate::common::Location;

#[derive(Debug, Clone)]
pub struct Cell {
    location: Location,
    obstacle: bool,
    neighbors: Vec<usize>, // Ids of the up, down, left and right cells that exist
}

impl Cell {
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }

    pub fn is_passable(&self) -> bool {
        !self.obstacle
    }

    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }
}

/// Per-cell bookkeeping written by the single-agent searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRecord {
    pub visited: bool,
    pub g_cost: usize,
    pub f_cost: usize,
    pub parent: Option<usize>,
}

impl Default for SearchRecord {
    fn default() -> Self {
        SearchRecord {
            visited: false,
            g_cost: usize::MAX,
            f_cost: usize::MAX,
            parent: None,
        }
    }
}

/// A 4-connected grid. Cell ids are row-major: `id = y * width + x`.
///
/// The search records are shared by every single-agent search run on this
/// map; call [`Map::reset`] before starting a new one.
#[derive(Debug, Clone)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    cells: Vec<Cell>,
    records: Vec<SearchRecord>,
}

impl Map {
    pub fn new(width: usize, height: usize) -> Self {
        let mut map = Map {
            height: 0,
            width: 0,
            cells: Vec::new(),
            records: Vec::new(),
        };
        map.resize(width, height);
        map
    }

    /// Rebuild the lattice; every obstacle is dropped.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| Cell {
                location: Location::new(x, y),
                obstacle: false,
                neighbors: Vec::new(),
            })
            .collect();
        self.records = vec![SearchRecord::default(); width * height];
        self.initialize_neighbors();
    }

    /// Load a map in the MovingAI octile format.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read map file {path}"))?;
        Self::from_map_str(&contents).with_context(|| format!("invalid map file {path}"))
    }

    pub fn from_map_str(contents: &str) -> anyhow::Result<Self> {
        let mut lines = contents.lines();
        let mut height = None;
        let mut width = None;

        for line in lines.by_ref() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("map") => break,
                Some("height") => height = Some(parse_dimension(parts.next(), "height")?),
                Some("width") => width = Some(parse_dimension(parts.next(), "width")?),
                _ => {}
            }
        }

        let height = height.ok_or_else(|| anyhow!("missing height"))?;
        let width = width.ok_or_else(|| anyhow!("missing width"))?;

        let mut map = Map::new(width, height);
        let mut rows = 0;
        for (y, line) in lines.take(height).enumerate() {
            let row: Vec<char> = line.trim_end().chars().collect();
            if row.len() < width {
                bail!("row {y} has {} cells, expected {width}", row.len());
            }
            for (x, ch) in row.into_iter().take(width).enumerate() {
                map.cells[y * width + x].obstacle = !matches!(ch, '.' | 'G');
            }
            rows += 1;
        }
        if rows != height {
            bail!("expected {height} rows, found {rows}");
        }

        Ok(map)
    }

    fn initialize_neighbors(&mut self) {
        let (width, height) = (self.width, self.height);
        for y in 0..height {
            for x in 0..width {
                let mut neighbors = Vec::with_capacity(4);
                if y > 0 {
                    neighbors.push((y - 1) * width + x);
                }
                if y + 1 < height {
                    neighbors.push((y + 1) * width + x);
                }
                if x > 0 {
                    neighbors.push(y * width + x - 1);
                }
                if x + 1 < width {
                    neighbors.push(y * width + x + 1);
                }
                self.cells[y * width + x].neighbors = neighbors;
            }
        }
    }

    /// Clear the bookkeeping left behind by a previous search.
    pub fn reset(&mut self) {
        self.records.fill(SearchRecord::default());
    }

    /// Manhattan distance between two cells.
    pub fn heuristic(&self, a: usize, b: usize) -> usize {
        self.cells[a].location.manhattan(&self.cells[b].location)
    }

    pub fn toggle_obstacle(&mut self, id: usize) {
        self.cells[id].obstacle = !self.cells[id].obstacle;
    }

    pub fn toggle_obstacle_at(&mut self, x: usize, y: usize) {
        let id = self.cell_id(Location::new(x, y));
        self.toggle_obstacle(id);
    }

    pub fn set_obstacle(&mut self, id: usize, obstacle: bool) {
        self.cells[id].obstacle = obstacle;
    }

    pub fn obstacles(&self) -> Vec<Location> {
        self.cells
            .iter()
            .filter(|cell| cell.obstacle)
            .map(|cell| cell.location)
            .collect()
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn num_passable_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_passable()).count()
    }

    pub fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    pub fn record(&self, id: usize) -> &SearchRecord {
        &self.records[id]
    }

    pub fn cell_id(&self, location: Location) -> usize {
        location.y * self.width + location.x
    }

    pub fn location(&self, id: usize) -> Location {
        self.cells[id].location
    }

    pub fn contains(&self, location: Location) -> bool {
        location.x < self.width && location.y < self.height
    }

    pub fn is_passable(&self, location: Location) -> bool {
        self.contains(location) && self.cells[self.cell_id(location)].is_passable()
    }

    pub fn neighbors(&self, id: usize) -> &[usize] {
        &self.cells[id].neighbors
    }

    /// Cells and search records borrowed together, so a search can read the
    /// lattice while it updates its bookkeeping.
    pub(crate) fn split_mut(&mut self) -> (&[Cell], &mut [SearchRecord]) {
        (&self.cells, &mut self.records)
    }
}

fn parse_dimension(value: Option<&str>, name: &str) -> anyhow::Result<usize> {
    value
        .ok_or_else(|| anyhow!("missing value for {name}"))?
        .parse::<usize>()
        .with_context(|| format!("invalid {name}"))
}
