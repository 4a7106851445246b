// Arena authoring: border walls, predefined interior walls, random blocks

use log::info;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::common::{Cell, CellState, EdgeSide, OccupancyGrid};

/// Which obstacles to author onto a fresh field.
///
/// Every layout starts with the four border walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleLayout {
    /// Border walls only
    Border,
    /// Border plus four fixed interior walls
    Predefined,
    /// Border plus `count` square blocks at random positions
    Random { count: usize },
}

impl ObstacleLayout {
    /// Random layout with the default block count for an `n x n` grid
    pub fn random_for_grid(n: usize) -> Self {
        ObstacleLayout::Random {
            count: (0.02 * n as f64) as usize,
        }
    }

    /// Author the layout onto `map` with walls `width` cells thick
    pub fn apply<M, R>(&self, map: &mut M, width: i32, rng: &mut R)
    where
        M: OccupancyGrid,
        R: Rng + ?Sized,
    {
        draw_border(map, width);
        match *self {
            ObstacleLayout::Border => {}
            ObstacleLayout::Predefined => draw_predefined_walls(map, width),
            ObstacleLayout::Random { count } => scatter_blocks(map, count, width, rng),
        }
        info!("obstacle layout {:?} applied on a {}x{} grid", self, map.size(), map.size());
    }
}

impl Default for ObstacleLayout {
    fn default() -> Self {
        ObstacleLayout::Predefined
    }
}

/// Four walls along the grid edges, each thickened inwards
pub fn draw_border<M: OccupancyGrid>(map: &mut M, width: i32) {
    let n = map.size() as i32;
    let last = n - 1;
    map.set_obstacle_stream(Cell::new(0, 0), Cell::new(last, 0), width, EdgeSide::Bottom);
    map.set_obstacle_stream(Cell::new(last, 0), Cell::new(last, last), width, EdgeSide::Right);
    map.set_obstacle_stream(Cell::new(0, last), Cell::new(last, last), width, EdgeSide::Top);
    map.set_obstacle_stream(Cell::new(0, 0), Cell::new(0, last), width, EdgeSide::Left);
}

/// Interior walls splitting the arena into a maze of three corridors
pub fn draw_predefined_walls<M: OccupancyGrid>(map: &mut M, width: i32) {
    let n = map.size() as i32;
    let nf = n as f64;
    let third = n / 3;
    let two_thirds = (nf / 1.5) as i32;
    let shelf = (0.8 * nf) as i32;

    map.set_obstacle_stream(Cell::new(third, 0), Cell::new(third, third), width, EdgeSide::Left);
    map.set_obstacle_stream(Cell::new(third, n / 2), Cell::new(third, n - 1), width, EdgeSide::Left);
    map.set_obstacle_stream(
        Cell::new(two_thirds, 0),
        Cell::new(two_thirds, two_thirds),
        width,
        EdgeSide::Left,
    );
    map.set_obstacle_stream(
        Cell::new(two_thirds, shelf),
        Cell::new(n - 1, shelf),
        width,
        EdgeSide::Bottom,
    );
}

/// Square obstacle blocks of half-width `width` with centers drawn
/// uniformly inside the border. Blocks only cover free cells.
pub fn scatter_blocks<M, R>(map: &mut M, count: usize, width: i32, rng: &mut R)
where
    M: OccupancyGrid,
    R: Rng + ?Sized,
{
    let n = map.size() as i32;
    let margin = width.max(0);
    if n - 1 - margin <= margin {
        return;
    }
    let range = Uniform::new_inclusive(margin, n - 1 - margin);
    for _ in 0..count {
        let center = Cell::new(range.sample(rng), range.sample(rng));
        map.set_block(center, CellState::Obstacle, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::OccupancyField;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_border_is_closed() {
        let mut field = OccupancyField::new(20).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        ObstacleLayout::Border.apply(&mut field, 2, &mut rng);

        for k in 0..20 {
            for cell in [Cell::new(k, 0), Cell::new(k, 19), Cell::new(0, k), Cell::new(19, k)] {
                assert!(field.is_obstacle(cell), "{} should be a wall", cell);
            }
        }
        // thickened inwards by one more row
        assert!(field.is_obstacle(Cell::new(10, 1)));
        assert!(field.is_obstacle(Cell::new(18, 10)));
        assert!(field.is_free(Cell::new(10, 10)));
        assert!(field.is_free(Cell::new(2, 2)));
    }

    #[test]
    fn test_predefined_walls() {
        let mut field = OccupancyField::new(30).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        ObstacleLayout::Predefined.apply(&mut field, 1, &mut rng);

        // wall at N/3 with a gap between N/3 and N/2
        assert!(field.is_obstacle(Cell::new(10, 5)));
        assert!(field.is_free(Cell::new(10, 12)));
        assert!(field.is_obstacle(Cell::new(10, 20)));
        // wall at N/1.5 up to N/1.5
        assert!(field.is_obstacle(Cell::new(20, 15)));
        assert!(field.is_free(Cell::new(20, 22)));
        // shelf at 0.8 N from N/1.5 to the right border
        assert!(field.is_obstacle(Cell::new(25, 24)));
        assert!(field.is_free(Cell::new(15, 24)));
    }

    #[test]
    fn test_random_blocks_are_reproducible() {
        let layout = ObstacleLayout::Random { count: 4 };
        let mut a = OccupancyField::new(40).unwrap();
        let mut b = OccupancyField::new(40).unwrap();
        layout.apply(&mut a, 1, &mut StdRng::seed_from_u64(5));
        layout.apply(&mut b, 1, &mut StdRng::seed_from_u64(5));

        assert_eq!(a.cells_with(CellState::Obstacle), b.cells_with(CellState::Obstacle));
        let mut border = OccupancyField::new(40).unwrap();
        draw_border(&mut border, 1);
        assert!(a.count(CellState::Obstacle) > border.count(CellState::Obstacle));
    }

    #[test]
    fn test_random_count_scales_with_grid() {
        assert_eq!(ObstacleLayout::random_for_grid(800), ObstacleLayout::Random { count: 16 });
        assert_eq!(ObstacleLayout::default(), ObstacleLayout::Predefined);
    }
}
