// End-to-end planning scenarios on small grids

use grid_rrt::common::{Cell, CellState, OccupancyGrid};
use grid_rrt::path_planning::{TreeMode, TreeStore};
use grid_rrt::utils::{rasterize_segment, steer};
use grid_rrt::{
    ObstacleLayout, PlannerConfig, PlannerState, SessionPhase, SessionSignals, Simulation, Strategy,
    TickOutcome,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn small_config(strategy: Strategy, seed: u64) -> PlannerConfig {
    PlannerConfig {
        grid_size: 20,
        step: 3.0,
        neighborhood: 6.0,
        end_cell_width: 1,
        border_width: 1,
        max_sample_attempts: 10_000,
        seed: Some(seed),
        strategy,
    }
}

fn select_endpoints(sim: &mut Simulation, start: Cell, end: Cell) {
    let script = [
        SessionSignals::click(start),
        SessionSignals::confirm_start(),
        SessionSignals::click(end),
        SessionSignals::confirm_end(),
    ];
    for signals in &script {
        let outcome = sim.tick(signals).unwrap();
        assert!(!matches!(outcome, TickOutcome::Rejected(_)), "{:?} rejected", signals);
    }
}

fn assert_tree_consistent(sim: &Simulation) {
    let tree = sim.tree();
    let parentless: Vec<Cell> = tree.nodes().filter(|n| n.parent.is_none()).map(|n| n.cell).collect();
    assert_eq!(parentless, vec![tree.root().unwrap()]);

    for (parent, child) in tree.edges() {
        for cell in sim.field().segment(parent, child) {
            assert!(!sim.field().is_obstacle(cell) || cell == parent, "edge {} -> {} crosses {}", parent, child, cell);
            assert!(!sim.field().is_free(cell), "edge {} -> {} lost its overlay at {}", parent, child, cell);
        }
        assert_eq!(sim.field().state(child).map(|s| s.is_marked()), Some(true));
    }
    if tree.mode() == TreeMode::RrtStar {
        for node in tree.nodes() {
            let walked = tree.distance_to_root(node.cell).unwrap();
            let cached = node.distance_to_root().unwrap();
            assert!((walked - cached).abs() < 1e-9, "stale cost at {}", node.cell);
        }
    }
}

#[test]
fn test_corner_to_corner_path() {
    init_logging();
    for strategy in [Strategy::Rrt, Strategy::RrtStar] {
        for seed in [1, 2, 3] {
            let mut sim = Simulation::new(small_config(strategy, seed), ObstacleLayout::Border).unwrap();
            select_endpoints(&mut sim, Cell::new(1, 1), Cell::new(18, 18));

            let path = sim
                .run_until_path(50_000)
                .unwrap()
                .unwrap_or_else(|| panic!("{:?} seed {} found no path", strategy, seed));

            // goal detection looks at the 8-neighborhood of a 3x3 end block
            let first = path[0];
            assert!(first.chebyshev(&Cell::new(18, 18)) <= 2, "path starts at {}", first);
            assert_eq!(path.last(), Some(&Cell::new(1, 1)));
            assert_eq!(sim.planner().state(), PlannerState::PathFound);
            assert_eq!(sim.session().phase(), SessionPhase::SelectingEnd);
            for pair in path.windows(2) {
                assert_eq!(sim.tree().parent_of(pair[0]), Some(pair[1]));
            }
            assert_tree_consistent(&sim);
        }
    }
}

#[test]
fn test_same_seed_same_tree() {
    let run = |seed| {
        let mut sim = Simulation::new(small_config(Strategy::RrtStar, seed), ObstacleLayout::Border).unwrap();
        select_endpoints(&mut sim, Cell::new(1, 1), Cell::new(18, 18));
        let path = sim.run_until_path(50_000).unwrap();
        let edges: Vec<(Cell, Cell)> = sim.tree().edges().collect();
        (path, edges)
    };
    assert_eq!(run(9), run(9));
}

#[test]
fn test_path_through_predefined_walls() {
    init_logging();
    let config = PlannerConfig {
        grid_size: 60,
        step: 3.0,
        neighborhood: 8.0,
        end_cell_width: 1,
        border_width: 1,
        max_sample_attempts: 10_000,
        seed: Some(17),
        strategy: Strategy::RrtStar,
    };
    let mut sim = Simulation::new(config, ObstacleLayout::Predefined).unwrap();
    select_endpoints(&mut sim, Cell::new(5, 5), Cell::new(50, 5));

    let path = sim.run_until_path(200_000).unwrap().expect("maze should be solvable");
    assert_eq!(path.last(), Some(&Cell::new(5, 5)));
    // the route has to leave the first room through the gap in the N/3 wall
    assert!(path.iter().any(|c| c.i > 20 && c.j >= 20));
    assert_tree_consistent(&sim);
}

#[test]
fn test_goal_moved_onto_grown_branch() {
    let mut sim = Simulation::new(small_config(Strategy::Rrt, 4), ObstacleLayout::Border).unwrap();
    select_endpoints(&mut sim, Cell::new(1, 1), Cell::new(18, 18));
    sim.run_until_path(50_000).unwrap().expect("first path");
    let nodes = sim.tree().len();

    // place the new goal right next to an existing non-root node
    let target = sim
        .tree()
        .cells()
        .filter(|c| c.chebyshev(&Cell::new(1, 1)) > 4)
        .map(|c| c.offset(2, 0))
        .find(|&c| grid_rrt::utils::square_block(c, 1).all(|b| sim.field().is_free(b)));
    let target = match target {
        Some(t) => t,
        None => return,
    };
    sim.tick(&SessionSignals::click(target)).unwrap();
    let outcome = sim.tick(&SessionSignals::confirm_end()).unwrap();

    match outcome {
        TickOutcome::Planned(grid_rrt::StepOutcome::PathFound(path)) => {
            assert_eq!(path.last(), Some(&Cell::new(1, 1)));
            assert_eq!(sim.tree().len(), nodes);
        }
        other => panic!("expected an immediate path, got {:?}", other),
    }
}

#[test]
fn test_observer_sees_tree_growth() {
    let mut sim = Simulation::new(small_config(Strategy::RrtStar, 5), ObstacleLayout::Border).unwrap();
    let recorder = grid_rrt::ChangeRecorder::new();
    sim.field_mut().set_observer(Box::new(recorder.clone()));
    select_endpoints(&mut sim, Cell::new(1, 1), Cell::new(18, 18));
    sim.run_until_path(50_000).unwrap().expect("path");

    let changes = recorder.take();
    assert_eq!(changes[0].state, CellState::StartCell);
    let nodes = changes.iter().filter(|c| c.state == CellState::Node).count();
    assert_eq!(nodes, sim.nodes_added());
    assert!(changes.iter().any(|c| c.state == CellState::EndCell));
}

#[test]
fn test_duplicate_create_node() {
    let mut tree = TreeStore::new(TreeMode::RrtStar);
    for cell in [Cell::new(0, 0), Cell::new(3, 4), Cell::new(19, 2)] {
        assert!(tree.create_node(cell));
        let len = tree.len();
        assert!(!tree.create_node(cell));
        assert_eq!(tree.len(), len);
    }
}

#[test]
fn test_root_path_is_singleton() {
    let mut tree = TreeStore::new(TreeMode::Rrt);
    tree.create_node(Cell::new(7, 7));
    assert_eq!(tree.reconstruct_path(Cell::new(7, 7)), Some(vec![Cell::new(7, 7)]));
}

#[test]
fn test_rasterize_endpoints() {
    let pairs = [
        (Cell::new(0, 0), Cell::new(19, 7)),
        (Cell::new(5, 5), Cell::new(5, 0)),
        (Cell::new(12, 3), Cell::new(2, 17)),
        (Cell::new(4, 4), Cell::new(4, 4)),
    ];
    for (a, b) in pairs {
        let cells = rasterize_segment(a, b, 20);
        assert_eq!(cells.first(), Some(&a));
        assert_eq!(cells.last(), Some(&b));
    }
}

#[test]
fn test_coincident_steer() {
    let c = Cell::new(6, 6);
    assert_eq!(steer(c, c, 3.0), c);
}
