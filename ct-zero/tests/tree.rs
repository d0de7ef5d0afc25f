use rand::rngs::StdRng;
use rand::SeedableRng;

use ct_game::action::{Action, Placement};
use ct_game::board::{Board, Outcome, Player, TileColor, TileCounts};
use ct_game::cell::Cell;
use ct_game::rules::CELL_COUNT;
use ct_net::model::{ContrastNet, TowerShape};
use ct_zero::network::cpu::CpuNetwork;
use ct_zero::network::dummy::DummyNetwork;
use ct_zero::network::Network;
use ct_zero::zero::tree::Tree;
use ct_zero::zero::wrapper::{SearchStats, ZeroBot, ZeroSettings};

fn consistent_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

fn random_network(seed: u64) -> CpuNetwork {
    let shape = TowerShape::default().with_depth(1);
    CpuNetwork::new(ContrastNet::random(shape, &mut StdRng::seed_from_u64(seed)))
}

/// A to move, its piece on (2, 1) can step onto the target row.
fn winning_board() -> Board {
    let mut pieces = [None; CELL_COUNT];
    pieces[Cell::from_xy(2, 1).index()] = Some(Player::A);
    pieces[Cell::from_xy(0, 0).index()] = Some(Player::B);
    pieces[Cell::from_xy(4, 0).index()] = Some(Player::B);

    let empty = TileCounts { black: 0, gray: 0 };
    Board::from_parts(pieces, [TileColor::White; CELL_COUNT], [empty; 2], Player::A)
}

#[test]
fn single_simulation_follows_prior() {
    let board = Board::default();
    let mut network = random_network(1);
    let prior = network.evaluate(&board).policy;

    let settings = ZeroSettings::for_evaluation();
    let mut tree = Tree::new();
    let stats = settings.expand_tree(&mut tree, &board, &mut network, &mut consistent_rng(), 1);

    assert_eq!(
        stats,
        SearchStats {
            simulations: 1,
            expansions: 2,
            terminal_hits: 0
        }
    );
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.root_visits(&board), 1);

    // the first maximum of the prior is the only visited action
    let max = prior.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let expected_index = prior.iter().position(|&p| p == max).unwrap();
    let actions = board.legal_actions();
    assert_eq!(tree.best_action(&board), Some(actions[expected_index]));

    let root = tree.root_node(&board).unwrap();
    for (i, stats) in root.actions.iter().enumerate() {
        assert_eq!(stats.visits, (i == expected_index) as u64);
        assert_eq!(stats.net_policy, prior[i]);
    }

    // the child was expanded but nothing was propagated into it
    let child = board.clone_and_apply(actions[expected_index]);
    assert_eq!(tree.root_visits(&child), 0);
    assert!(tree.root_node(&child).is_some());
}

#[test]
fn uniform_prior_picks_first_action() {
    let board = Board::default();
    let tree = ZeroSettings::for_evaluation().build_tree(&board, &mut DummyNetwork, &mut consistent_rng(), 1);
    assert_eq!(tree.best_action(&board), Some(board.legal_actions()[0]));
}

#[test]
fn terminal_root() {
    let mut board = winning_board();
    board.apply(Action::new(Cell::from_xy(2, 1), Cell::from_xy(2, 0), None));
    assert_eq!(board.outcome(), Some(Outcome::WonBy(Player::A)));

    let mut tree = Tree::new();
    let stats = ZeroSettings::default().expand_tree(&mut tree, &board, &mut DummyNetwork, &mut consistent_rng(), 10);

    assert_eq!(stats, SearchStats::default());
    assert!(tree.is_empty());
    assert_eq!(tree.best_action(&board), None);
    assert_eq!(tree.root_value(&board), 0.0);
    assert_eq!(tree.policy(&board), None);
}

#[test]
fn unsearched_position() {
    let tree = Tree::new();
    let board = Board::default();
    assert_eq!(tree.best_action(&board), None);
    assert_eq!(tree.root_value(&board), 0.0);
    assert_eq!(tree.root_visits(&board), 0);
}

#[test]
fn finds_immediate_win() {
    let board = winning_board();
    let tree = ZeroSettings::default().build_tree(&board, &mut DummyNetwork, &mut consistent_rng(), 200);

    let best = tree.best_action(&board).unwrap();
    assert_eq!(best.to(), Cell::from_xy(2, 0));
    assert!(tree.root_value(&board) > 0.5, "value {}", tree.root_value(&board));

    println!("{}", tree.display_root(&board, 4));
}

#[test]
fn visits_add_up_across_searches() {
    let board = Board::default();
    let settings = ZeroSettings::default();
    let mut rng = consistent_rng();
    let mut tree = Tree::new();

    let first = settings.expand_tree(&mut tree, &board, &mut DummyNetwork, &mut rng, 30);
    assert_eq!(tree.root_visits(&board), 30);
    assert_eq!(first.expansions + first.terminal_hits, 31);

    let second = settings.expand_tree(&mut tree, &board, &mut DummyNetwork, &mut rng, 20);
    assert_eq!(tree.root_visits(&board), 50);
    assert_eq!(second.expansions + second.terminal_hits, 20);

    let policy = tree.policy(&board).unwrap();
    assert_eq!(policy.len(), board.legal_actions().len());
    assert!((policy.iter().sum::<f32>() - 1.0).abs() < 1e-4);
}

#[test]
fn root_noise_is_fresh() {
    let board = Board::default();
    let settings = ZeroSettings::default();
    let mut rng = consistent_rng();
    let mut network = random_network(2);
    let mut tree = Tree::new();

    settings.expand_tree(&mut tree, &board, &mut network, &mut rng, 0);
    let first: Vec<f32> = tree.root_node(&board).unwrap().actions.iter().map(|a| a.policy).collect();

    settings.expand_tree(&mut tree, &board, &mut network, &mut rng, 0);
    let root = tree.root_node(&board).unwrap();
    let second: Vec<f32> = root.actions.iter().map(|a| a.policy).collect();

    assert_ne!(first, second);
    assert!((second.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    assert!((root.actions.iter().map(|a| a.net_policy).sum::<f32>() - 1.0).abs() < 1e-4);

    // evaluation settings restore the plain network policy
    ZeroSettings::for_evaluation().expand_tree(&mut tree, &board, &mut network, &mut rng, 0);
    let root = tree.root_node(&board).unwrap();
    assert!(root.actions.iter().all(|a| a.policy == a.net_policy));
}

#[test]
fn bot_plays_legal_actions() {
    let mut bot = ZeroBot::new(DummyNetwork, ZeroSettings::default(), 20, consistent_rng());
    let mut board = Board::default();

    for _ in 0..30 {
        let (action, value) = bot.think(&board);
        match action {
            Some(action) => {
                assert!(board.is_legal(action), "{} is not legal on\n{}", action, board);
                assert!((-1.0..=1.0).contains(&value));
                board.apply(action);
            }
            None => {
                assert!(board.is_done());
                break;
            }
        }
    }

    assert!(bot.tree().len() > 30);
    bot.reset_tree();
    assert!(bot.tree().is_empty());
}

#[test]
fn network_by_reference() {
    let board = Board::default();
    let mut network = DummyNetwork;
    let mut by_ref = &mut network;
    let tree = ZeroSettings::for_evaluation().build_tree(&board, &mut by_ref, &mut consistent_rng(), 5);
    assert_eq!(tree.root_visits(&board), 5);
}

fn black_on(from: u8, to: u8, tile: u8) -> Action {
    let placement = Placement {
        color: TileColor::Black,
        cell: Cell::new(tile),
    };
    Action::new(Cell::new(from), Cell::new(to), Some(placement))
}

fn play(actions: &[Action]) -> Board {
    let mut board = Board::default();
    for &action in actions {
        assert!(board.is_legal(action));
        board.apply(action);
    }
    board
}

#[test]
fn same_grid_different_inventory() {
    // A placed all three black tiles
    let spent = play(&[
        black_on(20, 15, 12),
        Action::new(Cell::new(0), Cell::new(5), None),
        black_on(15, 20, 13),
        Action::new(Cell::new(5), Cell::new(0), None),
        black_on(20, 15, 14),
        Action::new(Cell::new(0), Cell::new(5), None),
    ]);
    // identical grid, but B placed the tile on e3 so A still holds one
    let kept = play(&[
        black_on(20, 15, 12),
        black_on(0, 5, 14),
        black_on(15, 20, 13),
        Action::new(Cell::new(5), Cell::new(0), None),
        Action::new(Cell::new(20), Cell::new(15), None),
        Action::new(Cell::new(0), Cell::new(5), None),
    ]);
    assert_eq!(spent.structural_hash(), kept.structural_hash());
    assert_ne!(spent.position_key(), kept.position_key());

    // searching both positions in one tree must keep their nodes apart
    let settings = ZeroSettings::for_evaluation();
    let mut network = random_network(2);
    let mut tree = Tree::new();
    settings.expand_tree(&mut tree, &kept, &mut network, &mut consistent_rng(), 50);
    settings.expand_tree(&mut tree, &spent, &mut network, &mut consistent_rng(), 50);

    for board in [&kept, &spent] {
        let root = tree.root_node(board).unwrap();
        assert_eq!(root.actions.len(), board.legal_actions().len());
        assert_eq!(tree.root_visits(board), 50);
        assert!(board.is_legal(tree.best_action(board).unwrap()));
    }
}

#[test]
fn empty_batch_evaluation() {
    let mut network = random_network(3);
    let boards: [Board; 0] = [];
    assert!(network.evaluate_batch(&boards).is_empty());
}
