//! Conversion between boards and network tensors.
//!
//! The input has [INPUT_CHANNELS] planes of `5x5`, always from the point of view of the player to move.
//! For [Player::B] every cell is point-reflected, so both players see themselves moving up the board.
//!
//! | planes    | content                                      |
//! |-----------|----------------------------------------------|
//! | `0..8`    | own pieces, one plane per history depth      |
//! | `8..16`   | opponent pieces                              |
//! | `16..24`  | black tiles                                  |
//! | `24..32`  | gray tiles                                   |
//! | `32..40`  | own black tiles in hand / 3                  |
//! | `40..48`  | own gray tiles in hand / 1                   |
//! | `48..56`  | opponent black tiles in hand / 3             |
//! | `56..64`  | opponent gray tiles in hand / 1              |
//! | `64`      | all ones                                     |
//! | `65`      | move count / 200                             |

use ct_net::shape;
use ct_net::shape::Shape;
use ct_net::tensor::Tensor;

use crate::action::Action;
use crate::board::{Board, Player, Snapshot, TileColor};
use crate::cell::Cell;
use crate::rules::{BOARD_SIZE, CELL_COUNT, HISTORY_SIZE, INITIAL_BLACK_TILES, INITIAL_GRAY_TILES, MAX_STEPS};

pub const INPUT_CHANNELS: usize = 8 * HISTORY_SIZE + 2;

const OWN_PIECES: usize = 0;
const OPPONENT_PIECES: usize = HISTORY_SIZE;
const BLACK_TILES: usize = 2 * HISTORY_SIZE;
const GRAY_TILES: usize = 3 * HISTORY_SIZE;
const OWN_BLACK_COUNT: usize = 4 * HISTORY_SIZE;
const OWN_GRAY_COUNT: usize = 5 * HISTORY_SIZE;
const OPPONENT_BLACK_COUNT: usize = 6 * HISTORY_SIZE;
const OPPONENT_GRAY_COUNT: usize = 7 * HISTORY_SIZE;
const ONES: usize = 8 * HISTORY_SIZE;
const MOVE_COUNT: usize = 8 * HISTORY_SIZE + 1;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct ContrastMapper;

impl ContrastMapper {
    pub fn input_shape(&self, batch_size: usize) -> Shape {
        shape![batch_size, INPUT_CHANNELS, BOARD_SIZE, BOARD_SIZE]
    }

    pub fn input_len(&self) -> usize {
        INPUT_CHANNELS * CELL_COUNT
    }

    /// Append the encoding of `board` to `result`.
    pub fn encode_input_full(&self, result: &mut Vec<f32>, board: &Board) {
        let start = result.len();
        result.resize(start + self.input_len(), 0.0);
        let planes = &mut result[start..];

        let pov = board.next_player();
        let opponent = pov.other();
        let view = |cell: Cell| if pov == Player::A { cell } else { cell.flip() };

        for depth in 0..HISTORY_SIZE {
            let snapshot: &Snapshot = board.snapshot(depth);

            for cell in Cell::all() {
                let target = view(cell).index();
                let mut set = |channel: usize| planes[channel * CELL_COUNT + target] = 1.0;

                match snapshot.pieces[cell.index()] {
                    Some(p) if p == pov => set(OWN_PIECES + depth),
                    Some(_) => set(OPPONENT_PIECES + depth),
                    None => {}
                }
                match snapshot.tiles[cell.index()] {
                    TileColor::White => {}
                    TileColor::Black => set(BLACK_TILES + depth),
                    TileColor::Gray => set(GRAY_TILES + depth),
                }
            }

            let own = snapshot.tile_counts[pov.index()];
            let other = snapshot.tile_counts[opponent.index()];
            let counts = [
                (OWN_BLACK_COUNT, own.black as f32 / INITIAL_BLACK_TILES as f32),
                (OWN_GRAY_COUNT, own.gray as f32 / INITIAL_GRAY_TILES as f32),
                (OPPONENT_BLACK_COUNT, other.black as f32 / INITIAL_BLACK_TILES as f32),
                (OPPONENT_GRAY_COUNT, other.gray as f32 / INITIAL_GRAY_TILES as f32),
            ];
            for (channel, value) in counts {
                fill_plane(planes, channel + depth, value);
            }
        }

        fill_plane(planes, ONES, 1.0);
        fill_plane(planes, MOVE_COUNT, board.move_count() as f32 / MAX_STEPS as f32);
    }

    /// Encode a single board as a tensor with shape `[1, 66, 5, 5]`.
    pub fn encode(&self, board: &Board) -> Tensor {
        self.encode_batch(std::slice::from_ref(board))
    }

    pub fn encode_batch(&self, boards: &[Board]) -> Tensor {
        let mut data = Vec::with_capacity(boards.len() * self.input_len());
        for board in boards {
            self.encode_input_full(&mut data, board);
        }
        Tensor::from_data(self.input_shape(boards.len()), data)
    }

    /// The move policy index and tile policy index of `action`, in the frame of the player to move.
    pub fn policy_indices(&self, board: &Board, action: Action) -> (usize, usize) {
        let action = match board.next_player() {
            Player::A => action,
            Player::B => action.flip(),
        };
        (action.move_index(), action.tile_index())
    }
}

fn fill_plane(planes: &mut [f32], channel: usize, value: f32) {
    planes[channel * CELL_COUNT..(channel + 1) * CELL_COUNT].fill(value);
}

/// Shorthand for [ContrastMapper::encode].
pub fn encode(board: &Board) -> Tensor {
    ContrastMapper.encode(board)
}

#[cfg(test)]
mod test {
    use crate::action::Action;
    use crate::board::{Board, Player};
    use crate::cell::Cell;
    use crate::mapping::{encode, ContrastMapper, INPUT_CHANNELS};

    fn plane_sum(data: &[f32], channel: usize) -> f32 {
        data[channel * 25..(channel + 1) * 25].iter().sum()
    }

    #[test]
    fn start_encoding() {
        let board = Board::default();
        let tensor = encode(&board);
        assert_eq!(tensor.shape().dims, vec![1, INPUT_CHANNELS, 5, 5]);

        let data = tensor.data();
        for depth in 0..8 {
            assert_eq!(plane_sum(data, depth), 5.0);
            assert_eq!(plane_sum(data, 8 + depth), 5.0);
            assert_eq!(plane_sum(data, 16 + depth), 0.0);
            assert_eq!(plane_sum(data, 24 + depth), 0.0);
            for c in [32, 40, 48, 56] {
                assert_eq!(plane_sum(data, c + depth), 25.0);
            }
        }
        assert_eq!(plane_sum(data, 64), 25.0);
        assert_eq!(plane_sum(data, 65), 0.0);

        // own pieces on the bottom row
        assert_eq!(data[tensor.index(0, 0, 4, 2)], 1.0);
        assert_eq!(data[tensor.index(0, 8, 0, 2)], 1.0);
    }

    #[test]
    fn second_player_is_reflected() {
        let mut board = Board::default();
        // A moves from a1 (cell 20) to a2 (cell 15)
        board.apply(Action::new(Cell::new(20), Cell::new(15), None));
        assert_eq!(board.next_player(), Player::B);

        let tensor = encode(&board);
        let data = tensor.data();

        // B sees its own pieces on its bottom row
        for x in 0..5 {
            assert_eq!(data[tensor.index(0, 0, 4, x)], 1.0);
        }
        // the moved A piece on cell 15 is seen on cell 24 - 15 = 9
        assert_eq!(data[tensor.index(0, 8, 1, 4)], 1.0);
        // one move old history still has it on cell 20, seen on cell 4
        assert_eq!(data[tensor.index(0, 9, 0, 4)], 1.0);
        // padding repeats the oldest snapshot
        assert_eq!(data[tensor.index(0, 15, 0, 4)], 1.0);

        assert!(data[tensor.index(0, 65, 0, 0)..].iter().all(|&x| x == 1.0 / 200.0));
    }

    #[test]
    fn policy_indices_flip() {
        let mapper = ContrastMapper;
        let mut board = Board::default();
        let action = Action::new(Cell::new(20), Cell::new(15), None);
        assert_eq!(mapper.policy_indices(&board, action), (20 * 25 + 15, 0));

        board.apply(action);
        let reply = Action::new(Cell::new(0), Cell::new(5), None);
        assert_eq!(mapper.policy_indices(&board, reply), (24 * 25 + 19, 0));
    }

    #[test]
    fn batch_concatenates() {
        let a = Board::default();
        let b = a.clone_and_apply(a.legal_actions()[0]);
        let batch = ContrastMapper.encode_batch(&[a.clone(), b.clone()]);

        let len = ContrastMapper.input_len();
        assert_eq!(&batch.data()[..len], encode(&a).data());
        assert_eq!(&batch.data()[len..], encode(&b).data());
    }
}
