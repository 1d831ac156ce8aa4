pub const SIZE: usize = 4;
pub const NUM_CELLS: usize = SIZE * SIZE;
pub const NUM_PIECES: usize = 16;

/// A piece is a 4-bit attribute vector in `0..16`.
pub type Piece = u8;

/// Sentinel for an empty cell or "no piece pending".
pub const NO_PIECE: Piece = 16;

/// The four binary attributes of a piece, most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// 0 = dark, 1 = light
    Color,
    /// 0 = round, 1 = square
    Shape,
    /// 0 = short, 1 = tall
    Height,
    /// 0 = hollow, 1 = solid
    Fill,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Color,
        Attribute::Shape,
        Attribute::Height,
        Attribute::Fill,
    ];

    pub const fn mask(self) -> u8 {
        match self {
            Attribute::Color => 0b1000,
            Attribute::Shape => 0b0100,
            Attribute::Height => 0b0010,
            Attribute::Fill => 0b0001,
        }
    }

    /// Whether `piece` has this attribute set.
    pub fn is_set(self, piece: Piece) -> bool {
        piece & self.mask() != 0
    }
}

/// Row-major linear index of `(row, col)`.
pub fn linear_index(row: usize, col: usize) -> usize {
    SIZE * row + col
}

/// Inverse of [`linear_index`].
pub fn coords(index: usize) -> (usize, usize) {
    (index / SIZE, index % SIZE)
}

/// The 10 lines of the board as linear cell indices: 4 rows, 4 columns and
/// the two diagonals.
pub const LINES: [[usize; 4]; 10] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [12, 13, 14, 15],
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    [0, 5, 10, 15],
    [3, 6, 9, 12],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Piece; SIZE]; SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[NO_PIECE; SIZE]; SIZE],
        }
    }

    pub fn from_cells(cells: [[Piece; SIZE]; SIZE]) -> Self {
        Board { cells }
    }

    /// Get the piece at a specific cell, `NO_PIECE` if empty
    pub fn get(&self, row: usize, col: usize) -> Piece {
        self.cells[row][col]
    }

    /// Get the piece at a linear index
    pub fn at(&self, index: usize) -> Piece {
        let (row, col) = coords(index);
        self.cells[row][col]
    }

    /// Overwrite a cell. Passing `NO_PIECE` clears it.
    pub fn set(&mut self, index: usize, piece: Piece) {
        let (row, col) = coords(index);
        self.cells[row][col] = piece;
    }

    pub fn is_empty_at(&self, index: usize) -> bool {
        self.at(index) == NO_PIECE
    }

    /// The four pieces along a line.
    pub fn line(&self, line: &[usize; 4]) -> [Piece; 4] {
        line.map(|i| self.at(i))
    }

    /// All 16 cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Piece> + '_ {
        self.cells.iter().flatten().copied()
    }

    pub fn filled_count(&self) -> usize {
        self.cells().filter(|&p| p != NO_PIECE).count()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.filled_count() == NUM_CELLS
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
