/// Braille Unicode canvas for sub-cell terminal graphics.
/// Each character cell holds a 2x4 dot grid; patterns live at U+2800..U+28FF.
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Dot bits, row-major
}

/// Dot bit for (x % 2, y % 4) inside one cell:
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

const BLANK: u32 = 0x2800;

impl BrailleCanvas {
    /// Canvas of `width` x `height` characters, i.e. `width*2` x `height*4` dots
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Turn on the dot at pixel (x, y); out-of-range pixels are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOT_BITS[x % 2][y % 4];
    }

    /// Signed variant for projected coordinates (negative values are off-canvas)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Raw dot bits of one character cell
    #[inline(always)]
    pub fn bits(&self, cx: usize, cy: usize) -> u8 {
        if cx >= self.width || cy >= self.height {
            return 0;
        }
        self.cells[cy * self.width + cx]
    }

    /// Braille glyph for one cell, `None` when no dot is set
    pub fn glyph(&self, cx: usize, cy: usize) -> Option<char> {
        match self.bits(cx, cy) {
            0 => None,
            bits => glyph_for(bits),
        }
    }

    /// Iterate every lit cell as (column, row, bits)
    pub fn lit_cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &bits)| bits != 0)
            .map(move |(idx, &bits)| (idx % self.width, idx / self.width, bits))
    }

    /// Render as text, one line per row
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        (0..self.height)
            .map(|cy| {
                (0..self.width)
                    .map(|cx| glyph_for(self.bits(cx, cy)).unwrap_or(' '))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Braille character for a dot pattern
#[inline(always)]
pub fn glyph_for(bits: u8) -> Option<char> {
    char::from_u32(BLANK + bits as u32)
}
