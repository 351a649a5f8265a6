use tracing::trace;

/// Fill color for the letterbox bars.
pub const BACKGROUND_RGB: [u8; 3] = [0, 0, 0];

const CHANNELS: usize = 3;

/// Copy a packed RGB8 image of `cols x rows` onto a black `canvas_cols x canvas_rows`
/// canvas with its top-left corner at `(pad_cols, pad_rows)`.
///
/// The caller guarantees the image fits inside the canvas at that offset.
pub fn paste_centered(
    rgb_data: &[u8],
    cols: u32,
    rows: u32,
    canvas_cols: u32,
    canvas_rows: u32,
    pad_cols: u32,
    pad_rows: u32,
) -> Vec<u8> {
    let (cols, rows) = (cols as usize, rows as usize);
    let (canvas_cols, canvas_rows) = (canvas_cols as usize, canvas_rows as usize);
    let (pad_cols, pad_rows) = (pad_cols as usize, pad_rows as usize);

    trace!(
        "Adding padding: cols={}, rows={}, pad_cols={}, pad_rows={}",
        cols, rows, pad_cols, pad_rows
    );

    let mut padded: Vec<u8> = BACKGROUND_RGB
        .iter()
        .copied()
        .cycle()
        .take(canvas_cols * canvas_rows * CHANNELS)
        .collect();

    let row_bytes = cols * CHANNELS;
    // Copy per row using slice copies to minimize per-pixel indexing
    for row in 0..rows {
        let src_offset = row * row_bytes;
        let dst_offset = ((row + pad_rows) * canvas_cols + pad_cols) * CHANNELS;
        let src_slice = &rgb_data[src_offset..src_offset + row_bytes];
        let dst_slice = &mut padded[dst_offset..dst_offset + row_bytes];
        dst_slice.copy_from_slice(src_slice);
    }
    padded
}
