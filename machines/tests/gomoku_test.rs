use nichi_core::core::machine::{ControlLine, FrameStatus, VideoBoard, VideoRegion};
use nichi_core::video::{Bitmap, Rect, Rgb};
use nichi_machines::gomoku::{
    BoardRemapTables, DEF_BOARD, DEF_CURSOR, DEF_STONE, GomokuVideo, PEN_BLACK, PEN_BOARD,
    PEN_OUTSIDE, PEN_WHITE, STATE_BLACK_STONE, STATE_WHITE_CURSOR, STATE_WHITE_STONE,
    screen_mirror,
};
use nichi_machines::registry;
use nichi_machines::rom_loader::RomSet;
use pretty_assertions::assert_eq;

// =================================================================
// Fixtures
// =================================================================

fn proms() -> [u8; 0x40] {
    let mut proms = [0u8; 0x40];
    proms[0] = 0xFF;
    proms[PEN_BOARD as usize] = 0x38;
    proms
}

/// Tile 1 is solid pixel value 3; tile 2 has only its top-left pixel set.
fn char_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x1000];
    rom[16..32].fill(0xFF);
    // Rows are stored bottom-up: row 0 lives in the last byte of each half.
    rom[32 + 7] = 0x88;
    rom
}

fn board_with(defs: [u8; 256]) -> GomokuVideo {
    GomokuVideo::new(&proms(), &char_rom(), BoardRemapTables::linear(), defs)
}

fn render(board: &mut GomokuVideo) -> Bitmap {
    let mut bitmap = Bitmap::new(256, 256);
    let clip = bitmap.bounds();
    assert_eq!(board.on_frame_render(&mut bitmap, &clip), FrameStatus::Ok);
    bitmap
}

fn fill_board_ram(board: &mut GomokuVideo, value: u8) {
    for offset in 0..0x100 {
        board.on_memory_write(VideoRegion::BoardRam, offset, value);
    }
}

fn assert_uniform(frame: &Bitmap, area: &Rect, pen: u16) {
    for y in area.min_y..=area.max_y {
        for x in area.min_x..=area.max_x {
            assert_eq!(frame.pix(x as usize, y as usize), pen, "pixel ({x}, {y})");
        }
    }
}

// =================================================================
// Board basics
// =================================================================

#[test]
fn test_display_size_and_visible_area() {
    let board = board_with([0; 256]);
    assert_eq!(board.display_size(), (256, 256));
    assert_eq!(board.visible_area(), Rect::new(0, 255, 16, 239));
}

#[test]
fn test_palette_is_direct_weighted() {
    let board = board_with([0; 256]);
    assert_eq!(board.palette().entries(), 0x40);
    assert_eq!(board.palette().pen_rgb(0), Rgb::new(255, 255, 222));
    assert_eq!(board.palette().pen_rgb(PEN_BOARD), Rgb::new(0, 255, 0));
}

#[test]
fn test_lines_are_active_low() {
    let mut board = board_with([0; 256]);
    assert!(board.is_background_visible());
    assert!(board.is_flipped());

    board.on_line_change(ControlLine::BackgroundEnable, true);
    board.on_line_change(ControlLine::FlipScreen, true);
    assert!(!board.is_background_visible());
    assert!(!board.is_flipped());
}

#[test]
fn test_memory_regions() {
    let mut board = board_with([0; 256]);
    board.on_memory_write(VideoRegion::BoardRam, 0x105, 0x0A);
    assert_eq!(board.read_memory(VideoRegion::BoardRam, 5), 0x0A);
    board.on_memory_write(VideoRegion::ColorRam, 0x3FF, 0xC1);
    assert_eq!(board.read_memory(VideoRegion::ColorRam, 0x7FF), 0xC1);

    board.on_memory_write(VideoRegion::SpriteRam, 0, 0x12);
    assert_eq!(board.read_memory(VideoRegion::SpriteRam, 0), 0xFF);
}

// =================================================================
// Backdrop and overlays
// =================================================================

#[test]
fn test_empty_board_definition_renders_outside_everywhere() {
    let mut board = board_with([0; 256]);
    // Every stone and cursor bit set: cells without definition bits ignore them.
    fill_board_ram(&mut board, 0xFF);
    let frame = render(&mut board);
    assert_uniform(&frame, &frame.bounds(), PEN_OUTSIDE);
}

#[test]
fn test_backdrop_fills_board_area() {
    let mut board = board_with([DEF_BOARD; 256]);
    let frame = render(&mut board);
    assert_uniform(&frame, &frame.bounds(), PEN_BOARD);
}

#[test]
fn test_disabled_background_is_uniform_outside() {
    let mut board = board_with([DEF_BOARD | DEF_STONE; 256]);
    fill_board_ram(&mut board, STATE_BLACK_STONE);
    board.on_line_change(ControlLine::BackgroundEnable, true);

    let frame = render(&mut board);
    assert_uniform(&frame, &frame.bounds(), PEN_OUTSIDE);
}

#[test]
fn test_black_stone_wins_over_white() {
    let mut board = board_with([DEF_BOARD | DEF_STONE; 256]);

    fill_board_ram(&mut board, STATE_BLACK_STONE | STATE_WHITE_STONE);
    let frame = render(&mut board);
    assert_uniform(&frame, &frame.bounds(), PEN_BLACK);

    fill_board_ram(&mut board, STATE_WHITE_STONE);
    let frame = render(&mut board);
    assert_uniform(&frame, &frame.bounds(), PEN_WHITE);
}

#[test]
fn test_no_state_bits_leave_backdrop() {
    let mut board = board_with([DEF_BOARD | DEF_STONE | DEF_CURSOR; 256]);
    fill_board_ram(&mut board, 0);
    let frame = render(&mut board);
    assert_uniform(&frame, &frame.bounds(), PEN_BOARD);
}

#[test]
fn test_stones_need_stone_capable_cells() {
    let mut board = board_with([DEF_BOARD; 256]);
    fill_board_ram(&mut board, STATE_BLACK_STONE);
    let frame = render(&mut board);
    assert_uniform(&frame, &frame.bounds(), PEN_BOARD);
}

#[test]
fn test_cursor_pass_draws_after_stones() {
    let mut board = board_with([DEF_BOARD | DEF_STONE | DEF_CURSOR; 256]);
    fill_board_ram(&mut board, STATE_BLACK_STONE | STATE_WHITE_CURSOR);
    let frame = render(&mut board);
    assert_uniform(&frame, &frame.bounds(), PEN_WHITE);
}

#[test]
fn test_single_stone_lands_in_its_cell() {
    let mut board = board_with([DEF_BOARD | DEF_STONE; 256]);
    // Cell 0x77 covers board pixels x 142..=155, y 134..=147.
    board.on_memory_write(VideoRegion::BoardRam, 0x77, STATE_BLACK_STONE);
    let frame = render(&mut board);

    let at = |x, y| {
        let (dx, dy) = screen_mirror(x, y);
        frame.pix(dx, dy)
    };
    assert_eq!(at(142, 134), PEN_BLACK);
    assert_eq!(at(155, 147), PEN_BLACK);
    assert_eq!(at(141, 140), PEN_BOARD);
    assert_eq!(at(150, 148), PEN_BOARD);
}

#[test]
fn test_overlay_respects_clip() {
    let mut board = board_with([DEF_BOARD | DEF_STONE; 256]);
    fill_board_ram(&mut board, STATE_BLACK_STONE);

    let mut frame = Bitmap::new(256, 256);
    frame.fill(0x3F);
    let clip = Rect::new(0, 255, 16, 239);
    board.on_frame_render(&mut frame, &clip);

    assert_uniform(&frame, &clip, PEN_BLACK);
    assert_eq!(frame.pix(0, 15), 0x3F);
    assert_eq!(frame.pix(0, 240), 0x3F);
}

#[test]
fn test_flip_is_stored_but_not_rendered() {
    let mut board = board_with([DEF_BOARD | DEF_STONE; 256]);
    board.on_memory_write(VideoRegion::BoardRam, 0x42, STATE_WHITE_STONE);
    board.on_memory_write(VideoRegion::VideoRam, 100, 2);
    board.on_memory_write(VideoRegion::ColorRam, 100, 3);
    let before = render(&mut board);

    board.on_line_change(ControlLine::FlipScreen, true);
    assert!(!board.is_flipped());
    assert_eq!(render(&mut board).pixels(), before.pixels());
}

// =================================================================
// Text tilemap
// =================================================================

#[test]
fn test_text_layer_is_transparent_over_backdrop() {
    let mut board = board_with([DEF_BOARD; 256]);
    // Tile row 2, column 3.
    board.on_memory_write(VideoRegion::VideoRam, 2 * 32 + 3, 1);
    board.on_memory_write(VideoRegion::ColorRam, 2 * 32 + 3, 2);
    let frame = render(&mut board);

    assert_eq!(frame.pix(24, 16), 2 * 4 + 3);
    assert_eq!(frame.pix(31, 23), 2 * 4 + 3);
    assert_eq!(frame.pix(32, 16), PEN_BOARD);
}

#[test]
fn test_text_attribute_flip_bits() {
    let mut board = board_with([DEF_BOARD; 256]);
    board.on_memory_write(VideoRegion::VideoRam, 2 * 32, 2);
    board.on_memory_write(VideoRegion::ColorRam, 2 * 32, 1);
    let frame = render(&mut board);
    assert_eq!(frame.pix(0, 16), 4 + 3);
    assert_eq!(frame.pix(7, 23), PEN_BOARD);

    // Both flip bits: the set pixel moves to the opposite corner.
    board.on_memory_write(VideoRegion::ColorRam, 2 * 32, 0xC0 | 1);
    let frame = render(&mut board);
    assert_eq!(frame.pix(0, 16), PEN_BOARD);
    assert_eq!(frame.pix(7, 23), 4 + 3);
}

#[test]
fn test_repeated_writes_render_the_same_frame() {
    let mut once = board_with([DEF_BOARD; 256]);
    once.on_memory_write(VideoRegion::VideoRam, 40, 1);

    let mut twice = board_with([DEF_BOARD; 256]);
    twice.on_memory_write(VideoRegion::VideoRam, 40, 1);
    twice.on_memory_write(VideoRegion::VideoRam, 40, 1);

    assert_eq!(render(&mut once).pixels(), render(&mut twice).pixels());
    // A second render without writes is unchanged.
    assert_eq!(render(&mut once).pixels(), render(&mut twice).pixels());
}

// =================================================================
// Host boundary
// =================================================================

#[test]
fn test_render_rgb24_crops_to_visible_rows() {
    let mut board = board_with([DEF_BOARD; 256]);
    let mut buffer = vec![0u8; 256 * 224 * 3];
    assert_eq!(board.render_rgb24(&mut buffer).code(), 0);
    assert_eq!(&buffer[..3], &[0, 255, 0]);
    assert_eq!(&buffer[buffer.len() - 3..], &[0, 255, 0]);
}

fn rom_files(defs: [u8; 256]) -> Vec<(String, Vec<u8>)> {
    let proms = proms();
    let linear: Vec<u8> = (0..=255u8).map(|i| i >> 4).collect();
    vec![
        ("rj_prom.1m".into(), proms[..0x20].to_vec()),
        ("rj_prom.1l".into(), proms[0x20..].to_vec()),
        ("rj_6.4r".into(), char_rom()),
        ("rj_prom.9k".into(), linear.clone()),
        ("rj_prom.9l".into(), linear),
        ("rj_prom.8n".into(), defs.to_vec()),
    ]
}

#[test]
fn test_registry_creates_board_from_rom_set() {
    let entry = registry::find("GOMOKU").expect("gomoku registered");
    assert_eq!(entry.name, "gomoku");

    let mut board = (entry.create)(&RomSet::from_entries(rom_files([DEF_BOARD; 256]))).unwrap();
    let mut bitmap = Bitmap::new(256, 256);
    let clip = board.visible_area();
    board.on_frame_render(&mut bitmap, &clip);
    assert_eq!(bitmap.pix(128, 128), PEN_BOARD);
}

#[test]
fn test_registry_lists_boards_sorted() {
    let names: Vec<_> = registry::all().iter().map(|e| e.name).collect();
    assert!(names.contains(&"gomoku"));
    assert!(names.windows(2).all(|w| w[0] <= w[1]));
}
