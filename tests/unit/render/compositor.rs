use std::io::Cursor;

use super::*;
use crate::assets::source::ImageSource;
use crate::foundation::core::Rgba8;
use crate::render::progress::{NoProgress, ProgressLog};

fn png_source(width: u32, height: u32, rgba: [u8; 4]) -> ImageSource {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::from_bytes(buf).unwrap()
}

fn small_config() -> LayoutConfig {
    LayoutConfig {
        cell_size: 20,
        gap: 2,
        margin: 4,
        ..LayoutConfig::classic()
    }
}

fn center_of(idx: usize, cfg: &LayoutConfig) -> (u32, u32) {
    let cell = cell_geometry(idx, cfg);
    (
        (cell.x + cell.size / 2.0) as u32,
        (cell.y + cell.size / 2.0) as u32,
    )
}

fn assert_close(got: [u8; 4], want: Rgba8, tol: u8) {
    for (g, w) in got.iter().zip(want.to_array()) {
        assert!(g.abs_diff(w) <= tol, "got {got:?}, want {want:?}");
    }
}

#[test]
fn progress_reports_every_cell_and_ends_at_100() {
    let cfg = small_config();
    let grid = Grid::new()
        .with_slot(0, png_source(8, 8, [255, 0, 0, 255]))
        .unwrap();
    let mut log = ProgressLog::new();
    let out = Compositor::new().compose(&grid, &cfg, &mut log).unwrap();

    assert_eq!(log.percents(), vec![11, 22, 33, 44, 56, 67, 78, 89, 100]);
    let cells: Vec<usize> = log.updates().iter().map(|u| u.cell).collect();
    assert_eq!(cells, (0..9).collect::<Vec<_>>());
    assert_eq!(out.progress, 100);
    assert_eq!(
        out.cells[0],
        CellOutcome::Drawn {
            source_width: 8,
            source_height: 8
        }
    );
    assert!(out.cells[1..].iter().all(|c| *c == CellOutcome::Placeholder));
    assert_eq!(u64::from(out.frame.width), cfg.canvas_extent());
}

#[test]
fn source_wider_than_raster_limit_is_still_drawn() {
    let cfg = small_config();
    let grid = Grid::new()
        .with_slot(0, png_source(70_000, 2, [255, 0, 0, 255]))
        .unwrap();
    let out = Compositor::new()
        .compose(&grid, &cfg, &mut NoProgress)
        .unwrap();
    assert_eq!(
        out.cells[0],
        CellOutcome::Drawn {
            source_width: 70_000,
            source_height: 2
        }
    );
    let (x, y) = center_of(0, &cfg);
    assert_close(out.frame.pixel(x, y).unwrap(), Rgba8::opaque(255, 0, 0), 2);
}

#[test]
fn empty_grid_is_rejected_without_progress() {
    let mut log = ProgressLog::new();
    let err = Compositor::new()
        .compose(&Grid::new(), &small_config(), &mut log)
        .unwrap_err();
    assert!(matches!(err, ColorWalkError::EmptyGrid));
    assert!(log.updates().is_empty());
}

#[test]
fn unreadable_slot_becomes_error_cell() {
    let cfg = small_config();
    let grid = Grid::new()
        .with_slot(0, png_source(4, 4, [0, 255, 0, 255]))
        .unwrap()
        .with_slot(2, ImageSource::from_bytes(b"not an image".to_vec()).unwrap())
        .unwrap();
    let out = Compositor::new()
        .compose(&grid, &cfg, &mut NoProgress)
        .unwrap();

    assert_eq!(out.failed_cells(), vec![2]);
    assert_eq!(out.progress, 100);

    let (x, y) = center_of(0, &cfg);
    assert_close(out.frame.pixel(x, y).unwrap(), Rgba8::opaque(0, 255, 0), 2);
    let (x, y) = center_of(2, &cfg);
    assert_close(out.frame.pixel(x, y).unwrap(), cfg.error_fill, 1);
    let (x, y) = center_of(5, &cfg);
    assert_close(out.frame.pixel(x, y).unwrap(), cfg.placeholder, 1);
}

#[test]
fn custom_decoder_errors_are_treated_as_decode_failures() {
    let decoder = |_: &ImageSource| -> ColorWalkResult<DecodedImage> {
        Err(ColorWalkError::validation("decoder rejected input"))
    };
    let grid = Grid::new()
        .with_slot(4, ImageSource::from_bytes(vec![1, 2, 3]).unwrap())
        .unwrap();
    let out = Compositor::with_decoder(decoder)
        .compose(&grid, &small_config(), &mut NoProgress)
        .unwrap();
    match &out.cells[4] {
        CellOutcome::Failed { reason } => assert!(reason.contains("decoder rejected input")),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn parallel_decode_matches_sequential_output() {
    let cfg = small_config();
    let grid = Grid::from_sources([
        Some(png_source(30, 10, [255, 0, 0, 255])),
        None,
        Some(png_source(10, 30, [0, 0, 255, 255])),
        Some(ImageSource::from_bytes(vec![0u8; 16]).unwrap()),
        Some(png_source(5, 5, [10, 200, 10, 128])),
    ])
    .unwrap();

    let seq = Compositor::new()
        .compose(&grid, &cfg, &mut NoProgress)
        .unwrap();
    let mut log = ProgressLog::new();
    let par = Compositor::new()
        .with_opts(ComposeOpts {
            parallel_decode: true,
            threads: Some(2),
            cancel: None,
        })
        .compose(&grid, &cfg, &mut log)
        .unwrap();

    assert_eq!(seq.frame, par.frame);
    assert_eq!(seq.cells, par.cells);
    assert_eq!(log.percents(), vec![11, 22, 33, 44, 56, 67, 78, 89, 100]);
}

#[test]
fn zero_threads_is_a_validation_error() {
    let grid = Grid::new()
        .with_slot(0, png_source(2, 2, [0, 0, 0, 255]))
        .unwrap();
    let err = Compositor::new()
        .with_opts(ComposeOpts {
            parallel_decode: true,
            threads: Some(0),
            cancel: None,
        })
        .compose(&grid, &small_config(), &mut NoProgress)
        .unwrap_err();
    assert!(matches!(err, ColorWalkError::Validation(_)));
}

#[test]
fn cancelled_run_discards_output() {
    let token = CancelToken::new();
    token.cancel();
    let grid = Grid::new()
        .with_slot(0, png_source(2, 2, [0, 0, 0, 255]))
        .unwrap();
    let mut log = ProgressLog::new();
    let err = Compositor::new()
        .with_opts(ComposeOpts {
            cancel: Some(token),
            ..ComposeOpts::default()
        })
        .compose(&grid, &small_config(), &mut log)
        .unwrap_err();
    assert!(matches!(
        err,
        ColorWalkError::Cancelled {
            processed: 0,
            total: 9
        }
    ));
    assert!(log.updates().is_empty());
}

#[test]
fn cancel_between_cells_stops_the_run() {
    let token = CancelToken::new();
    let trigger = token.clone();
    let grid = Grid::new()
        .with_slot(0, png_source(2, 2, [0, 0, 0, 255]))
        .unwrap();
    let mut seen = Vec::new();
    let mut sink = |u: &ProgressUpdate| {
        seen.push(u.percent);
        if u.processed == 3 {
            trigger.cancel();
        }
    };
    let err = Compositor::new()
        .with_opts(ComposeOpts {
            cancel: Some(token),
            ..ComposeOpts::default()
        })
        .compose(&grid, &small_config(), &mut sink)
        .unwrap_err();
    assert!(matches!(err, ColorWalkError::Cancelled { processed: 3, .. }));
    assert_eq!(seen, vec![11, 22, 33]);
}

#[test]
fn invalid_layout_fails_before_drawing() {
    let grid = Grid::new()
        .with_slot(0, png_source(2, 2, [0, 0, 0, 255]))
        .unwrap();
    let cfg = LayoutConfig {
        cell_size: 0,
        ..LayoutConfig::classic()
    };
    let mut log = ProgressLog::new();
    let err = Compositor::new().compose(&grid, &cfg, &mut log).unwrap_err();
    assert!(matches!(err, ColorWalkError::Validation(_)));
    assert!(log.updates().is_empty());
}

#[test]
fn compose_leaves_grid_untouched() {
    let grid = Grid::new()
        .with_slot(3, png_source(3, 3, [1, 2, 3, 255]))
        .unwrap();
    let before = grid.clone();
    Compositor::new()
        .compose(&grid, &small_config(), &mut NoProgress)
        .unwrap();
    assert_eq!(grid, before);
}
