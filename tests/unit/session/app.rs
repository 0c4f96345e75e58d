use std::io::Cursor;
use std::time::Duration;

use super::*;
use crate::assets::source::MAX_SOURCE_BYTES;
use crate::render::progress::{NoProgress, ProgressLog};
use crate::session::notice::NOTICE_TIMEOUT;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([40, 90, 200, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn tiny_session() -> Session {
    Session::new(LayoutConfig {
        cell_size: 16,
        gap: 2,
        margin: 2,
        ..LayoutConfig::classic()
    })
}

#[test]
fn select_fills_slot_and_keeps_label() {
    let mut s = tiny_session();
    let now = Instant::now();
    s.select(4, png(3, 2), Some("cat.png".to_string()), now)
        .unwrap();
    let src = s.grid().slot(4).unwrap().source().unwrap();
    assert_eq!(src.label(), Some("cat.png"));
    assert!(s.notices().current(now).is_none());
}

#[test]
fn oversized_selection_posts_notice_and_keeps_grid() {
    let mut s = tiny_session();
    let now = Instant::now();
    s.select(0, png(2, 2), None, now).unwrap();
    let before = s.grid().clone();

    let err = s
        .select(0, vec![0u8; MAX_SOURCE_BYTES as usize + 1], None, now)
        .unwrap_err();
    assert!(matches!(err, ColorWalkError::FileTooLarge { .. }));
    assert_eq!(s.grid(), &before);
    let notice = s.notices().current(now).unwrap();
    assert!(notice.message.contains("too large"));
    assert_eq!(notice.dismiss_at, now + NOTICE_TIMEOUT);
}

#[test]
fn unreadable_selection_is_rejected_at_ingestion() {
    let mut s = tiny_session();
    let now = Instant::now();
    let err = s.select(1, b"garbage".to_vec(), None, now).unwrap_err();
    assert!(matches!(err, ColorWalkError::Decode(_)));
    assert!(s.grid().is_empty());
    assert!(s.notices().current(now).is_some());
}

#[test]
fn out_of_range_slot_is_rejected() {
    let mut s = tiny_session();
    let err = s.select(9, png(1, 1), None, Instant::now()).unwrap_err();
    assert!(matches!(err, ColorWalkError::Validation(_)));
    assert!(s.remove(12).is_err());
}

#[test]
fn generate_on_empty_grid_posts_notice() {
    let mut s = tiny_session();
    let now = Instant::now();
    let mut log = ProgressLog::new();
    let err = s.generate(&mut log, now).unwrap_err();
    assert!(matches!(err, ColorWalkError::EmptyGrid));
    assert!(log.updates().is_empty());
    assert!(s.preview().is_none());
    assert_eq!(
        s.notices().current(now).unwrap().message,
        "Add at least one photo first"
    );
}

#[test]
fn generate_sets_preview_and_progress() {
    let mut s = tiny_session();
    let now = Instant::now();
    s.select(0, png(4, 2), None, now).unwrap();
    s.select(8, png(2, 4), None, now).unwrap();

    let mut log = ProgressLog::new();
    let extent = s.layout().canvas_extent() as u32;
    let preview = s.generate(&mut log, now).unwrap();
    assert_eq!((preview.width, preview.height), (extent, extent));
    assert!(preview.to_data_url().starts_with("data:image/png;base64,"));

    assert_eq!(log.percents().last(), Some(&100));
    assert_eq!(s.progress(), 100);
    assert_eq!(s.last_outcomes().len(), 9);
    assert!(s.preview().is_some());
}

#[test]
fn remove_then_reset_with_confirmation() {
    let mut s = tiny_session();
    let now = Instant::now();
    s.select(2, png(2, 2), None, now).unwrap();
    s.select(3, png(2, 2), None, now).unwrap();
    s.remove(2).unwrap();
    assert_eq!(s.grid().filled_count(), 1);
    s.generate(&mut NoProgress, now).unwrap();

    assert!(!s.reset_all(|| false));
    assert_eq!(s.grid().filled_count(), 1);
    assert!(s.preview().is_some());

    assert!(s.reset_all(|| true));
    assert!(s.grid().is_empty());
    assert!(s.preview().is_none());
    assert_eq!(s.progress(), 0);
}

#[test]
fn close_preview_keeps_grid() {
    let mut s = tiny_session();
    let now = Instant::now();
    s.select(5, png(2, 2), None, now).unwrap();
    s.generate(&mut NoProgress, now).unwrap();
    assert!(s.close_preview().is_some());
    assert!(s.preview().is_none());
    assert_eq!(s.grid().filled_count(), 1);
}

#[test]
fn notice_auto_dismisses_on_tick() {
    let mut s = tiny_session();
    let now = Instant::now();
    let _ = s.generate(&mut NoProgress, now);
    assert!(!s.tick(now + Duration::from_secs(1)));
    assert!(s.tick(now + NOTICE_TIMEOUT));
    assert!(s.notices().current(now).is_none());
}

#[test]
fn jpeg_settings_shape_the_preview() {
    let mut s = tiny_session().with_export_settings(ExportSettings::jpeg(80));
    let now = Instant::now();
    s.select(4, png(3, 3), None, now).unwrap();
    let preview = s.generate(&mut NoProgress, now).unwrap();
    assert!(preview.to_data_url().starts_with("data:image/jpeg;base64,"));
    let decoded = image::load_from_memory(&preview.bytes).unwrap();
    assert_eq!(decoded.width(), s.layout().canvas_extent() as u32);
}

#[test]
fn custom_notice_board_sets_the_timeout() {
    let mut s = tiny_session().with_notice_board(NoticeBoard::with_timeout(Duration::from_secs(1)));
    let now = Instant::now();
    s.select(0, b"garbage".to_vec(), None, now).unwrap_err();
    assert_eq!(
        s.notices().current(now).unwrap().dismiss_at,
        now + Duration::from_secs(1)
    );
    assert!(s.tick(now + Duration::from_secs(1)));
    assert!(s.notices().current(now + Duration::from_secs(1)).is_none());
}
