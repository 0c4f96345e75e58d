use super::*;

#[test]
fn landscape_keeps_height_and_centers_horizontally() {
    let fit = cover_fit(2000, 1000, 500.0).unwrap();
    assert_eq!(fit.draw_height, 500.0);
    assert_eq!(fit.draw_width, 1000.0);
    assert_eq!(fit.offset_x, -250.0);
    assert_eq!(fit.offset_y, 0.0);

    let placed = fit.placed_at(540.0, 20.0);
    assert_eq!(placed.x0, 540.0 - 250.0);
    assert_eq!(placed.y0, 20.0);
}

#[test]
fn portrait_keeps_width_and_centers_vertically() {
    let fit = cover_fit(1000, 2000, 500.0).unwrap();
    assert_eq!(fit.draw_width, 500.0);
    assert_eq!(fit.draw_height, 1000.0);
    assert_eq!(fit.offset_x, 0.0);
    assert_eq!(fit.offset_y, -250.0);

    let placed = fit.placed_at(20.0, 540.0);
    assert_eq!(placed.x0, 20.0);
    assert_eq!(placed.y0, 540.0 - 250.0);
}

#[test]
fn square_source_fills_cell_exactly() {
    let fit = cover_fit(37, 37, 500.0).unwrap();
    assert_eq!(fit.draw_width, 500.0);
    assert_eq!(fit.draw_height, 500.0);
    assert_eq!(fit.placed_at(20.0, 20.0), Rect::new(20.0, 20.0, 520.0, 520.0));
}

#[test]
fn fitted_rect_always_covers_the_cell() {
    for (w, h) in [(1, 1000), (1000, 1), (640, 480), (480, 640), (3, 2)] {
        let fit = cover_fit(w, h, 300.0).unwrap();
        let r = fit.placed_at(10.0, 10.0);
        assert!(r.x0 <= 10.0 + 1e-9 && r.y0 <= 10.0 + 1e-9);
        assert!(r.x1 >= 310.0 - 1e-9 && r.y1 >= 310.0 - 1e-9);
        let drawn_aspect = fit.draw_width / fit.draw_height;
        assert!((drawn_aspect - f64::from(w) / f64::from(h)).abs() < 1e-9);
    }
}

#[test]
fn zero_dimensions_are_invalid_not_infinite() {
    let err = cover_fit(100, 0, 500.0).unwrap_err();
    assert!(matches!(err, ColorWalkError::InvalidImage(_)));
    assert!(cover_fit(0, 100, 500.0).is_err());
    assert!(cover_fit(10, 10, 0.0).is_err());
}

#[test]
fn source_transform_maps_corners() {
    let fit = cover_fit(200, 100, 50.0).unwrap();
    let t = fit.source_transform(0.0, 0.0, 200, 100);
    let p0 = t * kurbo::Point::new(0.0, 0.0);
    let p1 = t * kurbo::Point::new(200.0, 100.0);
    assert!((p0.x + 25.0).abs() < 1e-9 && p0.y.abs() < 1e-9);
    assert!((p1.x - 75.0).abs() < 1e-9 && (p1.y - 50.0).abs() < 1e-9);
}

#[test]
fn visible_window_is_the_centered_crop() {
    let fit = cover_fit(400, 100, 40.0).unwrap();
    let w = fit.visible_window(400, 100);
    assert_eq!(
        w,
        SourceWindow {
            x: 150,
            y: 0,
            width: 100,
            height: 100
        }
    );
    assert!(!w.covers(400, 100));

    let fit = cover_fit(30, 90, 30.0).unwrap();
    let w = fit.visible_window(30, 90);
    assert_eq!((w.x, w.y, w.width, w.height), (0, 30, 30, 30));
}

#[test]
fn square_source_window_is_whole_image() {
    let fit = cover_fit(37, 37, 500.0).unwrap();
    assert!(fit.visible_window(37, 37).covers(37, 37));
}

#[test]
fn ultra_wide_window_stays_small() {
    // Drawn 700000 px wide on a 20 px cell: only the middle two columns are visible.
    let fit = cover_fit(70_000, 2, 20.0).unwrap();
    let w = fit.visible_window(70_000, 2);
    assert_eq!((w.y, w.height), (0, 2));
    assert!(w.width <= 3, "window {w:?}");
    assert!(w.x >= 34_998 && w.x + w.width <= 35_002, "window {w:?}");
}
