use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use vacancy_map::marker::{MapWidget, Marker};
use vacancy_map::{
    ClusterId, IndexConfig, MapBounds, MarkerManager, MarkerPolicy, Point, Result, SelectionEvent,
    ShopRecord, VacancyError, Viewport,
};

#[derive(Debug, Clone, PartialEq)]
enum Command {
    SetZoom(u8),
    SetCenter(Point),
}

/// Map double that records every command and the markers on screen.
/// `viewport: None` behaves like a widget that has not finished loading.
#[derive(Debug, Default)]
struct RecordingMap {
    viewport: Option<Viewport>,
    commands: Vec<Command>,
    shown: Vec<Marker>,
    renders: usize,
}

impl RecordingMap {
    fn at(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }

    fn unavailable() -> Self {
        Self::default()
    }

    fn check(&self) -> Result<()> {
        match self.viewport {
            Some(_) => Ok(()),
            None => Err(VacancyError::MapUnavailable("map still loading".into())),
        }
    }
}

impl MapWidget for RecordingMap {
    fn viewport(&self) -> Result<Viewport> {
        self.viewport
            .ok_or_else(|| VacancyError::MapUnavailable("map still loading".into()))
    }

    fn set_zoom(&mut self, zoom: u8) -> Result<()> {
        self.check()?;
        self.commands.push(Command::SetZoom(zoom));
        Ok(())
    }

    fn set_center(&mut self, center: Point) -> Result<()> {
        self.check()?;
        self.commands.push(Command::SetCenter(center));
        Ok(())
    }

    fn clear_markers(&mut self) -> Result<()> {
        self.check()?;
        self.shown.clear();
        self.renders += 1;
        Ok(())
    }

    fn add_marker(&mut self, marker: &Marker) -> Result<()> {
        self.check()?;
        self.shown.push(marker.clone());
        Ok(())
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn busan() -> MapBounds {
    MapBounds::new(128.8, 34.9, 129.4, 35.5)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Five shops about 110 m apart: one cluster at zoom 12, apart from zoom 16.
fn row_of_five() -> Vec<ShopRecord> {
    (0..5)
        .map(|i| ShopRecord::new(format!("s{i}"), 35.1 + i as f64 * 0.001, 129.0))
        .collect()
}

/// `n` shops on a 0.01 degree grid with rent equal to their index.
fn grid_shops(n: usize) -> Vec<ShopRecord> {
    (0..n)
        .map(|i| {
            let row = (i / 30) as f64;
            let col = (i % 30) as f64;
            ShopRecord::new(format!("g{i:04}"), 35.0 + row * 0.01, 128.9 + col * 0.01)
                .with_monthly_rent(i as f64)
        })
        .collect()
}

fn manager_at(zoom: u8) -> MarkerManager<RecordingMap> {
    init_logging();
    MarkerManager::builder(RecordingMap::at(Viewport::new(busan(), zoom)))
        .build()
        .unwrap()
}

fn first_cluster_id(manager: &MarkerManager<RecordingMap>) -> ClusterId {
    manager
        .markers()
        .iter()
        .find_map(Marker::as_cluster)
        .map(|cluster| cluster.id)
        .unwrap()
}

#[test]
fn test_cluster_click_zooms_to_expansion_once() {
    let mut manager = manager_at(12);
    manager.load_shops(row_of_five()).unwrap();
    assert_eq!(manager.markers().len(), 1);

    let id = first_cluster_id(&manager);
    let expansion = manager.index().get_expansion_zoom(id).unwrap();
    assert_eq!(expansion, 16);
    let centroid = manager.markers()[0].position();

    assert!(manager.on_cluster_click(Instant::now(), id));
    assert_eq!(
        manager.map().commands,
        vec![Command::SetZoom(16), Command::SetCenter(centroid)]
    );
}

#[test]
fn test_cluster_click_by_marker_target_id() {
    let mut manager = manager_at(12);
    manager.load_shops(row_of_five()).unwrap();

    let target = manager.markers()[0].target_id();
    assert!(target.starts_with("cluster-"));
    assert!(manager.on_marker_click(Instant::now(), &target));
    assert_eq!(manager.map().commands.len(), 2);
}

#[test]
fn test_rapid_clicks_are_throttled() {
    let mut manager = manager_at(12);
    manager.load_shops(row_of_five()).unwrap();
    let id = first_cluster_id(&manager);

    let t0 = Instant::now();
    assert!(manager.on_cluster_click(t0, id));
    assert!(!manager.on_cluster_click(t0 + ms(50), id));
    assert_eq!(manager.map().commands.len(), 2);

    assert!(manager.on_cluster_click(t0 + ms(250), id));
    assert_eq!(manager.map().commands.len(), 4);
}

#[test]
fn test_stale_cluster_id_is_ignored() {
    let mut manager = manager_at(12);
    manager.load_shops(row_of_five()).unwrap();
    let stale = first_cluster_id(&manager);

    manager.load_shops(row_of_five()).unwrap();
    let t0 = Instant::now();
    assert!(!manager.on_cluster_click(t0, stale));
    assert!(!manager.on_marker_click(t0 + ms(300), "cluster-999999999"));
    assert!(manager.map().commands.is_empty());
}

#[test]
fn test_zoomed_out_cap_keeps_top_third() {
    init_logging();
    // With max_zoom 7 every point is a singleton at zoom 8.
    let mut manager = MarkerManager::builder(RecordingMap::at(Viewport::new(busan(), 8)))
        .index_config(IndexConfig::default().with_zoom_range(0, 7))
        .build()
        .unwrap();
    manager.load_shops(grid_shops(600)).unwrap();

    assert_eq!(manager.features().len(), 600);
    assert_eq!(manager.markers().len(), 166);
    assert_eq!(manager.map().shown.len(), 166);

    let lowest = manager
        .markers()
        .iter()
        .filter_map(Marker::as_point)
        .map(|p| p.shop.monthly_rent)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(lowest, 434.0);
    assert_eq!(manager.stats().truncated, 434);
}

#[test]
fn test_viewport_changes_are_debounced() {
    let mut manager = manager_at(12);
    manager.load_shops(grid_shops(60)).unwrap();
    let renders = manager.map().renders;
    let passes = manager.stats().passes;

    // First event looks at the whole grid, the second only at its first row.
    let t0 = Instant::now();
    manager.map_mut().viewport = Some(Viewport::new(busan(), 17));
    manager.on_viewport_changed(t0);
    let first_row = MapBounds::new(128.8, 34.99, 129.4, 35.005);
    manager.map_mut().viewport = Some(Viewport::new(first_row, 17));
    manager.on_viewport_changed(t0 + ms(50));

    assert_eq!(manager.next_deadline(), Some(t0 + ms(350)));
    assert!(!manager.poll(t0 + ms(300)));
    assert!(manager.poll(t0 + ms(350)));
    assert!(!manager.poll(t0 + ms(700)));

    assert_eq!(manager.map().renders, renders + 1);
    assert_eq!(manager.stats().passes, passes + 1);
    assert_eq!(manager.markers().len(), 30);
}

#[test]
fn test_point_click_selects_and_notifies() {
    init_logging();
    let opened = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&opened);

    let mut manager = MarkerManager::builder(RecordingMap::at(Viewport::new(busan(), 17)))
        .on_select(move |shop| sink.lock().push(shop.id.clone()))
        .build()
        .unwrap();
    manager.load_shops(grid_shops(10)).unwrap();

    let t0 = Instant::now();
    assert!(manager.on_point_click(t0, "g0003"));
    assert!(manager.on_point_click(t0 + ms(200), "g0007"));
    assert!(!manager.on_point_click(t0 + ms(400), "missing"));

    assert_eq!(*opened.lock(), vec!["g0003".to_string(), "g0007".to_string()]);
    assert_eq!(manager.selection().selected().as_deref(), Some("g0007"));

    let selected: Vec<&str> = manager
        .map()
        .shown
        .iter()
        .filter_map(Marker::as_point)
        .filter(|p| p.is_selected())
        .map(|p| p.shop.id.as_str())
        .collect();
    assert_eq!(selected, vec!["g0007"]);
}

#[test]
fn test_hover_changes_only_icon() {
    let mut manager = manager_at(17);
    manager.load_shops(grid_shops(10)).unwrap();
    let before: Vec<String> = manager.markers().iter().map(Marker::target_id).collect();

    manager.on_point_hover(Some("g0002"));
    let hovered = manager
        .markers()
        .iter()
        .filter_map(Marker::as_point)
        .find(|p| p.is_hovered())
        .unwrap();
    assert_eq!(hovered.shop.id, "g0002");
    assert_eq!(hovered.icon.width, 45);

    let after: Vec<String> = manager.markers().iter().map(Marker::target_id).collect();
    assert_eq!(before, after);

    manager.on_point_hover(None);
    assert!(
        manager
            .markers()
            .iter()
            .filter_map(Marker::as_point)
            .all(|p| !p.is_hovered())
    );
}

#[test]
fn test_unavailable_map_makes_handlers_no_ops() {
    init_logging();
    let mut manager = MarkerManager::builder(RecordingMap::unavailable())
        .build()
        .unwrap();

    assert_eq!(manager.load_shops(row_of_five()).unwrap(), 5);
    assert!(manager.markers().is_empty());
    assert!(manager.refresh().is_empty());

    let t0 = Instant::now();
    manager.on_viewport_changed(t0);
    assert!(manager.next_deadline().is_none());

    let id = ClusterId::from_raw(1);
    assert!(!manager.on_cluster_click(t0, id));
    assert!(!manager.on_point_click(t0 + ms(300), "s0"));
    assert!(manager.selection().selected().is_none());
    assert!(manager.stats().skipped_passes >= 2);
}

#[test]
fn test_reload_resets_selection() {
    let mut manager = manager_at(17);
    manager.load_shops(grid_shops(10)).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    manager
        .selection()
        .subscribe(move |event| sink.lock().push(event.clone()));

    manager.on_point_click(Instant::now(), "g0001");
    manager.on_point_hover(Some("g0002"));
    manager.load_shops(grid_shops(10)).unwrap();

    assert!(manager.selection().snapshot().selected.is_none());
    assert!(manager.selection().snapshot().hovered.is_none());
    assert_eq!(
        *events.lock(),
        vec![
            SelectionEvent::Selected(Some("g0001".into())),
            SelectionEvent::Hovered(Some("g0002".into())),
            SelectionEvent::Selected(None),
            SelectionEvent::Hovered(None),
        ]
    );
}

#[test]
fn test_refresh_is_idempotent() {
    let mut manager = manager_at(11);
    manager.load_shops(grid_shops(300)).unwrap();

    let first = manager.refresh().to_vec();
    let second = manager.refresh().to_vec();
    assert_eq!(first, second);
    assert_eq!(manager.map().shown, second);
}

#[test]
fn test_focal_point_keeps_nearest() {
    init_logging();
    let mut manager = MarkerManager::builder(RecordingMap::at(Viewport::new(busan(), 17)))
        .policy(MarkerPolicy::default().with_max_markers(3))
        .focal_point(Point::new(129.19, 35.19))
        .build()
        .unwrap();
    manager.load_shops(grid_shops(600)).unwrap();

    let ids: Vec<String> = manager.markers().iter().map(Marker::target_id).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], "g0599");
}

#[test]
fn test_edge_and_polar_shops_are_shown() {
    init_logging();
    let bounds = MapBounds::new(128.9, 35.0, 129.1, 35.2);
    let mut manager = MarkerManager::builder(RecordingMap::at(Viewport::new(bounds, 17)))
        .build()
        .unwrap();
    manager
        .load_shops(vec![
            ShopRecord::new("north", 35.2, 129.05),
            ShopRecord::new("east", 35.1, 129.1),
            ShopRecord::new("corner", 35.0, 128.9),
        ])
        .unwrap();
    assert_eq!(manager.index().query(&bounds, 17).len(), 3);
    assert_eq!(manager.markers().len(), 3);
    assert_eq!(manager.map().shown.len(), 3);

    // Shops sitting exactly on the north and east edges of many boxes.
    let boxes: Vec<MapBounds> = (0..50)
        .map(|k| {
            let west = -170.0 + k as f64 * 6.7;
            let south = -70.0 + k as f64 * 2.9;
            MapBounds::new(west, south, west + 0.37, south + 0.23)
        })
        .collect();
    let shops: Vec<ShopRecord> = boxes
        .iter()
        .enumerate()
        .flat_map(|(k, b)| {
            let center = b.center();
            [
                ShopRecord::new(format!("n{k}"), b.north(), center.x()),
                ShopRecord::new(format!("e{k}"), center.y(), b.east()),
            ]
        })
        .collect();
    manager.load_shops(shops).unwrap();

    for (k, b) in boxes.iter().enumerate() {
        manager.map_mut().viewport = Some(Viewport::new(*b, 17));
        let queried = manager.index().query(b, 17).len();
        let ids: Vec<String> = manager.refresh().iter().map(Marker::target_id).collect();
        assert_eq!(ids.len(), queried, "box {k}");
        assert!(ids.contains(&format!("n{k}")), "box {k}");
        assert!(ids.contains(&format!("e{k}")), "box {k}");
    }

    // Above the Mercator latitude limit.
    let polar = MapBounds::new(0.0, 80.0, 10.0, 89.0);
    manager.map_mut().viewport = Some(Viewport::new(polar, 17));
    manager
        .load_shops(vec![ShopRecord::new("polar", 86.0, 5.0)])
        .unwrap();
    assert_eq!(manager.index().query(&polar, 17).len(), 1);
    assert_eq!(manager.markers().len(), 1);
    assert_eq!(manager.markers()[0].target_id(), "polar");
}

#[test]
fn test_shop_id_shaped_like_cluster_is_selected() {
    let mut manager = manager_at(17);
    manager
        .load_shops(vec![
            ShopRecord::new("cluster-7", 35.1, 129.0),
            ShopRecord::new("plain", 35.2, 129.1),
        ])
        .unwrap();

    assert!(manager.on_marker_click(Instant::now(), "cluster-7"));
    assert_eq!(manager.selection().selected().as_deref(), Some("cluster-7"));
    assert!(manager.map().commands.is_empty());
}
